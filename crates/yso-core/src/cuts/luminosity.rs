/// Stellar luminosity in solar units from radius (solar radii) and
/// effective temperature: `L = R^2 (T / T_sun)^4`.
pub fn stellar_luminosity(radius: f64, temperature: f64, solar_temperature: f64) -> f64 {
    radius * radius * (temperature / solar_temperature).powi(4)
}

/// Elementwise [`stellar_luminosity`]; `None` when the inputs are not aligned.
pub fn luminosity_column(
    radii: &[f64],
    temperatures: &[f64],
    solar_temperature: f64,
) -> Option<Vec<f64>> {
    if radii.len() != temperatures.len() {
        return None;
    }
    Some(
        radii
            .iter()
            .zip(temperatures)
            .map(|(&radius, &temperature)| {
                stellar_luminosity(radius, temperature, solar_temperature)
            })
            .collect(),
    )
}
