//! Physical constants and empirical cut coefficients shared by the cut and
//! selection stages.

/// Solar effective temperature (K) used to normalize Stefan–Boltzmann luminosities.
pub const SOLAR_TEMPERATURE_K: f64 = 5772.0;

/// log10 of the birthline temperature floor (K).
pub const LOG_TEMPERATURE_FLOOR: f64 = 3.6;

/// Slope of the empirical log L / log T exclusion line (Haemmerlé et al. 2019).
pub const BIRTHLINE_SLOPE: f64 = 5.5;

/// Intercept of the empirical log L / log T exclusion line.
pub const BIRTHLINE_INTERCEPT: f64 = -20.7;

/// Default critical delta-chi-squared multiplier per data point.
pub const DEFAULT_CRITICAL_DELTA_PROB: f64 = 3.0;

/// Prefix carried by survey catalogue identifiers but absent from fitter output.
pub const CATALOGUE_NAME_PREFIX: &str = "SSTGLMC ";

#[cfg(test)]
mod tests {
    use super::{BIRTHLINE_INTERCEPT, BIRTHLINE_SLOPE, LOG_TEMPERATURE_FLOOR};

    #[test]
    fn temperature_floor_is_about_3981_kelvin() {
        let floor = 10f64.powf(LOG_TEMPERATURE_FLOOR);
        assert!((floor - 3981.071_705_534_972).abs() < 1.0e-9);
    }

    #[test]
    fn birthline_passes_through_known_point() {
        // log T = 4 gives log L = 1.3
        let log_lum = BIRTHLINE_SLOPE * 4.0 + BIRTHLINE_INTERCEPT;
        assert!((log_lum - 1.3).abs() < 1.0e-12);
    }
}
