//! Compensated summation and chi-squared likelihood weights.

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

pub fn stable_weighted_sum(values: &[f64], weights: &[f64]) -> Option<f64> {
    if values.len() != weights.len() {
        return None;
    }

    let mut sum = 0.0;
    let mut correction = 0.0;
    for (&value, &weight) in values.iter().zip(weights) {
        kahan_add(&mut sum, &mut correction, value * weight);
    }

    Some(sum)
}

pub fn stable_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(stable_sum(values) / values.len() as f64)
}

/// Smallest non-NaN value, or `None` when every value is NaN.
pub fn finite_min(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|value| !value.is_nan())
        .min_by(f64::total_cmp)
}

/// Normalized likelihood weights `w_i = exp(-chi2_i / 2) / sum_j exp(-chi2_j / 2)`.
///
/// The exponent is shifted by the smallest chi-squared before exponentiation,
/// which leaves the normalized weights unchanged but keeps the best candidate's
/// term at exactly 1 so large chi-squared values cannot underflow the sum.
/// Returns `None` for empty input or when the normalization is not finite.
pub fn likelihood_weights(chi2: &[f64]) -> Option<Vec<f64>> {
    let best = finite_min(chi2)?;
    let terms: Vec<f64> = chi2
        .iter()
        .map(|value| (-(value - best) / 2.0).exp())
        .collect();
    let total = stable_sum(&terms);
    if !(total.is_finite() && total > 0.0) {
        return None;
    }
    let normalization = 1.0 / total;
    Some(terms.into_iter().map(|term| normalization * term).collect())
}
