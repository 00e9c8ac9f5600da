//! The two draws of the direct method.

use rand::Rng;

/// Exponential waiting time with rate `total` (mean `1 / total`).
///
/// Inverse transform of one uniform variate on `(0, 1]`, so `ln` never
/// sees zero. Avoids the `rand_distr` dependency.
pub(crate) fn exponential_wait<R: Rng + ?Sized>(rng: &mut R, total: f64) -> f64 {
    let u: f64 = 1.0 - rng.random::<f64>();
    -u.ln() / total
}

/// Uniform variate on `[0, total)`.
pub(crate) fn uniform_below<R: Rng + ?Sized>(rng: &mut R, total: f64) -> f64 {
    rng.random::<f64>() * total
}

/// First channel whose cumulative rate exceeds `target`.
///
/// Channel `i` owns `[cum_{i-1}, cum_i)`; zero-rate channels own an empty
/// interval. If rounding puts `target` at or past the final sum, the last
/// positive channel is returned. `None` only when every rate is zero.
pub(crate) fn select_linear(rates: &[f64], target: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &rate) in rates.iter().enumerate() {
        if rate > 0.0 {
            cumulative += rate;
            last_positive = Some(i);
            if target < cumulative {
                return Some(i);
            }
        }
    }
    last_positive
}
