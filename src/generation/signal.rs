//! # Signal Synthesis
//!
//! Smooth pseudo-random 1-D scalar fields built by summing a handful of
//! sinusoids with randomized periods and phases. The river model uses two of
//! these: one for the channel width and one for the meandering centerline.

use crate::{ObolError, ObolResult};
use rand::rngs::StdRng;
use rand::Rng;
use std::f32::consts::TAU;

/// Generates a smooth random signal of `length` samples centered between
/// `y_min` and `y_max`.
///
/// Periods are drawn log-uniformly between `min_period` and `max_period`,
/// with the first period restricted to the lower quarter of the log range and
/// the last to the upper quarter. That bias guarantees one fast wiggle and
/// one slow drift component, with any middle harmonics unconstrained.
///
/// Each sample is the midpoint `0.5 * (y_max + y_min)` plus, per period `p`
/// with phase `s`, a term `0.5 * (y_max - y_min) / num_periods *
/// sin(TAU * i / p + s)`. Values stay in `[y_min, y_max]` in expectation; the
/// bound is not a clamp and can be grazed at extremes.
///
/// The function is pure given the RNG: the same seed reproduces the same
/// signal.
pub fn synthesize(
    rng: &mut StdRng,
    length: usize,
    y_min: f32,
    y_max: f32,
    min_period: f32,
    max_period: f32,
    num_periods: usize,
) -> ObolResult<Vec<f32>> {
    if num_periods == 0 {
        return Err(ObolError::InvalidConfig(
            "signal needs at least one period".to_string(),
        ));
    }
    if min_period <= 0.0 || max_period <= min_period {
        return Err(ObolError::InvalidConfig(format!(
            "invalid period range {}..{}",
            min_period, max_period
        )));
    }

    let min_log = min_period.ln();
    let log_span = max_period.ln() - min_log;

    let mut periods = Vec::with_capacity(num_periods);
    for j in 0..num_periods {
        let frac: f32 = rng.gen();
        let log_period = if j == 0 {
            min_log + frac * 0.25 * log_span
        } else if j == num_periods - 1 {
            min_log + (0.75 + frac * 0.25) * log_span
        } else {
            min_log + frac * log_span
        };
        periods.push(log_period.exp());
    }
    let phases: Vec<f32> = (0..num_periods).map(|_| rng.gen::<f32>() * TAU).collect();

    let midpoint = 0.5 * (y_max + y_min);
    let amplitude = 0.5 * (y_max - y_min) / num_periods as f32;

    let signal = (0..length)
        .map(|i| {
            let mut value = midpoint;
            for (period, phase) in periods.iter().zip(&phases) {
                value += amplitude * (TAU * i as f32 / period + phase).sin();
            }
            value
        })
        .collect();

    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_synthesize_length_and_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let signal = synthesize(&mut rng, 500, 15.0, 40.0, 50.0, 1000.0, 3).unwrap();
        assert_eq!(signal.len(), 500);
        // Amplitudes sum to at most half the range around the midpoint.
        for value in &signal {
            assert!(*value >= 15.0 - 0.001, "value {} below range", value);
            assert!(*value <= 40.0 + 0.001, "value {} above range", value);
        }
    }

    #[test]
    fn test_synthesize_deterministic_given_seed() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let a = synthesize(&mut rng1, 200, 30.0, 90.0, 150.0, 1000.0, 3).unwrap();
        let b = synthesize(&mut rng2, 200, 30.0, 90.0, 150.0, 1000.0, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthesize_single_period() {
        let mut rng = StdRng::seed_from_u64(1);
        let signal = synthesize(&mut rng, 100, 0.0, 1.0, 10.0, 100.0, 1).unwrap();
        assert_eq!(signal.len(), 100);
    }

    #[test]
    fn test_synthesize_rejects_bad_arguments() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(synthesize(&mut rng, 100, 0.0, 1.0, 10.0, 100.0, 0).is_err());
        assert!(synthesize(&mut rng, 100, 0.0, 1.0, 0.0, 100.0, 3).is_err());
        assert!(synthesize(&mut rng, 100, 0.0, 1.0, 100.0, 10.0, 3).is_err());
    }
}
