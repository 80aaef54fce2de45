//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - Bandwidth: (Upper - Lower) / Middle, 0 when Middle is 0
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Default parameters: period=20, multiplier=2.0.
//! Warmup: first (period-1) bars are unavailable.

use crate::domain::indicator::BollingerResult;
use std::collections::VecDeque;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

fn bands(window: impl Iterator<Item = f64> + Clone, period: usize, mult: f64) -> BollingerResult {
    let n = period as f64;
    let middle = window.clone().sum::<f64>() / n;
    let variance = window
        .map(|p| {
            let diff = p - middle;
            diff * diff
        })
        .sum::<f64>()
        / n;
    let stddev = variance.sqrt();

    // bands are symmetric around the middle, so the sign of the multiplier is ignored
    let width = mult.abs() * stddev;
    let upper = middle + width;
    let lower = middle - width;
    let bandwidth = if middle != 0.0 {
        (upper - lower) / middle
    } else {
        0.0
    };

    BollingerResult {
        upper,
        middle,
        lower,
        bandwidth,
    }
}

#[derive(Debug, Clone)]
pub struct BollingerState {
    period: usize,
    mult: f64,
    window: VecDeque<f64>,
}

impl BollingerState {
    pub fn new(period: usize, mult: f64) -> Self {
        Self {
            period,
            mult,
            window: VecDeque::with_capacity(period),
        }
    }

    pub fn update(&mut self, price: f64) -> Option<BollingerResult> {
        if self.period == 0 {
            return None;
        }
        self.window.push_back(price);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.window.len() < self.period {
            return None;
        }
        Some(bands(self.window.iter().copied(), self.period, self.mult))
    }
}

pub fn bollinger(prices: &[f64], period: usize, mult: f64) -> Option<BollingerResult> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(bands(window.iter().copied(), period, mult))
}

/// One band triple per bar from index `period - 1` onward.
pub fn bollinger_series(prices: &[f64], period: usize, mult: f64) -> Vec<BollingerResult> {
    let mut state = BollingerState::new(period, mult);
    prices.iter().filter_map(|&p| state.update(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::sma::sma;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn bollinger_insufficient_history() {
        assert!(bollinger(&[1.0, 2.0], 3, 2.0).is_none());
        assert!(bollinger_series(&[1.0, 2.0], 3, 2.0).is_empty());
    }

    #[test]
    fn bollinger_constant_values() {
        let result = bollinger(&[100.0; 5], 3, 2.0).unwrap();
        assert!((result.middle - 100.0).abs() < f64::EPSILON);
        assert!((result.upper - 100.0).abs() < f64::EPSILON);
        assert!((result.lower - 100.0).abs() < f64::EPSILON);
        assert!(result.bandwidth.abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let result = bollinger(&[10.0, 20.0, 30.0], 3, 2.0).unwrap();

        let expected_middle: f64 = 20.0;
        let variance: f64 = (100.0 + 0.0 + 100.0) / 3.0;
        let stddev = variance.sqrt();

        assert_abs_diff_eq!(result.middle, expected_middle, epsilon = 1e-10);
        assert_abs_diff_eq!(result.upper, expected_middle + 2.0 * stddev, epsilon = 1e-10);
        assert_abs_diff_eq!(result.lower, expected_middle - 2.0 * stddev, epsilon = 1e-10);
        assert_abs_diff_eq!(
            result.bandwidth,
            (4.0 * stddev) / expected_middle,
            epsilon = 1e-10
        );
    }

    #[test]
    fn bollinger_zero_middle_bandwidth() {
        let result = bollinger(&[-1.0, 0.0, 1.0], 3, 2.0).unwrap();
        assert_eq!(result.bandwidth, 0.0);
    }

    #[test]
    fn bollinger_symmetry() {
        let result = bollinger(&[10.0, 20.0, 30.0], 3, 1.5).unwrap();
        assert_abs_diff_eq!(
            result.upper - result.middle,
            result.middle - result.lower,
            epsilon = 1e-10
        );
    }

    #[test]
    fn bollinger_series_uses_sliding_window() {
        let prices = [10.0, 20.0, 30.0, 40.0, 50.0];
        let series = bollinger_series(&prices, 3, 2.0);
        assert_eq!(series.len(), 3);
        assert_abs_diff_eq!(series[2].middle, 40.0, epsilon = 1e-10);
    }

    proptest! {
        #[test]
        fn bands_are_ordered_and_middle_is_sma(
            prices in prop::collection::vec(1.0f64..5_000.0, 1..120),
            period in 1usize..40,
            mult in 0.0f64..4.0,
        ) {
            if let Some(result) = bollinger(&prices, period, mult) {
                prop_assert!(result.upper >= result.middle);
                prop_assert!(result.middle >= result.lower);
                let expected = sma(&prices, period).unwrap();
                prop_assert!((result.middle - expected).abs() < 1e-6);
            }
        }
    }
}
