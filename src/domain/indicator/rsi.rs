//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! - First average: simple mean of gains/losses over the first n deltas
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)); 100 when there are gains
//! but no losses, 50 when there are neither.
//!
//! Warmup: first n bars are unavailable (n deltas need n+1 prices).

#[derive(Debug, Clone)]
pub struct RsiState {
    period: usize,
    prev: Option<f64>,
    deltas: usize,
    avg_gain: f64,
    avg_loss: f64,
}

impl RsiState {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev: None,
            deltas: 0,
            avg_gain: 0.0,
            avg_loss: 0.0,
        }
    }

    pub fn update(&mut self, price: f64) -> Option<f64> {
        let prev = self.prev.replace(price)?;
        if self.period == 0 {
            return None;
        }

        let change = price - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let n = self.period as f64;

        self.deltas += 1;
        if self.deltas < self.period {
            self.avg_gain += gain;
            self.avg_loss += loss;
            return None;
        }
        if self.deltas == self.period {
            self.avg_gain = (self.avg_gain + gain) / n;
            self.avg_loss = (self.avg_loss + loss) / n;
        } else {
            self.avg_gain = (self.avg_gain * (n - 1.0) + gain) / n;
            self.avg_loss = (self.avg_loss * (n - 1.0) + loss) / n;
        }
        Some(rsi_from_averages(self.avg_gain, self.avg_loss))
    }
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { 50.0 };
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}

pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }
    rsi_series(prices, period).last().copied()
}

/// One value per delta from bar `period` onward.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    let mut state = RsiState::new(period);
    prices.iter().filter_map(|&p| state.update(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rsi_empty_and_single() {
        assert!(rsi_series(&[], 14).is_empty());
        assert!(rsi_series(&[100.0], 14).is_empty());
        assert_eq!(rsi(&[100.0], 14), None);
    }

    #[test]
    fn rsi_warmup_period() {
        let prices: Vec<f64> = (1..=15).map(|i| 100.0 + (i as f64 % 5.0) * 2.0).collect();
        assert_eq!(rsi(&prices[..14], 14), None);
        assert!(rsi(&prices, 14).is_some());
        assert_eq!(rsi_series(&prices, 14).len(), 1);
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        for v in rsi_series(&prices, 14) {
            assert!((v - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn rsi_all_losses_below_one() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let value = rsi(&prices, 14).unwrap();
        assert!(value < 1.0, "RSI {} should be below 1", value);
    }

    #[test]
    fn rsi_flat_prices_is_neutral() {
        let value = rsi(&[50.0; 20], 14).unwrap();
        assert!((value - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_known_calculation() {
        let prices = [
            44.0, 44.25, 44.50, 43.75, 44.50, 44.25, 44.75, 45.25, 45.50, 45.25, 45.50, 46.0,
            46.25, 46.0, 46.50,
        ];
        let value = rsi(&prices, 14).unwrap();

        // gains: 0.25+0.25+0.75+0.5+0.5+0.25+0.25+0.5+0.25+0.5 = 4.0
        // losses: 0.75+0.25+0.25+0.25 = 1.5
        let expected = 100.0 - 100.0 / (1.0 + (4.0 / 14.0) / (1.5 / 14.0));
        assert!((value - expected).abs() < 1e-9);
    }

    #[test]
    fn rsi_wilder_smoothing_step() {
        let prices = [10.0, 11.0, 10.0, 12.0];
        let series = rsi_series(&prices, 2);
        assert_eq!(series.len(), 2);

        // seed: gains [1, 0] losses [0, 1] -> 0.5 / 0.5
        assert!((series[0] - 50.0).abs() < 1e-9);
        // next delta +2: gain (0.5 + 2)/2 = 1.25, loss (0.5 + 0)/2 = 0.25
        let expected = 100.0 - 100.0 / (1.0 + 1.25 / 0.25);
        assert!((series[1] - expected).abs() < 1e-9);
    }

    #[test]
    fn rsi_zero_period() {
        assert!(rsi_series(&[1.0, 2.0, 3.0], 0).is_empty());
        assert_eq!(rsi(&[1.0, 2.0, 3.0], 0), None);
    }

    proptest! {
        #[test]
        fn rsi_always_within_bounds(
            prices in prop::collection::vec(1.0f64..10_000.0, 2..200),
            period in 1usize..30,
        ) {
            for v in rsi_series(&prices, period) {
                prop_assert!((0.0..=100.0).contains(&v), "RSI {} out of range", v);
            }
        }
    }
}
