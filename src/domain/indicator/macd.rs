//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//!
//! The slow EMA decides where the line starts: the fast EMA series is longer
//! by (slow - fast) entries and is trimmed from the front before the two are
//! subtracted. The line therefore begins at bar slow-1 and the signal line at
//! bar slow-1 + signal-1.

use crate::domain::indicator::ema::{ema_series, EmaState};
use crate::domain::indicator::MacdResult;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// MACD line, signal line and histogram.
///
/// `line` starts at bar slow-1; `signal` and `histogram` share an index
/// space starting at bar slow+signal-2.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_series(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    if fast == 0 || slow == 0 || signal_period == 0 || fast > slow {
        return MacdSeries::default();
    }

    let fast_series = ema_series(prices, fast);
    let slow_series = ema_series(prices, slow);
    if slow_series.is_empty() {
        return MacdSeries::default();
    }

    let offset = slow - fast;
    let line: Vec<f64> = fast_series[offset..]
        .iter()
        .zip(&slow_series)
        .map(|(f, s)| f - s)
        .collect();

    let signal = ema_series(&line, signal_period);
    let histogram = signal
        .iter()
        .enumerate()
        .map(|(i, s)| line[i + signal_period - 1] - s)
        .collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}

pub fn macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdResult> {
    if prices.len() < slow + signal_period {
        return None;
    }
    let series = macd_series(prices, fast, slow, signal_period);
    let macd_line = *series.line.last()?;
    let signal_line = *series.signal.last()?;
    Some(MacdResult {
        macd_line,
        signal_line,
        histogram: macd_line - signal_line,
    })
}

pub fn macd_default(prices: &[f64]) -> Option<MacdResult> {
    macd(prices, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

/// One MACD observation; `signal` is absent until the signal EMA has seeded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct MacdState {
    fast: EmaState,
    slow: EmaState,
    signal: EmaState,
    valid: bool,
}

impl MacdState {
    pub fn new(fast: usize, slow: usize, signal_period: usize) -> Self {
        Self {
            fast: EmaState::new(fast),
            slow: EmaState::new(slow),
            signal: EmaState::new(signal_period),
            valid: fast > 0 && slow > 0 && signal_period > 0 && fast <= slow,
        }
    }

    pub fn update(&mut self, price: f64) -> Option<MacdPoint> {
        if !self.valid {
            return None;
        }
        let fast = self.fast.update(price);
        let slow = self.slow.update(price)?;
        let line = fast? - slow;
        let signal = self.signal.update(line);
        Some(MacdPoint { line, signal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn macd_insufficient_data() {
        assert!(macd_default(&rising(34)).is_none());
        assert!(macd_default(&rising(35)).is_some());
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let result = macd_default(&rising(50)).unwrap();
        assert_abs_diff_eq!(
            result.histogram,
            result.macd_line - result.signal_line,
            epsilon = 1e-4
        );
    }

    #[test]
    fn macd_series_lengths() {
        let prices = rising(50);
        let series = macd_series(&prices, 12, 26, 9);
        assert_eq!(series.line.len(), 50 - 26 + 1);
        assert_eq!(series.signal.len(), series.line.len() - 9 + 1);
        assert_eq!(series.histogram.len(), series.signal.len());
    }

    #[test]
    fn macd_line_aligns_fast_to_slow() {
        let prices = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let series = macd_series(&prices, 3, 5, 2);

        let fast = ema_series(&prices, 3);
        let slow = ema_series(&prices, 5);
        assert_eq!(series.line.len(), slow.len());
        for (i, line) in series.line.iter().enumerate() {
            assert_abs_diff_eq!(*line, fast[i + 2] - slow[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn macd_rejects_bad_periods() {
        let prices = rising(60);
        assert_eq!(macd_series(&prices, 0, 26, 9), MacdSeries::default());
        assert_eq!(macd_series(&prices, 12, 0, 9), MacdSeries::default());
        assert_eq!(macd_series(&prices, 12, 26, 0), MacdSeries::default());
        assert!(macd(&prices, 30, 26, 9).is_none());
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let result = macd_default(&rising(60)).unwrap();
        assert!(result.macd_line > 0.0);
    }

    #[test]
    fn macd_state_matches_batch_series() {
        let prices: Vec<f64> = (0..80)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0 + i as f64 * 0.1)
            .collect();
        let batch = macd_series(&prices, 12, 26, 9);

        let mut state = MacdState::new(12, 26, 9);
        let points: Vec<MacdPoint> = prices.iter().filter_map(|&p| state.update(p)).collect();
        let signals: Vec<f64> = points.iter().filter_map(|p| p.signal).collect();

        assert_eq!(points.len(), batch.line.len());
        assert_eq!(signals.len(), batch.signal.len());
        for (p, line) in points.iter().zip(&batch.line) {
            assert_abs_diff_eq!(p.line, *line, epsilon = 1e-9);
        }
        for (s, expected) in signals.iter().zip(&batch.signal) {
            assert_abs_diff_eq!(*s, *expected, epsilon = 1e-9);
        }
    }
}
