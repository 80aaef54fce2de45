//! Average True Range with Wilder's smoothing.
//!
//! TR[i] = max(H[i]-L[i], |H[i]-C[i-1]|, |L[i]-C[i-1]|), defined from bar 1.
//! Seed: mean of the first n true ranges; then ATR = (ATR*(n-1) + TR) / n.
//! Warmup: first n bars are unavailable.

use crate::domain::price_series::true_range;

#[derive(Debug, Clone)]
pub struct AtrState {
    period: usize,
    prev_close: Option<f64>,
    seen: usize,
    tr_sum: f64,
    atr: Option<f64>,
}

impl AtrState {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            seen: 0,
            tr_sum: 0.0,
            atr: None,
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let prev_close = self.prev_close.replace(close)?;
        if self.period == 0 {
            return None;
        }

        let tr = true_range(high, low, prev_close);
        let n = self.period as f64;
        match self.atr {
            Some(prev) => self.atr = Some((prev * (n - 1.0) + tr) / n),
            None => {
                self.tr_sum += tr;
                self.seen += 1;
                if self.seen == self.period {
                    self.atr = Some(self.tr_sum / n);
                }
            }
        }
        self.atr
    }
}

pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    atr_series(highs, lows, closes, period).last().copied()
}

/// One value per bar from index `period` onward. Columns are read in
/// lockstep; the shortest column bounds the series.
pub fn atr_series(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    let mut state = AtrState::new(period);
    highs
        .iter()
        .zip(lows)
        .zip(closes)
        .filter_map(|((&h, &l), &c)| state.update(h, l, c))
        .collect()
}
