//! Stochastic Oscillator.
//!
//! %K = (C - lowest low) / (highest high - lowest low) * 100 over k bars,
//! 50 when the window has no range.
//! %D = SMA of the last d %K values.
//! Warmup: %K from bar k-1, %D from bar k+d-2.

use crate::domain::indicator::sma::SmaState;
use crate::domain::indicator::StochasticResult;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticSeries {
    /// Starts at bar k-1.
    pub k: Vec<f64>,
    /// Starts at bar k+d-2.
    pub d: Vec<f64>,
}

/// One %K observation; `d` is absent until enough %K values exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticPoint {
    pub k: f64,
    pub d: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct StochasticState {
    k_period: usize,
    highs: VecDeque<f64>,
    lows: VecDeque<f64>,
    d: SmaState,
}

impl StochasticState {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self {
            k_period,
            highs: VecDeque::with_capacity(k_period),
            lows: VecDeque::with_capacity(k_period),
            d: SmaState::new(d_period),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) -> Option<StochasticPoint> {
        if self.k_period == 0 {
            return None;
        }
        self.highs.push_back(high);
        self.lows.push_back(low);
        if self.highs.len() > self.k_period {
            self.highs.pop_front();
            self.lows.pop_front();
        }
        if self.highs.len() < self.k_period {
            return None;
        }

        let highest = self.highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest = self.lows.iter().copied().fold(f64::INFINITY, f64::min);
        let k = if highest == lowest {
            50.0
        } else {
            (close - lowest) / (highest - lowest) * 100.0
        };
        let d = self.d.update(k);
        Some(StochasticPoint { k, d })
    }
}

pub fn stochastic_series(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> StochasticSeries {
    let mut state = StochasticState::new(k_period, d_period);
    let mut series = StochasticSeries::default();
    for ((&h, &l), &c) in highs.iter().zip(lows).zip(closes) {
        if let Some(point) = state.update(h, l, c) {
            series.k.push(point.k);
            if let Some(d) = point.d {
                series.d.push(d);
            }
        }
    }
    series
}

pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Option<StochasticResult> {
    let series = stochastic_series(highs, lows, closes, k_period, d_period);
    Some(StochasticResult {
        k: *series.k.last()?,
        d: *series.d.last()?,
    })
}
