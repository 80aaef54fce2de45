//! Simple Moving Average.
//!
//! SMA(n) = mean of the last n closes.
//! Warmup: first (n-1) bars are unavailable.

use std::collections::VecDeque;

/// Rolling SMA over a fixed window.
#[derive(Debug, Clone)]
pub struct SmaState {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl SmaState {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.period == 0 {
            return None;
        }
        self.window.push_back(value);
        self.sum += value;
        if self.window.len() > self.period {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old;
            }
        }
        if self.window.len() == self.period {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }
}

pub fn sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// One value per bar from index `period - 1` onward.
pub fn sma_series(prices: &[f64], period: usize) -> Vec<f64> {
    let mut state = SmaState::new(period);
    prices.iter().filter_map(|&p| state.update(p)).collect()
}
