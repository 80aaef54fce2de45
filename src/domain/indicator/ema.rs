//! Exponential Moving Average.
//!
//! k = smoothing/(n+1), seed with the SMA of the first n values, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are unavailable.

pub const DEFAULT_SMOOTHING: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct EmaState {
    period: usize,
    k: f64,
    seed_sum: f64,
    seen: usize,
    ema: Option<f64>,
}

impl EmaState {
    pub fn new(period: usize) -> Self {
        Self::with_smoothing(period, DEFAULT_SMOOTHING)
    }

    pub fn with_smoothing(period: usize, smoothing: f64) -> Self {
        Self {
            period,
            k: smoothing / (period as f64 + 1.0),
            seed_sum: 0.0,
            seen: 0,
            ema: None,
        }
    }

    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.period == 0 {
            return None;
        }
        match self.ema {
            Some(prev) => {
                let next = value * self.k + prev * (1.0 - self.k);
                self.ema = Some(next);
            }
            None => {
                self.seed_sum += value;
                self.seen += 1;
                if self.seen == self.period {
                    self.ema = Some(self.seed_sum / self.period as f64);
                }
            }
        }
        self.ema
    }

    pub fn value(&self) -> Option<f64> {
        self.ema
    }
}

pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    ema_with_smoothing(prices, period, DEFAULT_SMOOTHING)
}

pub fn ema_with_smoothing(prices: &[f64], period: usize, smoothing: f64) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let mut state = EmaState::with_smoothing(period, smoothing);
    prices.iter().fold(None, |_, &p| state.update(p))
}

/// Every EMA value from the seed onward; the first entry is the seed SMA.
pub fn ema_series(prices: &[f64], period: usize) -> Vec<f64> {
    ema_series_with_smoothing(prices, period, DEFAULT_SMOOTHING)
}

pub fn ema_series_with_smoothing(prices: &[f64], period: usize, smoothing: f64) -> Vec<f64> {
    let mut state = EmaState::with_smoothing(period, smoothing);
    prices.iter().filter_map(|&p| state.update(p)).collect()
}
