//! Deterministic synthetic price generation.
//!
//! A seed input (integer or text) and the run duration are hashed with
//! BLAKE3 into a 64-bit seed for a ChaCha8 generator, so the same inputs
//! always produce the same price path on every platform.
//!
//! close[i] = base + trend * i + amplitude * sin(frequency * i) + U(-vol, vol)
//! high[i]  = close[i] + U(0, vol * wick_factor)
//! low[i]   = close[i] - U(0, vol * wick_factor)
//!
//! `vol` is `cluster_volatility` for bars strictly inside a cluster range and
//! `base_volatility` elsewhere.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;

use crate::domain::price_series::PriceSeries;

/// Caller-supplied seed material, typically a bot identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedInput {
    Integer(i64),
    Text(String),
}

impl From<i64> for SeedInput {
    fn from(value: i64) -> Self {
        SeedInput::Integer(value)
    }
}

impl From<&str> for SeedInput {
    /// Text that parses as an integer is treated as that integer, so `"42"`
    /// and `42` seed the same path.
    fn from(value: &str) -> Self {
        match value.trim().parse::<i64>() {
            Ok(n) => SeedInput::Integer(n),
            Err(_) => SeedInput::Text(value.to_string()),
        }
    }
}

impl From<String> for SeedInput {
    fn from(value: String) -> Self {
        SeedInput::from(value.as_str())
    }
}

impl fmt::Display for SeedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedInput::Integer(n) => write!(f, "{}", n),
            SeedInput::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 64-bit generator seed for `(input, duration_days)`.
pub fn derive_seed(input: &SeedInput, duration_days: u32) -> u64 {
    let mut hasher = blake3::Hasher::new();
    match input {
        SeedInput::Integer(n) => {
            hasher.update(b"int");
            hasher.update(&n.to_le_bytes());
        }
        SeedInput::Text(s) => {
            hasher.update(b"str");
            hasher.update(&(s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
    }
    hasher.update(&duration_days.to_le_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketModel {
    pub base_price: f64,
    pub trend_per_bar: f64,
    pub sine_amplitude: f64,
    pub sine_frequency: f64,
    pub base_volatility: f64,
    pub cluster_volatility: f64,
    /// Exclusive `(start, end)` bar ranges with raised volatility.
    pub clusters: Vec<(usize, usize)>,
    pub wick_factor: f64,
}

impl Default for MarketModel {
    fn default() -> Self {
        Self {
            base_price: 2000.0,
            trend_per_bar: 0.05,
            sine_amplitude: 20.0,
            sine_frequency: 0.1,
            base_volatility: 5.0,
            cluster_volatility: 10.0,
            clusters: vec![(200, 400), (600, 800)],
            wick_factor: 0.5,
        }
    }
}

impl MarketModel {
    pub fn volatility_at(&self, bar: usize) -> f64 {
        if self
            .clusters
            .iter()
            .any(|&(start, end)| bar > start && bar < end)
        {
            self.cluster_volatility
        } else {
            self.base_volatility
        }
    }

    /// Short description recorded in simulation results.
    pub fn label(&self) -> String {
        format!(
            "synthetic(base={}, trend={}/bar, sine={}*sin({}*i), vol={}/{} clustered)",
            self.base_price,
            self.trend_per_bar,
            self.sine_amplitude,
            self.sine_frequency,
            self.base_volatility,
            self.cluster_volatility
        )
    }
}

/// Parse `"200-400,600-800"` into cluster ranges. An empty string means no
/// clusters.
pub fn parse_clusters(s: &str) -> Result<Vec<(usize, usize)>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (start, end) = part
                .split_once('-')
                .ok_or_else(|| format!("cluster '{}' must look like start-end", part))?;
            let start: usize = start
                .trim()
                .parse()
                .map_err(|_| format!("cluster start '{}' is not a bar index", start.trim()))?;
            let end: usize = end
                .trim()
                .parse()
                .map_err(|_| format!("cluster end '{}' is not a bar index", end.trim()))?;
            if start >= end {
                return Err(format!("cluster '{}' must have start < end", part));
            }
            Ok((start, end))
        })
        .collect()
}

/// Uniform draw over `[low, high]`; `low` when the range is empty.
fn uniform(rng: &mut ChaCha8Rng, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

pub fn generate_prices(model: &MarketModel, bars: usize, seed: u64) -> PriceSeries {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut close = Vec::with_capacity(bars);
    let mut high = Vec::with_capacity(bars);
    let mut low = Vec::with_capacity(bars);

    for i in 0..bars {
        let x = i as f64;
        let vol = model.volatility_at(i).abs();
        let noise = uniform(&mut rng, -vol, vol);
        let c = model.base_price
            + model.trend_per_bar * x
            + model.sine_amplitude * (model.sine_frequency * x).sin()
            + noise;

        let wick = vol * model.wick_factor.abs();
        let up = uniform(&mut rng, 0.0, wick);
        let down = uniform(&mut rng, 0.0, wick);

        close.push(c);
        high.push(c + up);
        low.push(c - down);
    }

    PriceSeries::from_parts(close, high, low)
}
