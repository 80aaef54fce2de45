#![allow(dead_code)]

use botsim::domain::error::BotsimError;
use botsim::domain::indicator::IndicatorKind;
use botsim::domain::price_series::PriceSeries;
use botsim::domain::rule::{Action, Operator, Rule};
use botsim::domain::simulation::SimulationConfig;
use botsim::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;

pub struct MockDataPort {
    pub data: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, source: &str, series: PriceSeries) -> Self {
        self.data.insert(source.to_string(), series);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_prices(&self, source: &str) -> Result<PriceSeries, BotsimError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(BotsimError::DataLoad {
                source_name: source.to_string(),
                reason: reason.clone(),
            });
        }
        self.data
            .get(source)
            .cloned()
            .ok_or_else(|| BotsimError::DataLoad {
                source_name: source.to_string(),
                reason: "not found".into(),
            })
    }
}

pub fn closes(values: &[f64]) -> PriceSeries {
    PriceSeries::from_closes(values.to_vec())
}

/// Sine wave around 100 with a one-point wick either side.
pub fn wave(n: usize) -> PriceSeries {
    let close: Vec<f64> = (0..n)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 10.0)
        .collect();
    let high = close.iter().map(|c| c + 1.0).collect();
    let low = close.iter().map(|c| c - 1.0).collect();
    PriceSeries::new(close, high, low).unwrap()
}

pub fn price_rule(order: i32, operator: Operator, threshold: f64, action: Action) -> Rule {
    Rule::new(order, IndicatorKind::Price, operator, threshold, action)
}

pub fn rsi_rule(order: i32, operator: Operator, threshold: f64, action: Action) -> Rule {
    Rule::new(order, IndicatorKind::Rsi, operator, threshold, action)
}

/// Buy when RSI(14) < 30, close when RSI(14) > 70.
pub fn rsi_mean_reversion() -> Vec<Rule> {
    vec![
        rsi_rule(1, Operator::LessThan, 30.0, Action::Buy),
        rsi_rule(2, Operator::GreaterThan, 70.0, Action::ClosePosition),
    ]
}

pub fn no_warmup() -> SimulationConfig {
    SimulationConfig {
        warmup_bars: 0,
        ..SimulationConfig::default()
    }
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub const VALID_INI: &str = r#"
[simulation]
duration_days = 5
initial_balance = 10000
seed = gold-bot-1
bars_per_day = 96
warmup_bars = 50
position_size = 10
max_reasons = 20

[market]
base_price = 2000
trend_per_bar = 0.05
sine_amplitude = 20
sine_frequency = 0.1
base_volatility = 5
cluster_volatility = 10
clusters = 200-400,600-800
wick_factor = 0.5

[rule.oversold]
order = 1
indicator = RSI
period = 14
operator = less_than
threshold = 30
action = Buy

[rule.overbought]
order = 2
indicator = RSI
operator = greater_than
threshold = 70
action = Close Position

[rule.unused]
order = 3
indicator = SMA
period = 50
operator = crosses_above
threshold = 2000
action = Sell
enabled = false
"#;
