//! Technical indicator implementations.
//!
//! This module provides the types shared by every indicator:
//! - `IndicatorKind`: the indicator family a rule refers to (including raw price)
//! - `IndicatorType`: indicator identity + parameters (serves as the cache key)
//! - `IndicatorField`: which output of a multi-output indicator to read
//! - `MacdResult`, `BollingerResult`, `StochasticResult`: multi-output values
//!
//! Each indicator submodule exposes a scalar function (value at the last bar),
//! a series function, and an incremental state that accepts one sample at a
//! time. Series functions are folds over the incremental state.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod stochastic;

pub use atr::{atr, atr_series, AtrState};
pub use bollinger::{bollinger, bollinger_series, BollingerState};
pub use ema::{ema, ema_series, ema_series_with_smoothing, ema_with_smoothing, EmaState};
pub use macd::{macd, macd_series, MacdSeries, MacdState};
pub use rsi::{rsi, rsi_series, RsiState};
pub use sma::{sma, sma_series, SmaState};
pub use snapshot::IndicatorSnapshot;
pub use stochastic::{stochastic, stochastic_series, StochasticSeries, StochasticState};

use serde::Serialize;
use std::fmt;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_MA_PERIOD: usize = 20;
pub const DEFAULT_ATR_PERIOD: usize = 14;
pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_MULT_X100: u32 = 200;
pub const DEFAULT_STOCHASTIC_K: usize = 14;
pub const DEFAULT_STOCHASTIC_D: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdResult {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle, 0 when middle is 0.
    pub bandwidth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StochasticResult {
    pub k: f64,
    pub d: f64,
}

/// Indicator family named by a rule.
///
/// Names coming from outside the crate that do not match a known family are
/// kept as `Unrecognized`; lookups against them are always absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Price,
    Sma,
    Ema,
    Rsi,
    Macd,
    Bollinger,
    Atr,
    Stochastic,
    Unrecognized(String),
}

impl IndicatorKind {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "price" | "close" => IndicatorKind::Price,
            "sma" => IndicatorKind::Sma,
            "ema" => IndicatorKind::Ema,
            "rsi" => IndicatorKind::Rsi,
            "macd" => IndicatorKind::Macd,
            "bollinger" | "bollinger bands" | "bollinger_bands" | "bb" => IndicatorKind::Bollinger,
            "atr" => IndicatorKind::Atr,
            "stochastic" | "stoch" => IndicatorKind::Stochastic,
            _ => IndicatorKind::Unrecognized(name.trim().to_string()),
        }
    }

    /// Period used when a rule does not name one.
    pub fn default_period(&self) -> usize {
        match self {
            IndicatorKind::Sma | IndicatorKind::Ema => DEFAULT_MA_PERIOD,
            IndicatorKind::Bollinger => DEFAULT_BOLLINGER_PERIOD,
            IndicatorKind::Atr => DEFAULT_ATR_PERIOD,
            IndicatorKind::Stochastic => DEFAULT_STOCHASTIC_K,
            IndicatorKind::Rsi
            | IndicatorKind::Macd
            | IndicatorKind::Price
            | IndicatorKind::Unrecognized(_) => DEFAULT_RSI_PERIOD,
        }
    }

    /// Cache key for this family at `period`.
    ///
    /// `Price` is read straight from the series and has no key. MACD ignores
    /// `period` and always uses 12/26/9; Stochastic uses `period` as %K with a
    /// 3-bar %D; Bollinger uses a 2.0 standard deviation multiplier.
    pub fn indicator_type(&self, period: usize) -> Option<IndicatorType> {
        match self {
            IndicatorKind::Price | IndicatorKind::Unrecognized(_) => None,
            IndicatorKind::Sma => Some(IndicatorType::Sma(period)),
            IndicatorKind::Ema => Some(IndicatorType::Ema(period)),
            IndicatorKind::Rsi => Some(IndicatorType::Rsi(period)),
            IndicatorKind::Atr => Some(IndicatorType::Atr(period)),
            IndicatorKind::Macd => Some(IndicatorType::Macd {
                fast: macd::DEFAULT_FAST,
                slow: macd::DEFAULT_SLOW,
                signal: macd::DEFAULT_SIGNAL,
            }),
            IndicatorKind::Bollinger => Some(IndicatorType::Bollinger {
                period,
                stddev_mult_x100: DEFAULT_BOLLINGER_MULT_X100,
            }),
            IndicatorKind::Stochastic => Some(IndicatorType::Stochastic {
                k_period: period,
                d_period: DEFAULT_STOCHASTIC_D,
            }),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Price => write!(f, "Price"),
            IndicatorKind::Sma => write!(f, "SMA"),
            IndicatorKind::Ema => write!(f, "EMA"),
            IndicatorKind::Rsi => write!(f, "RSI"),
            IndicatorKind::Macd => write!(f, "MACD"),
            IndicatorKind::Bollinger => write!(f, "Bollinger"),
            IndicatorKind::Atr => write!(f, "ATR"),
            IndicatorKind::Stochastic => write!(f, "Stochastic"),
            IndicatorKind::Unrecognized(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
}

/// Output selector for multi-output indicators.
///
/// `Value` always means the primary output: the MACD line, the Bollinger
/// middle band, or Stochastic %K. Unknown output names are kept as
/// `Unrecognized` and never resolve to a reading.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
    BollingerBandwidth,
    StochasticK,
    StochasticD,
    Unrecognized(String),
}

impl IndicatorField {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "value" => IndicatorField::Value,
            "line" | "macd" | "macd_line" => IndicatorField::MacdLine,
            "signal" | "signal_line" => IndicatorField::MacdSignal,
            "histogram" | "hist" => IndicatorField::MacdHistogram,
            "upper" => IndicatorField::BollingerUpper,
            "middle" => IndicatorField::BollingerMiddle,
            "lower" => IndicatorField::BollingerLower,
            "bandwidth" => IndicatorField::BollingerBandwidth,
            "k" | "%k" => IndicatorField::StochasticK,
            "d" | "%d" => IndicatorField::StochasticD,
            _ => IndicatorField::Unrecognized(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IndicatorField::Value => "value",
            IndicatorField::MacdLine => "line",
            IndicatorField::MacdSignal => "signal",
            IndicatorField::MacdHistogram => "histogram",
            IndicatorField::BollingerUpper => "upper",
            IndicatorField::BollingerMiddle => "middle",
            IndicatorField::BollingerLower => "lower",
            IndicatorField::BollingerBandwidth => "bandwidth",
            IndicatorField::StochasticK => "k",
            IndicatorField::StochasticD => "d",
            IndicatorField::Unrecognized(name) => name,
        }
    }
}

impl IndicatorType {
    /// Map `field` onto a concrete output of this indicator, or `None` if the
    /// indicator has no such output.
    pub fn resolve_field(&self, field: &IndicatorField) -> Option<IndicatorField> {
        use IndicatorField as F;
        match (self, field) {
            (
                IndicatorType::Sma(_)
                | IndicatorType::Ema(_)
                | IndicatorType::Rsi(_)
                | IndicatorType::Atr(_),
                F::Value,
            ) => Some(F::Value),
            (IndicatorType::Macd { .. }, F::Value) => Some(F::MacdLine),
            (IndicatorType::Macd { .. }, F::MacdLine | F::MacdSignal | F::MacdHistogram) => {
                Some(field.clone())
            }
            (IndicatorType::Bollinger { .. }, F::Value) => Some(F::BollingerMiddle),
            (
                IndicatorType::Bollinger { .. },
                F::BollingerUpper | F::BollingerMiddle | F::BollingerLower | F::BollingerBandwidth,
            ) => Some(field.clone()),
            (IndicatorType::Stochastic { .. }, F::Value) => Some(F::StochasticK),
            (IndicatorType::Stochastic { .. }, F::StochasticK | F::StochasticD) => {
                Some(field.clone())
            }
            _ => None,
        }
    }

    /// Bar index (in the price series) of the first element of the series
    /// backing `field`.
    ///
    /// Moving averages and bands start at `period - 1`; RSI and ATR need one
    /// extra bar for the first delta; MACD and %D compound the warmups of the
    /// series they are built on.
    pub fn first_bar(&self, field: &IndicatorField) -> usize {
        match self {
            IndicatorType::Sma(period)
            | IndicatorType::Ema(period)
            | IndicatorType::Bollinger { period, .. } => period.saturating_sub(1),
            IndicatorType::Rsi(period) | IndicatorType::Atr(period) => *period,
            IndicatorType::Macd { slow, signal, .. } => match field {
                IndicatorField::MacdSignal | IndicatorField::MacdHistogram => {
                    (slow + signal).saturating_sub(2)
                }
                _ => slow.saturating_sub(1),
            },
            IndicatorType::Stochastic { k_period, d_period } => match field {
                IndicatorField::StochasticD => (k_period + d_period).saturating_sub(2),
                _ => k_period.saturating_sub(1),
            },
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
    }

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_bollinger() {
        let boll = IndicatorType::Bollinger {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn kind_parse_is_case_insensitive() {
        assert_eq!(IndicatorKind::parse("rsi"), IndicatorKind::Rsi);
        assert_eq!(IndicatorKind::parse(" RSI "), IndicatorKind::Rsi);
        assert_eq!(IndicatorKind::parse("Bollinger Bands"), IndicatorKind::Bollinger);
        assert_eq!(IndicatorKind::parse("PRICE"), IndicatorKind::Price);
    }

    #[test]
    fn kind_parse_keeps_unknown_names() {
        assert_eq!(
            IndicatorKind::parse("Ichimoku"),
            IndicatorKind::Unrecognized("Ichimoku".into())
        );
    }

    #[test]
    fn kind_default_periods() {
        assert_eq!(IndicatorKind::Rsi.default_period(), 14);
        assert_eq!(IndicatorKind::Sma.default_period(), 20);
        assert_eq!(IndicatorKind::Ema.default_period(), 20);
        assert_eq!(IndicatorKind::Atr.default_period(), 14);
    }

    #[test]
    fn price_has_no_indicator_type() {
        assert_eq!(IndicatorKind::Price.indicator_type(14), None);
        assert_eq!(
            IndicatorKind::Unrecognized("x".into()).indicator_type(14),
            None
        );
    }

    #[test]
    fn macd_ignores_period() {
        assert_eq!(
            IndicatorKind::Macd.indicator_type(5),
            Some(IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            })
        );
    }

    #[test]
    fn first_bar_offsets() {
        assert_eq!(IndicatorType::Sma(20).first_bar(&IndicatorField::Value), 19);
        assert_eq!(IndicatorType::Ema(5).first_bar(&IndicatorField::Value), 4);
        assert_eq!(IndicatorType::Rsi(14).first_bar(&IndicatorField::Value), 14);
        assert_eq!(IndicatorType::Atr(14).first_bar(&IndicatorField::Value), 14);

        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.first_bar(&IndicatorField::MacdLine), 25);
        assert_eq!(macd.first_bar(&IndicatorField::MacdSignal), 33);
        assert_eq!(macd.first_bar(&IndicatorField::MacdHistogram), 33);

        let stoch = IndicatorType::Stochastic {
            k_period: 14,
            d_period: 3,
        };
        assert_eq!(stoch.first_bar(&IndicatorField::StochasticK), 13);
        assert_eq!(stoch.first_bar(&IndicatorField::StochasticD), 15);
    }

    #[test]
    fn resolve_field_rejects_foreign_outputs() {
        assert_eq!(
            IndicatorType::Sma(20).resolve_field(&IndicatorField::MacdSignal),
            None
        );
        assert_eq!(
            IndicatorType::Stochastic {
                k_period: 14,
                d_period: 3
            }
            .resolve_field(&IndicatorField::BollingerUpper),
            None
        );
        assert_eq!(
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200
            }
            .resolve_field(&IndicatorField::Value),
            Some(IndicatorField::BollingerMiddle)
        );
    }

    #[test]
    fn field_parse_round_trips_names() {
        for field in [
            IndicatorField::Value,
            IndicatorField::MacdSignal,
            IndicatorField::MacdHistogram,
            IndicatorField::BollingerUpper,
            IndicatorField::BollingerBandwidth,
            IndicatorField::StochasticD,
        ] {
            assert_eq!(IndicatorField::parse(field.as_str()), field);
        }
        assert_eq!(
            IndicatorField::parse(" percent_b "),
            IndicatorField::Unrecognized("percent_b".into())
        );
    }

    #[test]
    fn indicator_type_hash_eq() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(20), "sma20");
        map.insert(IndicatorType::Sma(50), "sma50");
        map.insert(
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            "macd",
        );

        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&"sma20"));
        assert_eq!(map.get(&IndicatorType::Sma(50)), Some(&"sma50"));
        assert_eq!(map.len(), 3);
    }
}
