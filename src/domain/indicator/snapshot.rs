//! Standard indicator readings at the most recent bar.

use serde::Serialize;

use crate::domain::indicator::{
    atr, bollinger, ema, macd, rsi, sma, stochastic, BollingerResult, MacdResult,
    StochasticResult, DEFAULT_STOCHASTIC_D, DEFAULT_STOCHASTIC_K,
};
use crate::domain::price_series::PriceSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub rsi_14: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub macd: Option<MacdResult>,
    pub bollinger: Option<BollingerResult>,
    pub atr_14: Option<f64>,
    pub stochastic: Option<StochasticResult>,
}

impl IndicatorSnapshot {
    pub fn compute(series: &PriceSeries) -> Self {
        let closes = series.close();
        Self {
            rsi_14: rsi::rsi(closes, 14),
            sma_20: sma::sma(closes, 20),
            sma_50: sma::sma(closes, 50),
            ema_12: ema::ema(closes, 12),
            ema_26: ema::ema(closes, 26),
            macd: macd::macd_default(closes),
            bollinger: bollinger::bollinger(
                closes,
                bollinger::DEFAULT_PERIOD,
                bollinger::DEFAULT_MULTIPLIER,
            ),
            atr_14: atr::atr(series.high(), series.low(), closes, 14),
            stochastic: stochastic::stochastic(
                series.high(),
                series.low(),
                closes,
                DEFAULT_STOCHASTIC_K,
                DEFAULT_STOCHASTIC_D,
            ),
        }
    }
}
