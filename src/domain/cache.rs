//! Per-run indicator memoization.
//!
//! Each indicator series is computed once, on first request, and kept for
//! the lifetime of the cache. Lookups translate a bar index of the price
//! series into an index of the (shorter) indicator series using
//! [`IndicatorType::first_bar`].

use std::collections::HashMap;

use crate::domain::indicator::{
    atr_series, bollinger_series, ema_series, macd_series, rsi_series, sma_series,
    stochastic_series, BollingerResult, IndicatorField, IndicatorKind, IndicatorType,
    MacdSeries, StochasticSeries,
};
use crate::domain::price_series::PriceSeries;

/// A computed series, front-truncated to its first defined value.
#[derive(Debug, Clone)]
pub enum CachedSeries {
    Simple(Vec<f64>),
    Macd(MacdSeries),
    Bollinger(Vec<BollingerResult>),
    Stochastic(StochasticSeries),
}

impl CachedSeries {
    fn compute(indicator: &IndicatorType, prices: &PriceSeries) -> Self {
        let closes = prices.close();
        match *indicator {
            IndicatorType::Sma(period) => CachedSeries::Simple(sma_series(closes, period)),
            IndicatorType::Ema(period) => CachedSeries::Simple(ema_series(closes, period)),
            IndicatorType::Rsi(period) => CachedSeries::Simple(rsi_series(closes, period)),
            IndicatorType::Atr(period) => CachedSeries::Simple(atr_series(
                prices.high(),
                prices.low(),
                closes,
                period,
            )),
            IndicatorType::Macd { fast, slow, signal } => {
                CachedSeries::Macd(macd_series(closes, fast, slow, signal))
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => CachedSeries::Bollinger(bollinger_series(
                closes,
                period,
                stddev_mult_x100 as f64 / 100.0,
            )),
            IndicatorType::Stochastic { k_period, d_period } => {
                CachedSeries::Stochastic(stochastic_series(
                    prices.high(),
                    prices.low(),
                    closes,
                    k_period,
                    d_period,
                ))
            }
        }
    }

    /// Value of `field` at `index` within this series.
    fn get(&self, field: &IndicatorField, index: usize) -> Option<f64> {
        use IndicatorField as F;
        match (self, field) {
            (CachedSeries::Simple(values), F::Value) => values.get(index).copied(),
            (CachedSeries::Macd(m), F::MacdLine) => m.line.get(index).copied(),
            (CachedSeries::Macd(m), F::MacdSignal) => m.signal.get(index).copied(),
            (CachedSeries::Macd(m), F::MacdHistogram) => m.histogram.get(index).copied(),
            (CachedSeries::Bollinger(b), F::BollingerUpper) => b.get(index).map(|r| r.upper),
            (CachedSeries::Bollinger(b), F::BollingerMiddle) => b.get(index).map(|r| r.middle),
            (CachedSeries::Bollinger(b), F::BollingerLower) => b.get(index).map(|r| r.lower),
            (CachedSeries::Bollinger(b), F::BollingerBandwidth) => {
                b.get(index).map(|r| r.bandwidth)
            }
            (CachedSeries::Stochastic(s), F::StochasticK) => s.k.get(index).copied(),
            (CachedSeries::Stochastic(s), F::StochasticD) => s.d.get(index).copied(),
            _ => None,
        }
    }
}

/// Lazily-populated indicator series over one price history.
///
/// The cache borrows its price series, so it can never be pointed at a
/// second history.
#[derive(Debug)]
pub struct IndicatorCache<'a> {
    prices: &'a PriceSeries,
    series: HashMap<IndicatorType, CachedSeries>,
}

impl<'a> IndicatorCache<'a> {
    pub fn new(prices: &'a PriceSeries) -> Self {
        Self {
            prices,
            series: HashMap::new(),
        }
    }

    /// Number of distinct indicator series computed so far.
    pub fn computed(&self) -> usize {
        self.series.len()
    }

    /// Full series for `indicator`, computing it on first use.
    pub fn series(&mut self, indicator: &IndicatorType) -> &CachedSeries {
        let prices = self.prices;
        self.series
            .entry(indicator.clone())
            .or_insert_with(|| CachedSeries::compute(indicator, prices))
    }

    /// Primary value of `kind` at `bar`. `Price` reads the close directly;
    /// `period` is ignored for it.
    pub fn value_at_bar(&mut self, kind: &IndicatorKind, bar: usize, period: usize) -> Option<f64> {
        self.field_at_bar(kind, &IndicatorField::Value, bar, period)
    }

    pub fn field_at_bar(
        &mut self,
        kind: &IndicatorKind,
        field: &IndicatorField,
        bar: usize,
        period: usize,
    ) -> Option<f64> {
        match kind {
            IndicatorKind::Price => match field {
                IndicatorField::Value => self.prices.close_at(bar),
                _ => None,
            },
            IndicatorKind::Unrecognized(_) => None,
            _ => {
                let indicator = kind.indicator_type(period)?;
                self.indicator_at_bar(&indicator, field, bar)
            }
        }
    }

    pub fn indicator_at_bar(
        &mut self,
        indicator: &IndicatorType,
        field: &IndicatorField,
        bar: usize,
    ) -> Option<f64> {
        let field = indicator.resolve_field(field)?;
        let index = bar.checked_sub(indicator.first_bar(&field))?;
        self.series(indicator).get(&field, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{ema, rsi, sma};
    use approx::assert_relative_eq;

    fn wave(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 2000.0 + (i as f64 * 0.1).sin() * 20.0 + i as f64 * 0.05)
            .collect();
        let highs = closes.iter().map(|c| c + 2.0).collect();
        let lows = closes.iter().map(|c| c - 2.0).collect();
        PriceSeries::new(closes, highs, lows).unwrap()
    }

    #[test]
    fn price_reads_close_directly() {
        let prices = wave(10);
        let mut cache = IndicatorCache::new(&prices);
        assert_eq!(
            cache.value_at_bar(&IndicatorKind::Price, 3, 14),
            Some(prices.close()[3])
        );
        assert_eq!(cache.value_at_bar(&IndicatorKind::Price, 10, 14), None);
        assert_eq!(cache.computed(), 0);
    }

    #[test]
    fn rsi_absent_during_warmup() {
        let prices = wave(100);
        let mut cache = IndicatorCache::new(&prices);
        assert_eq!(cache.value_at_bar(&IndicatorKind::Rsi, 13, 14), None);
        let value = cache.value_at_bar(&IndicatorKind::Rsi, 50, 14).unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn rsi_offset_matches_prefix_calculation() {
        let prices = wave(60);
        let mut cache = IndicatorCache::new(&prices);
        for bar in [14, 20, 59] {
            let cached = cache.value_at_bar(&IndicatorKind::Rsi, bar, 14).unwrap();
            let direct = rsi::rsi(&prices.close()[..=bar], 14).unwrap();
            assert_relative_eq!(cached, direct, epsilon = 1e-9);
        }
    }

    #[test]
    fn sma_and_ema_offsets() {
        let prices = wave(60);
        let mut cache = IndicatorCache::new(&prices);

        assert_eq!(cache.value_at_bar(&IndicatorKind::Sma, 18, 20), None);
        let sma_19 = cache.value_at_bar(&IndicatorKind::Sma, 19, 20).unwrap();
        assert_relative_eq!(
            sma_19,
            sma::sma(&prices.close()[..20], 20).unwrap(),
            epsilon = 1e-9
        );

        let ema_40 = cache.value_at_bar(&IndicatorKind::Ema, 40, 20).unwrap();
        assert_relative_eq!(
            ema_40,
            ema::ema(&prices.close()[..=40], 20).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn out_of_range_bar_is_absent() {
        let prices = wave(30);
        let mut cache = IndicatorCache::new(&prices);
        assert_eq!(cache.value_at_bar(&IndicatorKind::Sma, 30, 5), None);
        assert_eq!(cache.value_at_bar(&IndicatorKind::Sma, 500, 5), None);
    }

    #[test]
    fn series_computed_once_per_key() {
        let prices = wave(80);
        let mut cache = IndicatorCache::new(&prices);
        for bar in 0..80 {
            cache.value_at_bar(&IndicatorKind::Rsi, bar, 14);
            cache.value_at_bar(&IndicatorKind::Sma, bar, 20);
        }
        assert_eq!(cache.computed(), 2);

        cache.value_at_bar(&IndicatorKind::Sma, 40, 50);
        assert_eq!(cache.computed(), 3);
    }

    #[test]
    fn macd_fields_use_compound_offsets() {
        let prices = wave(80);
        let mut cache = IndicatorCache::new(&prices);

        assert_eq!(
            cache.field_at_bar(&IndicatorKind::Macd, &IndicatorField::MacdLine, 24, 0),
            None
        );
        assert!(
            cache
                .field_at_bar(&IndicatorKind::Macd, &IndicatorField::MacdLine, 25, 0)
                .is_some()
        );
        assert_eq!(
            cache.field_at_bar(&IndicatorKind::Macd, &IndicatorField::MacdSignal, 32, 0),
            None
        );

        let line = cache
            .field_at_bar(&IndicatorKind::Macd, &IndicatorField::MacdLine, 79, 0)
            .unwrap();
        let signal = cache
            .field_at_bar(&IndicatorKind::Macd, &IndicatorField::MacdSignal, 79, 0)
            .unwrap();
        let histogram = cache
            .field_at_bar(&IndicatorKind::Macd, &IndicatorField::MacdHistogram, 79, 0)
            .unwrap();
        assert_relative_eq!(histogram, line - signal, epsilon = 1e-9);

        let last = crate::domain::indicator::macd::macd_default(prices.close()).unwrap();
        assert_relative_eq!(line, last.macd_line, epsilon = 1e-9);
        assert_relative_eq!(signal, last.signal_line, epsilon = 1e-9);
    }

    #[test]
    fn bollinger_fields_are_ordered() {
        let prices = wave(60);
        let mut cache = IndicatorCache::new(&prices);
        let kind = IndicatorKind::Bollinger;
        let upper = cache
            .field_at_bar(&kind, &IndicatorField::BollingerUpper, 40, 20)
            .unwrap();
        let middle = cache.value_at_bar(&kind, 40, 20).unwrap();
        let lower = cache
            .field_at_bar(&kind, &IndicatorField::BollingerLower, 40, 20)
            .unwrap();
        assert!(upper >= middle && middle >= lower);
        assert_eq!(cache.field_at_bar(&kind, &IndicatorField::BollingerLower, 18, 20), None);
    }

    #[test]
    fn stochastic_and_atr_offsets() {
        let prices = wave(40);
        let mut cache = IndicatorCache::new(&prices);

        assert_eq!(cache.value_at_bar(&IndicatorKind::Stochastic, 12, 14), None);
        assert!(cache.value_at_bar(&IndicatorKind::Stochastic, 13, 14).is_some());
        assert_eq!(
            cache.field_at_bar(&IndicatorKind::Stochastic, &IndicatorField::StochasticD, 14, 14),
            None
        );
        assert!(
            cache
                .field_at_bar(&IndicatorKind::Stochastic, &IndicatorField::StochasticD, 15, 14)
                .is_some()
        );

        assert_eq!(cache.value_at_bar(&IndicatorKind::Atr, 13, 14), None);
        assert!(cache.value_at_bar(&IndicatorKind::Atr, 14, 14).is_some());
    }

    #[test]
    fn foreign_field_and_unknown_kind_are_absent() {
        let prices = wave(40);
        let mut cache = IndicatorCache::new(&prices);
        assert_eq!(
            cache.field_at_bar(&IndicatorKind::Sma, &IndicatorField::MacdSignal, 30, 5),
            None
        );
        assert_eq!(
            cache.field_at_bar(&IndicatorKind::Price, &IndicatorField::BollingerUpper, 30, 5),
            None
        );
        assert_eq!(
            cache.value_at_bar(&IndicatorKind::Unrecognized("VWAP".into()), 30, 5),
            None
        );
        let percent_b = IndicatorField::Unrecognized("percent_b".into());
        assert_eq!(cache.field_at_bar(&IndicatorKind::Bollinger, &percent_b, 30, 20), None);
    }
}
