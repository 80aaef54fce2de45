//! Close/high/low price history.

use crate::domain::error::BotsimError;

/// Three equal-length price columns, oldest bar first.
///
/// Immutable once built; a simulation run owns exactly one.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    close: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
}

impl PriceSeries {
    pub fn new(close: Vec<f64>, high: Vec<f64>, low: Vec<f64>) -> Result<Self, BotsimError> {
        if close.len() != high.len() || close.len() != low.len() {
            return Err(BotsimError::SeriesLength {
                close: close.len(),
                high: high.len(),
                low: low.len(),
            });
        }
        Ok(Self { close, high, low })
    }

    /// Columns the caller has built in lockstep.
    pub(crate) fn from_parts(close: Vec<f64>, high: Vec<f64>, low: Vec<f64>) -> Self {
        debug_assert!(close.len() == high.len() && close.len() == low.len());
        Self { close, high, low }
    }

    /// Series with no intrabar range: high and low both equal close.
    pub fn from_closes(close: Vec<f64>) -> Self {
        Self {
            high: close.clone(),
            low: close.clone(),
            close,
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close_at(&self, bar: usize) -> Option<f64> {
        self.close.get(bar).copied()
    }
}

/// max(high - low, |high - prev_close|, |low - prev_close|)
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_lengths() {
        let err = PriceSeries::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            BotsimError::SeriesLength {
                close: 2,
                high: 1,
                low: 2
            }
        ));
    }

    #[test]
    fn from_closes_mirrors_columns() {
        let series = PriceSeries::from_closes(vec![10.0, 11.0]);
        assert_eq!(series.high(), series.close());
        assert_eq!(series.low(), series.close());
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn close_at_out_of_range() {
        let series = PriceSeries::from_closes(vec![10.0]);
        assert_eq!(series.close_at(0), Some(10.0));
        assert_eq!(series.close_at(1), None);
    }

    #[test]
    fn true_range_hl_dominates() {
        // high-low=20, |110-100|=10, |90-100|=10 -> 20
        assert!((true_range(110.0, 90.0, 100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        // high-low=20, |110-70|=40, |90-70|=20 -> 40
        assert!((true_range(110.0, 90.0, 70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        // high-low=20, |110-130|=20, |90-130|=40 -> 40
        assert!((true_range(110.0, 90.0, 130.0) - 40.0).abs() < f64::EPSILON);
    }
}
