//! Price data access port trait.

use crate::domain::error::BotsimError;
use crate::domain::price_series::PriceSeries;

pub trait DataPort {
    /// Load a close/high/low history, oldest bar first.
    fn load_prices(&self, source: &str) -> Result<PriceSeries, BotsimError>;
}
