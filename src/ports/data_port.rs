//! Price data access port trait.

use crate::domain::error::FxcrossError;
use crate::domain::price_bar::PriceBar;

pub trait DataPort {
    /// Bars sorted by strictly increasing timestamp.
    fn fetch_bars(&self) -> Result<Vec<PriceBar>, FxcrossError>;

    /// Human-readable origin of the bars, used in messages.
    fn source(&self) -> String;
}
