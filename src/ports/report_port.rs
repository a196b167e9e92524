//! Report generation port trait.

use crate::domain::error::FxcrossError;
use crate::domain::position::Trade;
use std::path::Path;

/// Port for writing trade logs.
pub trait ReportPort {
    fn write(&self, trades: &[Trade], output_path: &Path) -> Result<(), FxcrossError>;
}
