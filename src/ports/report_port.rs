//! Report writing port trait.

use crate::domain::error::BotsimError;
use crate::domain::simulation::SimulationResult;
use std::path::Path;

/// Port for persisting simulation results.
pub trait ReportPort {
    fn write(&self, result: &SimulationResult, output_path: &Path) -> Result<(), BotsimError>;
}
