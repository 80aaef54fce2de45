//! JSON report adapter implementing ReportPort.
//!
//! Writes the full `SimulationResult` as pretty-printed JSON. Non-finite
//! numbers (an unbounded profit factor) serialize as `null`.

use std::fs;
use std::path::Path;

use crate::domain::error::BotsimError;
use crate::domain::simulation::SimulationResult;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn render(result: &SimulationResult) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(result)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &SimulationResult, output_path: &Path) -> Result<(), BotsimError> {
        let json = Self::render(result).map_err(|e| BotsimError::ReportWrite {
            path: output_path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(output_path, json).map_err(|e| BotsimError::ReportWrite {
            path: output_path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
