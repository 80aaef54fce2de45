//! CSV trade log adapter implementing ReportPort.

use std::path::Path;

use crate::domain::error::BotsimError;
use crate::domain::position::Trade;
use crate::domain::simulation::SimulationResult;
use crate::ports::report_port::ReportPort;

pub struct CsvTradeLogAdapter;

impl CsvTradeLogAdapter {
    /// Trade log as CSV text: one row per closed trade, in exit order.
    pub fn render(trades: &[Trade]) -> Result<String, csv::Error> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record([
            "entry_bar",
            "exit_bar",
            "side",
            "entry_price",
            "exit_price",
            "pnl",
            "bars_held",
        ])?;
        for t in trades {
            wtr.write_record([
                &t.entry_bar.to_string(),
                &t.exit_bar.to_string(),
                &t.side.to_string(),
                &format!("{:.4}", t.entry_price),
                &format!("{:.4}", t.exit_price),
                &format!("{:.2}", t.pnl),
                &t.bars_held().to_string(),
            ])?;
        }
        let data = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

impl ReportPort for CsvTradeLogAdapter {
    fn write(&self, result: &SimulationResult, output_path: &Path) -> Result<(), BotsimError> {
        let report_err = |reason: String| BotsimError::ReportWrite {
            path: output_path.display().to_string(),
            reason,
        };
        let text = Self::render(&result.trade_log).map_err(|e| report_err(e.to_string()))?;
        std::fs::write(output_path, text).map_err(|e| report_err(e.to_string()))
    }
}
