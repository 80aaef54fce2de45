//! CSV file price data adapter.
//!
//! Reads a headered CSV with a `close` column and optional `high` and `low`
//! columns (matched case-insensitively, in any position). Missing high/low
//! columns mirror the close. Rows are taken in file order, oldest first.

use crate::domain::error::BotsimError;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::DataPort;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, source: &str) -> PathBuf {
        self.base_path.join(source)
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn parse_cell(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    row: usize,
    source: &str,
) -> Result<f64, BotsimError> {
    let raw = record.get(index).ok_or_else(|| BotsimError::DataLoad {
        source_name: source.to_string(),
        reason: format!("row {}: missing {} column", row, name),
    })?;
    raw.trim().parse().map_err(|e| BotsimError::DataLoad {
        source_name: source.to_string(),
        reason: format!("row {}: invalid {} value '{}': {}", row, name, raw.trim(), e),
    })
}

impl DataPort for CsvAdapter {
    fn load_prices(&self, source: &str) -> Result<PriceSeries, BotsimError> {
        let path = self.csv_path(source);
        let content = fs::read_to_string(&path).map_err(|e| BotsimError::DataLoad {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| BotsimError::DataLoad {
                source_name: source.to_string(),
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let close_col = column(&headers, "close").ok_or_else(|| BotsimError::DataLoad {
            source_name: source.to_string(),
            reason: "missing close column".into(),
        })?;
        let high_col = column(&headers, "high");
        let low_col = column(&headers, "low");

        let mut close = Vec::new();
        let mut high = Vec::new();
        let mut low = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result.map_err(|e| BotsimError::DataLoad {
                source_name: source.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let c = parse_cell(&record, close_col, "close", row, source)?;
            let h = match high_col {
                Some(col) => parse_cell(&record, col, "high", row, source)?,
                None => c,
            };
            let l = match low_col {
                Some(col) => parse_cell(&record, col, "low", row, source)?,
                None => c,
            };

            close.push(c);
            high.push(h);
            low.push(l);
        }

        if close.is_empty() {
            return Err(BotsimError::DataLoad {
                source_name: source.to_string(),
                reason: "no price rows".into(),
            });
        }

        PriceSeries::new(close, high, low)
    }
}
