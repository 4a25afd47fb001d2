//! CSV file data adapter.
//!
//! Reads daily OHLCV bars from `{code}.csv` files under a base directory.
//! The expected layout is `Date,Open,High,Low,Close,Volume` with an
//! optional trailing `Adj Close` column, the format historical feeds dump.

use crate::domain::error::DualThrustError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, DualThrustError> {
    record.get(index).ok_or_else(|| DualThrustError::Data {
        reason: format!("missing {} column", name),
    })
}

fn parse_f64(value: &str, name: &str) -> Result<f64, DualThrustError> {
    value.trim().parse().map_err(|e| DualThrustError::Data {
        reason: format!("invalid {} value: {}", name, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, DualThrustError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| DualThrustError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| DualThrustError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                DualThrustError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let open = parse_f64(field(&record, 1, "open")?, "open")?;
            let high = parse_f64(field(&record, 2, "high")?, "high")?;
            let low = parse_f64(field(&record, 3, "low")?, "low")?;
            let close = parse_f64(field(&record, 4, "close")?, "close")?;
            let volume: i64 = field(&record, 5, "volume")?
                .trim()
                .parse()
                .map_err(|e| DualThrustError::Data {
                    reason: format!("invalid volume value: {}", e),
                })?;

            bars.push(OhlcvBar {
                code: code.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, DualThrustError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| DualThrustError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DualThrustError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(".csv") {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DualThrustError> {
        let bars = self.fetch_ohlcv(code, NaiveDate::MIN, NaiveDate::MAX)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
