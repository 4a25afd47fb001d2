//! Batch screening: run the Dual Thrust backtest over a list of codes and
//! collect one summary row per code. A code that fails (no data, bad feed)
//! is skipped with a warning and never aborts the batch.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::domain::backtest::{run_backtest, BacktestConfig};
use crate::domain::error::DualThrustError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::DualThrustParams;
use crate::ports::data_port::DataPort;

/// One summary line of a batch run, mirroring the backtest report columns.
#[derive(Debug, Clone)]
pub struct BatchRow {
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub final_value: f64,
    pub sharpe_ratio: f64,
    /// Cumulative return in percent.
    pub cum_return_pct: f64,
    /// Max drawdown in percent.
    pub max_drawdown_pct: f64,
    pub drawdown_duration: i64,
    pub trade_count: usize,
    pub profitable_count: usize,
    pub unprofitable_count: usize,
}

#[derive(Debug, Clone)]
pub struct SkippedCode {
    pub code: String,
    pub reason: String,
}

pub struct BatchOutcome {
    pub rows: Vec<BatchRow>,
    pub skipped: Vec<SkippedCode>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CodeListError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

/// Parse a comma-separated code list (e.g. "000599,600036").
pub fn parse_codes(input: &str) -> Result<Vec<String>, CodeListError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CodeListError::EmptyToken);
        }
        if seen.contains(trimmed) {
            return Err(CodeListError::DuplicateCode(trimmed.to_string()));
        }
        seen.insert(trimmed.to_string());
        codes.push(trimmed.to_string());
    }

    Ok(codes)
}

/// Read codes from a screening file: tab-separated, code in the first
/// column, first line a header. Blank lines are ignored.
pub fn read_code_file(path: &Path) -> Result<Vec<String>, DualThrustError> {
    let content = fs::read_to_string(path)?;
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for line in content.lines().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let code = trimmed.split('\t').next().unwrap_or("").trim();
        if code.is_empty() {
            return Err(DualThrustError::Data {
                reason: format!("malformed line in {}: {:?}", path.display(), line),
            });
        }
        if seen.insert(code.to_string()) {
            codes.push(code.to_string());
        }
    }

    Ok(codes)
}

/// Backtest every code, one at a time. Failures are isolated: a warning
/// goes to stderr and the code lands in `skipped`.
pub fn run_batch(
    data_port: &dyn DataPort,
    codes: &[String],
    params: &DualThrustParams,
    config: &BacktestConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> BatchOutcome {
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for code in codes {
        match backtest_one(data_port, code, params, config, start_date, end_date) {
            Ok(row) => rows.push(row),
            Err(e) => {
                eprintln!("Warning: skipping {} ({})", code, e);
                skipped.push(SkippedCode {
                    code: code.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    BatchOutcome { rows, skipped }
}

fn backtest_one(
    data_port: &dyn DataPort,
    code: &str,
    params: &DualThrustParams,
    config: &BacktestConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<BatchRow, DualThrustError> {
    let bars = data_port.fetch_ohlcv(code, start_date, end_date)?;
    if bars.is_empty() {
        return Err(DualThrustError::NoData { code: code.into() });
    }

    let result = run_backtest(code, &bars, params, config)?;
    let metrics = Metrics::compute(&result, config.risk_free_rate);

    Ok(BatchRow {
        code: code.to_string(),
        start_date: result.start_date,
        end_date: result.end_date,
        final_value: result.final_value,
        sharpe_ratio: metrics.sharpe_ratio,
        cum_return_pct: metrics.cumulative_return * 100.0,
        max_drawdown_pct: metrics.max_drawdown * 100.0,
        drawdown_duration: metrics.max_drawdown_duration,
        trade_count: metrics.trade_count,
        profitable_count: metrics.profitable_count,
        unprofitable_count: metrics.unprofitable_count,
    })
}
