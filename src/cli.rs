//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::batch::{self, read_code_file};
use crate::domain::config_validation::{validate_backtest_config, validate_strategy_config};
use crate::domain::error::DualThrustError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::{
    DualThrustParams, DEFAULT_K, DEFAULT_LOT_SIZE, DEFAULT_WINDOW,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "dualthrust", about = "Dual Thrust breakout backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single-code backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the code from the config file
        #[arg(long)]
        code: Option<String>,
    },
    /// Screen a list of codes and write a summary CSV
    Batch {
        #[arg(short, long)]
        config: PathBuf,
        /// Code list file (tab-separated, codes in the first column)
        #[arg(long)]
        codes_file: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest { config, code } => run_backtest(&config, code.as_deref()),
        Command::Batch {
            config,
            codes_file,
            output,
        } => run_batch(&config, codes_file.as_ref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, code } => run_info(&config, code.as_deref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = DualThrustError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_backtest(config_path: &PathBuf, code_override: Option<&str>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let (start_date, end_date) = match build_date_range(&adapter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let bt_config = build_backtest_config(&adapter);
    let params = match build_params(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let code = match code_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", "code"))
    {
        Some(c) if !c.trim().is_empty() => c.trim().to_string(),
        _ => {
            eprintln!("error: no code configured");
            return ExitCode::from(2);
        }
    };

    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Running backtest: {} from {} to {}",
        code, start_date, end_date
    );

    let bars = match data_port.fetch_ohlcv(&code, start_date, end_date) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let result = match backtest_engine::run_backtest(&code, &bars, &params, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let metrics = Metrics::compute(&result, bt_config.risk_free_rate);

    println!("Final portfolio value: ${:.2}", result.final_value);
    println!("Sharpe ratio:          {:.2}", metrics.sharpe_ratio);
    println!(
        "Cumulative return:     {:.2}%",
        metrics.cumulative_return * 100.0
    );
    println!(
        "Max drawdown:          {:.2}% over {} bars",
        metrics.max_drawdown * 100.0,
        metrics.max_drawdown_duration
    );
    println!(
        "Trades:                {} total, {} profitable, {} unprofitable",
        metrics.trade_count, metrics.profitable_count, metrics.unprofitable_count
    );

    ExitCode::SUCCESS
}

fn run_batch(
    config_path: &PathBuf,
    codes_file: Option<&PathBuf>,
    output: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let (start_date, end_date) = match build_date_range(&adapter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let bt_config = build_backtest_config(&adapter);
    let params = match build_params(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let codes = match resolve_batch_codes(codes_file, &adapter) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if codes.is_empty() {
        eprintln!("error: no codes configured");
        return ExitCode::from(2);
    }

    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Screening {} codes from {} to {}",
        codes.len(),
        start_date,
        end_date
    );

    let outcome = batch::run_batch(&data_port, &codes, &params, &bt_config, start_date, end_date);

    eprintln!(
        "Backtested {} of {} codes ({} skipped)",
        outcome.rows.len(),
        codes.len(),
        outcome.skipped.len()
    );

    let output_path = output
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "summary.csv".to_string());

    if let Err(e) = CsvReportAdapter.write_summary(&outcome.rows, &output_path) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Summary written to: {}", output_path);
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    match build_params(&adapter) {
        Ok(params) => {
            eprintln!("\nStrategy parameters:");
            eprintln!("  window:   {}", params.window);
            eprintln!("  k:        {}", params.k);
            eprintln!("  lot_size: {}", params.lot_size);
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}

fn run_info(config_path: &PathBuf, code: Option<&str>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let data_port = match build_data_port(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let codes: Vec<String> = match code {
        Some(c) => vec![c.to_string()],
        None => match data_port.list_symbols() {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    for c in &codes {
        match data_port.get_data_range(c) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", c, count, min_date, max_date);
            }
            Ok(None) => {
                eprintln!("{}: no data found", c);
            }
            Err(e) => {
                eprintln!("error querying {}: {}", c, e);
            }
        }
    }
    ExitCode::SUCCESS
}

pub fn build_date_range(
    adapter: &dyn ConfigPort,
) -> Result<(NaiveDate, NaiveDate), DualThrustError> {
    let start_str = adapter
        .get_string("backtest", "start_date")
        .ok_or_else(|| DualThrustError::ConfigMissing {
            section: "backtest".into(),
            key: "start_date".into(),
        })?;
    let end_str = adapter.get_string("backtest", "end_date").ok_or_else(|| {
        DualThrustError::ConfigMissing {
            section: "backtest".into(),
            key: "end_date".into(),
        }
    })?;

    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        DualThrustError::ConfigInvalid {
            section: "backtest".into(),
            key: "start_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;
    let end_date = NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").map_err(|_| {
        DualThrustError::ConfigInvalid {
            section: "backtest".into(),
            key: "end_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;

    Ok((start_date, end_date))
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", 1_000_000.0),
        commission_pct: adapter.get_double("backtest", "commission_pct", 0.05),
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", 0.05),
    }
}

pub fn build_params(adapter: &dyn ConfigPort) -> Result<DualThrustParams, DualThrustError> {
    let window = adapter.get_int("strategy", "window", DEFAULT_WINDOW as i64);
    let k = adapter.get_double("strategy", "k", DEFAULT_K);
    let lot_size = adapter.get_int("strategy", "lot_size", DEFAULT_LOT_SIZE as i64);
    DualThrustParams::new(window.max(0) as usize, k, lot_size.max(0) as u32)
}

fn build_data_port(adapter: &dyn ConfigPort) -> Result<CsvAdapter, DualThrustError> {
    let path = adapter
        .get_string("data", "path")
        .ok_or_else(|| DualThrustError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(path)))
}

fn resolve_batch_codes(
    codes_file: Option<&PathBuf>,
    adapter: &dyn ConfigPort,
) -> Result<Vec<String>, ExitCode> {
    if let Some(path) = codes_file {
        return read_code_file(path).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        });
    }

    if let Some(path) = adapter
        .get_string("backtest", "codes_file")
        .filter(|s| !s.trim().is_empty())
    {
        return read_code_file(std::path::Path::new(path.trim())).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        });
    }

    if let Some(codes_str) = adapter
        .get_string("backtest", "codes")
        .filter(|s| !s.trim().is_empty())
    {
        return batch::parse_codes(&codes_str).map_err(|e| {
            eprintln!("error: failed to parse codes: {e}");
            ExitCode::from(2)
        });
    }

    if let Some(code) = adapter.get_string("backtest", "code") {
        let code = code.trim().to_string();
        if !code.is_empty() {
            return Ok(vec![code]);
        }
    }

    Ok(vec![])
}
