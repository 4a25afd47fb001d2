//! Configuration validation.
//!
//! Validates all config fields before a backtest or batch run starts, so a
//! bad file fails fast instead of half-way through a code list.

use crate::domain::error::DualThrustError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    validate_initial_capital(config)?;
    validate_commission(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    validate_codes(config)?;
    validate_data_path(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    validate_window(config)?;
    validate_k(config)?;
    validate_lot_size(config)?;
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    let value = config.get_double("backtest", "initial_capital", 1_000_000.0);
    if value <= 0.0 {
        return Err(DualThrustError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    let pct = config.get_double("backtest", "commission_pct", 0.05);
    if pct < 0.0 {
        return Err(DualThrustError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission_pct".to_string(),
            reason: "commission_pct must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.05);
    if value < 0.0 || value >= 1.0 {
        return Err(DualThrustError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(DualThrustError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, DualThrustError> {
    match value {
        None => Err(DualThrustError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| DualThrustError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            })
        }
    }
}

fn validate_codes(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    let codes = config.get_string("backtest", "codes");
    let code = config.get_string("backtest", "code");
    let codes_file = config.get_string("backtest", "codes_file");

    match (codes, code, codes_file) {
        (Some(c), _, _) if !c.trim().is_empty() => Ok(()),
        (_, Some(c), _) if !c.trim().is_empty() => Ok(()),
        (_, _, Some(f)) if !f.trim().is_empty() => Ok(()),
        _ => Err(DualThrustError::ConfigMissing {
            section: "backtest".to_string(),
            key: "code".to_string(),
        }),
    }
}

fn validate_data_path(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(DualThrustError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_window(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    let value = config.get_int("strategy", "window", 15);
    if value < 1 {
        return Err(DualThrustError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "window".to_string(),
            reason: "window must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_k(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    let value = config.get_double("strategy", "k", 0.08);
    if value <= 0.0 {
        return Err(DualThrustError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "k".to_string(),
            reason: "k must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_lot_size(config: &dyn ConfigPort) -> Result<(), DualThrustError> {
    let value = config.get_int("strategy", "lot_size", 100);
    if value < 1 {
        return Err(DualThrustError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "lot_size".to_string(),
            reason: "lot_size must be at least 1".to_string(),
        });
    }
    Ok(())
}
