//! Backtest engine: drives the strategy bar by bar against the simulated
//! broker and accumulates the equity curve and closed trades.

use chrono::NaiveDate;

use crate::domain::broker::{OrderEvent, Side, SimulatedBroker};
use crate::domain::error::DualThrustError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::ClosedTrade;
use crate::domain::strategy::{DualThrustParams, DualThrustStrategy};

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Commission as a percentage of notional (0.05 = 0.05%).
    pub commission_pct: f64,
    /// Annual risk-free rate used by the Sharpe ratio.
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 1_000_000.0,
            commission_pct: 0.05,
            risk_free_rate: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub code: String,
    pub initial_capital: f64,
    pub final_value: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub equity_curve: Vec<EquityPoint>,
    pub closed_trades: Vec<ClosedTrade>,
}

/// Run the Dual Thrust strategy over `bars`, which must be in strictly
/// increasing date order. Each bar is processed synchronously: pending
/// orders execute first, the resulting events drive the state machine, then
/// the strategy evaluates the bar and end-of-bar equity is recorded.
pub fn run_backtest(
    code: &str,
    bars: &[OhlcvBar],
    params: &DualThrustParams,
    config: &BacktestConfig,
) -> Result<BacktestResult, DualThrustError> {
    if bars.is_empty() {
        return Err(DualThrustError::NoData { code: code.into() });
    }

    let mut broker = SimulatedBroker::new(config.initial_capital, config.commission_pct);
    let mut strategy = DualThrustStrategy::new(code, params.clone())?;
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut closed_trades = Vec::new();

    for bar in bars {
        for event in broker.process_bar(bar) {
            if let OrderEvent::Filled {
                side,
                quantity,
                price,
                ..
            } = &event
            {
                let action = match side {
                    Side::Buy => "BUY",
                    Side::Sell => "SELL",
                };
                eprintln!("{} {} {} {} at ${:.2}", bar.date, action, code, quantity, price);
            }
            if let Some(trade) = strategy.on_order_event(&event, &mut broker) {
                closed_trades.push(trade);
            }
        }

        strategy.on_bar(bar, &mut broker);

        let equity = broker.cash() + strategy.held_quantity() as f64 * bar.close;
        equity_curve.push(EquityPoint {
            date: bar.date,
            equity,
        });
    }

    let final_value = equity_curve
        .last()
        .map(|p| p.equity)
        .unwrap_or(config.initial_capital);

    Ok(BacktestResult {
        code: code.to_string(),
        initial_capital: config.initial_capital,
        final_value,
        start_date: bars[0].date,
        end_date: bars[bars.len() - 1].date,
        equity_curve,
        closed_trades,
    })
}
