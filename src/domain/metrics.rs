//! Performance metrics derived from a finished backtest: cumulative
//! return, annualized Sharpe ratio, maximum drawdown and its duration, and
//! trade statistics.

use crate::domain::backtest::BacktestResult;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone)]
pub struct Metrics {
    /// Cumulative return as a fraction (0.10 = 10%).
    pub cumulative_return: f64,
    /// Annualized Sharpe ratio of daily excess returns.
    pub sharpe_ratio: f64,
    /// Maximum peak-to-trough drawdown as a fraction.
    pub max_drawdown: f64,
    /// Longest run of consecutive bars spent below a prior equity peak.
    pub max_drawdown_duration: i64,
    pub trade_count: usize,
    pub profitable_count: usize,
    pub unprofitable_count: usize,
    pub win_rate: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult, risk_free_rate: f64) -> Self {
        let cumulative_return = if result.initial_capital > 0.0 {
            (result.final_value - result.initial_capital) / result.initial_capital
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(result);
        let sharpe_ratio = compute_sharpe(result, risk_free_rate);

        let trade_count = result.closed_trades.len();
        let profitable_count = result
            .closed_trades
            .iter()
            .filter(|t| t.pnl > 0.0)
            .count();
        let unprofitable_count = result
            .closed_trades
            .iter()
            .filter(|t| t.pnl < 0.0)
            .count();
        let win_rate = if trade_count > 0 {
            profitable_count as f64 / trade_count as f64
        } else {
            0.0
        };

        Metrics {
            cumulative_return,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            trade_count,
            profitable_count,
            unprofitable_count,
            win_rate,
        }
    }
}

/// Deepest drawdown fraction and the longest stretch of bars spent below a
/// previous equity peak. A new peak resets the duration counter.
fn compute_drawdown(result: &BacktestResult) -> (f64, i64) {
    let mut peak = f64::MIN;
    let mut max_drawdown = 0.0_f64;
    let mut current_run = 0_i64;
    let mut longest_run = 0_i64;

    for point in &result.equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_run = 0;
        } else {
            current_run += 1;
            longest_run = longest_run.max(current_run);
            if peak > 0.0 {
                let drawdown = (peak - point.equity) / peak;
                max_drawdown = max_drawdown.max(drawdown);
            }
        }
    }

    (max_drawdown, longest_run)
}

/// Sharpe ratio of daily returns in excess of the (annual) risk-free rate,
/// annualized by sqrt(252). Zero when there are fewer than two equity
/// points or returns never vary.
fn compute_sharpe(result: &BacktestResult, risk_free_rate: f64) -> f64 {
    let curve = &result.equity_curve;
    if curve.len() < 2 {
        return 0.0;
    }

    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = curve
        .windows(2)
        .filter(|w| w[0].equity > 0.0)
        .map(|w| (w[1].equity - w[0].equity) / w[0].equity - daily_rf)
        .collect();
    if excess.len() < 2 {
        return 0.0;
    }

    let mean = excess.iter().sum::<f64>() / excess.len() as f64;
    let variance = excess
        .iter()
        .map(|r| {
            let d = r - mean;
            d * d
        })
        .sum::<f64>()
        / (excess.len() - 1) as f64;
    let std_dev = variance.sqrt();
    if std_dev == 0.0 {
        return 0.0;
    }

    mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::EquityPoint;
    use crate::domain::position::ClosedTrade;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn curve(equities: &[f64]) -> Vec<EquityPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        equities
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                date: start + Duration::days(i as i64),
                equity,
            })
            .collect()
    }

    fn result_with(equities: &[f64], trades: Vec<ClosedTrade>) -> BacktestResult {
        let equity_curve = curve(equities);
        BacktestResult {
            code: "000599".into(),
            initial_capital: equities[0],
            final_value: *equities.last().unwrap(),
            start_date: equity_curve[0].date,
            end_date: equity_curve.last().unwrap().date,
            equity_curve,
            closed_trades: trades,
        }
    }

    fn trade(pnl: f64) -> ClosedTrade {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        ClosedTrade {
            code: "000599".into(),
            quantity: 100,
            entry_price: 50.0,
            exit_price: 50.0 + pnl / 100.0,
            entry_date: date,
            exit_date: date,
            pnl,
        }
    }

    #[test]
    fn cumulative_return_from_endpoints() {
        let result = result_with(&[1000.0, 1050.0, 1100.0], vec![]);
        let metrics = Metrics::compute(&result, 0.0);
        assert_relative_eq!(metrics.cumulative_return, 0.10, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_depth_and_duration() {
        // peak 1200, trough 900: drawdown 25%, three bars below the peak
        let result = result_with(&[1000.0, 1200.0, 1000.0, 900.0, 1100.0, 1300.0], vec![]);
        let metrics = Metrics::compute(&result, 0.0);
        assert_relative_eq!(metrics.max_drawdown, 0.25, epsilon = 1e-12);
        assert_eq!(metrics.max_drawdown_duration, 3);
    }

    #[test]
    fn duration_resets_at_new_peak() {
        // two below-peak runs of lengths 1 and 2
        let result = result_with(&[1000.0, 900.0, 1100.0, 1050.0, 1000.0, 1200.0], vec![]);
        let metrics = Metrics::compute(&result, 0.0);
        assert_eq!(metrics.max_drawdown_duration, 2);
    }

    #[test]
    fn monotone_rise_has_zero_drawdown() {
        let result = result_with(&[1000.0, 1010.0, 1020.0, 1030.0], vec![]);
        let metrics = Metrics::compute(&result, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
        assert_eq!(metrics.max_drawdown_duration, 0);
    }

    #[test]
    fn flat_equity_has_zero_sharpe() {
        let result = result_with(&[1000.0, 1000.0, 1000.0], vec![]);
        let metrics = Metrics::compute(&result, 0.05);
        assert_eq!(metrics.sharpe_ratio, 0.0);
    }

    #[test]
    fn sharpe_positive_for_steady_gains_above_rf() {
        let equities: Vec<f64> = (0..30).map(|i| 1000.0 * 1.01f64.powi(i)).collect();
        // jitter one point so the std dev is nonzero
        let mut equities = equities;
        equities[15] *= 1.001;
        let result = result_with(&equities, vec![]);
        let metrics = Metrics::compute(&result, 0.05);
        assert!(metrics.sharpe_ratio > 0.0);
    }

    #[test]
    fn single_point_curve_yields_zero_sharpe() {
        let result = result_with(&[1000.0], vec![]);
        let metrics = Metrics::compute(&result, 0.05);
        assert_eq!(metrics.sharpe_ratio, 0.0);
    }

    #[test]
    fn trade_counts_and_win_rate() {
        let result = result_with(
            &[1000.0, 1100.0],
            vec![trade(50.0), trade(-20.0), trade(30.0), trade(0.0)],
        );
        let metrics = Metrics::compute(&result, 0.0);
        assert_eq!(metrics.trade_count, 4);
        assert_eq!(metrics.profitable_count, 2);
        assert_eq!(metrics.unprofitable_count, 1);
        assert_relative_eq!(metrics.win_rate, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn no_trades_gives_zero_win_rate() {
        let result = result_with(&[1000.0, 1000.0], vec![]);
        let metrics = Metrics::compute(&result, 0.0);
        assert_eq!(metrics.trade_count, 0);
        assert_eq!(metrics.win_rate, 0.0);
    }
}
