//! End-to-end tests: data port -> backtest engine -> metrics -> batch rows.

mod common;

use common::*;
use dualthrust::domain::backtest::run_backtest;
use dualthrust::domain::batch::run_batch;
use dualthrust::domain::error::DualThrustError;
use dualthrust::domain::metrics::Metrics;
use dualthrust::domain::strategy::DualThrustParams;
use dualthrust::ports::data_port::DataPort;

mod single_code_backtest {
    use super::*;

    #[test]
    fn flat_market_produces_no_trades() {
        let bars = generate_flat_bars("000599", "2024-01-01", 20, 50.0);
        let port = MockDataPort::new().with_bars("000599", bars);

        let ohlcv = port
            .fetch_ohlcv("000599", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert_eq!(ohlcv.len(), 20);

        let params = DualThrustParams::new(15, 0.08, 100).unwrap();
        let result = run_backtest("000599", &ohlcv, &params, &sample_config()).unwrap();

        assert!(result.closed_trades.is_empty());
        assert!((result.final_value - 1_000_000.0).abs() < f64::EPSILON);

        let metrics = Metrics::compute(&result, 0.05);
        assert_eq!(metrics.trade_count, 0);
        assert_eq!(metrics.max_drawdown, 0.0);
        assert!((metrics.cumulative_return).abs() < f64::EPSILON);
    }

    #[test]
    fn breakout_round_trip_with_known_pnl() {
        // Bar 2 closes above its buy line; the entry fills at bar 3's open
        // (101.0). Bar 4 closes below its sell line; the exit fills at bar
        // 5's open (103.0). Commission-free, so pnl = quantity * 2.
        let bars = vec![
            make_bar("000599", "2024-01-01", 100.0, 110.0, 100.0, 105.0),
            make_bar("000599", "2024-01-02", 105.0, 110.0, 100.0, 105.0),
            make_bar("000599", "2024-01-03", 100.0, 110.0, 100.0, 101.0),
            make_bar("000599", "2024-01-04", 101.0, 110.0, 100.0, 104.0),
            make_bar("000599", "2024-01-05", 105.0, 110.0, 100.0, 104.0),
            make_bar("000599", "2024-01-08", 103.0, 110.0, 100.0, 103.0),
        ];
        let params = DualThrustParams::new(2, 0.08, 100).unwrap();

        let result = run_backtest("000599", &bars, &params, &sample_config()).unwrap();

        assert_eq!(result.closed_trades.len(), 1);
        let trade = &result.closed_trades[0];
        assert_eq!(trade.quantity, 9900);
        assert_eq!(trade.entry_date, date(2024, 1, 4));
        assert_eq!(trade.exit_date, date(2024, 1, 8));
        assert!((trade.pnl - 19_800.0).abs() < 1e-6);
        assert!((result.final_value - 1_019_800.0).abs() < 1e-6);

        let metrics = Metrics::compute(&result, 0.05);
        assert_eq!(metrics.trade_count, 1);
        assert_eq!(metrics.profitable_count, 1);
        assert_eq!(metrics.unprofitable_count, 0);
        assert!(metrics.cumulative_return > 0.0);
    }

    #[test]
    fn empty_feed_surfaces_no_data_error() {
        let port = MockDataPort::new();
        let ohlcv = port
            .fetch_ohlcv("999999", date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert!(ohlcv.is_empty());

        let params = DualThrustParams::default();
        let result = run_backtest("999999", &ohlcv, &params, &sample_config());
        assert!(matches!(
            result,
            Err(DualThrustError::NoData { code }) if code == "999999"
        ));
    }

    #[test]
    fn date_range_filters_the_feed() {
        let bars = generate_flat_bars("000599", "2024-01-01", 30, 50.0);
        let port = MockDataPort::new().with_bars("000599", bars);

        let ohlcv = port
            .fetch_ohlcv("000599", date(2024, 1, 10), date(2024, 1, 19))
            .unwrap();
        assert_eq!(ohlcv.len(), 10);
        assert_eq!(ohlcv[0].date, date(2024, 1, 10));
        assert_eq!(ohlcv[9].date, date(2024, 1, 19));
    }
}

mod batch_screening {
    use super::*;

    #[test]
    fn failing_codes_are_skipped_without_aborting() {
        let port = MockDataPort::new()
            .with_bars("AAA", generate_flat_bars("AAA", "2024-01-01", 20, 10.0))
            .with_bars("CCC", generate_flat_bars("CCC", "2024-01-01", 20, 10.0))
            .with_error("BBB", "feed unavailable");

        let params = DualThrustParams::new(15, 0.08, 100).unwrap();
        let outcome = run_batch(
            &port,
            &["AAA".into(), "BBB".into(), "CCC".into()],
            &params,
            &sample_config(),
            date(2024, 1, 1),
            date(2024, 12, 31),
        );

        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0].code, "AAA");
        assert_eq!(outcome.rows[1].code, "CCC");
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].code, "BBB");
        assert!(outcome.skipped[0].reason.contains("feed unavailable"));
    }

    #[test]
    fn code_with_no_bars_in_range_is_skipped() {
        let port = MockDataPort::new()
            .with_bars("AAA", generate_flat_bars("AAA", "2024-01-01", 20, 10.0))
            .with_bars("BBB", generate_flat_bars("BBB", "2023-01-01", 20, 10.0));

        let params = DualThrustParams::new(15, 0.08, 100).unwrap();
        let outcome = run_batch(
            &port,
            &["AAA".into(), "BBB".into()],
            &params,
            &sample_config(),
            date(2024, 1, 1),
            date(2024, 12, 31),
        );

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].code, "BBB");
    }

    #[test]
    fn batch_rows_mirror_single_run_metrics() {
        let bars = vec![
            make_bar("000599", "2024-01-01", 100.0, 110.0, 100.0, 105.0),
            make_bar("000599", "2024-01-02", 105.0, 110.0, 100.0, 105.0),
            make_bar("000599", "2024-01-03", 100.0, 110.0, 100.0, 101.0),
            make_bar("000599", "2024-01-04", 101.0, 110.0, 100.0, 104.0),
            make_bar("000599", "2024-01-05", 105.0, 110.0, 100.0, 104.0),
            make_bar("000599", "2024-01-08", 103.0, 110.0, 100.0, 103.0),
        ];
        let port = MockDataPort::new().with_bars("000599", bars.clone());
        let params = DualThrustParams::new(2, 0.08, 100).unwrap();

        let outcome = run_batch(
            &port,
            &["000599".into()],
            &params,
            &sample_config(),
            date(2024, 1, 1),
            date(2024, 12, 31),
        );
        assert_eq!(outcome.rows.len(), 1);
        let row = &outcome.rows[0];

        let result = run_backtest("000599", &bars, &params, &sample_config()).unwrap();
        let metrics = Metrics::compute(&result, 0.05);

        assert!((row.final_value - result.final_value).abs() < 1e-9);
        assert!((row.cum_return_pct - metrics.cumulative_return * 100.0).abs() < 1e-9);
        assert!((row.max_drawdown_pct - metrics.max_drawdown * 100.0).abs() < 1e-9);
        assert_eq!(row.drawdown_duration, metrics.max_drawdown_duration);
        assert_eq!(row.trade_count, 1);
        assert_eq!(row.profitable_count, 1);
        assert_eq!(row.start_date, date(2024, 1, 1));
        assert_eq!(row.end_date, date(2024, 1, 8));
    }
}
