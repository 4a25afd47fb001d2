//! CSV batch summary report adapter.
//!
//! Writes one row per screened code with the same columns the console
//! summary prints, suitable for sorting in a spreadsheet.

use crate::domain::batch::BatchRow;
use crate::domain::error::DualThrustError;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl ReportPort for CsvReportAdapter {
    fn write_summary(
        &self,
        rows: &[BatchRow],
        output_path: &str,
    ) -> Result<(), DualThrustError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| DualThrustError::Data {
            reason: format!("failed to open {}: {}", output_path, e),
        })?;

        wtr.write_record([
            "code",
            "startTime",
            "endTime",
            "result",
            "sharpeRatio",
            "cumReturn(%)",
            "maxDrawdown(%)",
            "longestDrawdownDuration",
            "tradeCount",
            "profitableCount",
            "unprofitableCount",
        ])
        .map_err(write_error)?;

        for row in rows {
            wtr.write_record([
                row.code.clone(),
                row.start_date.format("%Y-%m-%d").to_string(),
                row.end_date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", row.final_value),
                format!("{:.4}", row.sharpe_ratio),
                format!("{:.2}", row.cum_return_pct),
                format!("{:.2}", row.max_drawdown_pct),
                row.drawdown_duration.to_string(),
                row.trade_count.to_string(),
                row.profitable_count.to_string(),
                row.unprofitable_count.to_string(),
            ])
            .map_err(write_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

fn write_error(e: csv::Error) -> DualThrustError {
    DualThrustError::Data {
        reason: format!("CSV write error: {}", e),
    }
}
