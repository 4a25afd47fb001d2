//! Report generation port trait.

use crate::domain::batch::BatchRow;
use crate::domain::error::DualThrustError;

/// Port for writing batch summary reports.
pub trait ReportPort {
    fn write_summary(&self, rows: &[BatchRow], output_path: &str)
        -> Result<(), DualThrustError>;
}
