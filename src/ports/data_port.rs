//! Data access port trait.

use crate::domain::error::DualThrustError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetch bars for one instrument, sorted by date, limited to the
    /// inclusive date range.
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, DualThrustError>;

    fn list_symbols(&self) -> Result<Vec<String>, DualThrustError>;

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DualThrustError>;
}
