//! Dual Thrust range signal.
//!
//! The range over a window of bars is max(HH - LC, HC - LL) where HH/LL are
//! the highest high and lowest low and HC/LC the highest and lowest close.
//! Multiplied by the sensitivity constant k it gives the breakout offset
//! from the bar open.

use std::collections::VecDeque;

use crate::domain::error::DualThrustError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::window::RollingWindow;

/// Reducer for [`RollingWindow`]: the dual-thrust range of the window.
pub fn thrust_range(bars: &VecDeque<OhlcvBar>) -> f64 {
    let hh = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let ll = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let hc = bars.iter().map(|b| b.close).fold(f64::MIN, f64::max);
    let lc = bars.iter().map(|b| b.close).fold(f64::MAX, f64::min);
    (hh - lc).max(hc - ll)
}

/// Per-bar indicator feed over a rolling window of bars.
///
/// Produces one absent-or-present value per processed bar; consumers read
/// only the most recent value. Absent until `period` bars have been seen.
pub struct DualThrustSignal {
    window: RollingWindow<OhlcvBar, f64>,
}

impl DualThrustSignal {
    pub fn new(period: usize) -> Result<Self, DualThrustError> {
        Ok(Self {
            window: RollingWindow::new(period, thrust_range)?,
        })
    }

    pub fn on_new_bar(&mut self, bar: &OhlcvBar) {
        self.window.push(bar.clone());
    }

    /// Range value as of the last processed bar.
    pub fn latest(&self) -> Option<f64> {
        self.window.latest()
    }

    pub fn period(&self) -> usize {
        self.window.capacity()
    }
}
