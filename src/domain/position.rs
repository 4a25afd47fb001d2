//! Position lifecycle for the long-only breakout strategy.
//!
//! The lifecycle is an explicit state machine rather than a nullable
//! position: `Flat` -> `Entering` (buy submitted) -> `Holding` ->
//! `ExitPending` (sell submitted) -> `Flat`. Cancellation policy is
//! asymmetric: a cancelled entry drops back to `Flat`, a cancelled exit is
//! resubmitted and stays `ExitPending`.

use chrono::NaiveDate;

use crate::domain::broker::OrderId;

/// An open long holding.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub quantity: u32,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_commission: f64,
}

impl OpenPosition {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionState {
    Flat,
    Entering { order_id: OrderId, quantity: u32 },
    Holding(OpenPosition),
    ExitPending { position: OpenPosition, order_id: OrderId },
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    /// Shares actually owned: zero while flat or awaiting entry.
    pub fn held_quantity(&self) -> u32 {
        match self {
            PositionState::Flat | PositionState::Entering { .. } => 0,
            PositionState::Holding(pos) => pos.quantity,
            PositionState::ExitPending { position, .. } => position.quantity,
        }
    }
}

/// A completed round trip; `pnl` is net of both commissions.
#[derive(Debug, Clone)]
pub struct ClosedTrade {
    pub code: String,
    pub quantity: u32,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub pnl: f64,
}
