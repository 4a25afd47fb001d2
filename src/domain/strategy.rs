//! Dual Thrust strategy: parameters and per-bar decision logic.
//!
//! Buy when the close breaks above `open + k * range`, sell the full
//! position when it breaks below `open - k * range`, where `range` is the
//! dual-thrust range over the last `window` bars. Both comparisons are
//! strict; an exact touch does not trade. The strategy is inert until the
//! window has filled.

use crate::domain::broker::{OrderEvent, Side, SimulatedBroker};
use crate::domain::error::DualThrustError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::{ClosedTrade, OpenPosition, PositionState};
use crate::domain::signal::DualThrustSignal;

pub const DEFAULT_WINDOW: usize = 15;
pub const DEFAULT_K: f64 = 0.08;
pub const DEFAULT_LOT_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct DualThrustParams {
    pub window: usize,
    pub k: f64,
    pub lot_size: u32,
}

impl DualThrustParams {
    pub fn new(window: usize, k: f64, lot_size: u32) -> Result<Self, DualThrustError> {
        if window == 0 {
            return Err(DualThrustError::InvalidParameter {
                name: "window".into(),
                reason: "window size must be greater than 0".into(),
            });
        }
        if !(k > 0.0) {
            return Err(DualThrustError::InvalidParameter {
                name: "k".into(),
                reason: "k must be positive".into(),
            });
        }
        if lot_size == 0 {
            return Err(DualThrustError::InvalidParameter {
                name: "lot_size".into(),
                reason: "lot size must be greater than 0".into(),
            });
        }
        Ok(Self {
            window,
            k,
            lot_size,
        })
    }
}

impl Default for DualThrustParams {
    fn default() -> Self {
        DualThrustParams {
            window: DEFAULT_WINDOW,
            k: DEFAULT_K,
            lot_size: DEFAULT_LOT_SIZE,
        }
    }
}

pub struct DualThrustStrategy {
    code: String,
    params: DualThrustParams,
    signal: DualThrustSignal,
    state: PositionState,
}

impl DualThrustStrategy {
    pub fn new(code: impl Into<String>, params: DualThrustParams) -> Result<Self, DualThrustError> {
        let signal = DualThrustSignal::new(params.window)?;
        Ok(Self {
            code: code.into(),
            params,
            signal,
            state: PositionState::Flat,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn held_quantity(&self) -> u32 {
        self.state.held_quantity()
    }

    /// Apply a fill/cancel event from the broker. Returns the completed
    /// round trip when an exit fill closes the position.
    ///
    /// Entry cancellation drops the opportunity; exit cancellation
    /// immediately resubmits the market sell for the same quantity.
    pub fn on_order_event(
        &mut self,
        event: &OrderEvent,
        broker: &mut SimulatedBroker,
    ) -> Option<ClosedTrade> {
        let state = std::mem::replace(&mut self.state, PositionState::Flat);
        match (state, event) {
            (
                PositionState::Entering { order_id, .. },
                OrderEvent::Filled {
                    id,
                    quantity,
                    price,
                    commission,
                    date,
                    ..
                },
            ) if order_id == *id => {
                self.state = PositionState::Holding(OpenPosition {
                    quantity: *quantity,
                    entry_price: *price,
                    entry_date: *date,
                    entry_commission: *commission,
                });
                None
            }
            (PositionState::Entering { order_id, .. }, OrderEvent::Cancelled { id, .. })
                if order_id == *id =>
            {
                // opportunity dropped; stay flat
                None
            }
            (
                PositionState::ExitPending { position, order_id },
                OrderEvent::Filled {
                    id,
                    price,
                    commission,
                    date,
                    ..
                },
            ) if order_id == *id => {
                let pnl = position.quantity as f64 * (price - position.entry_price)
                    - position.entry_commission
                    - commission;
                Some(ClosedTrade {
                    code: self.code.clone(),
                    quantity: position.quantity,
                    entry_price: position.entry_price,
                    exit_price: *price,
                    entry_date: position.entry_date,
                    exit_date: *date,
                    pnl,
                })
            }
            (
                PositionState::ExitPending { position, order_id },
                OrderEvent::Cancelled { id, .. },
            ) if order_id == *id => {
                let new_id = broker.submit_market(Side::Sell, position.quantity);
                self.state = PositionState::ExitPending {
                    position,
                    order_id: new_id,
                };
                None
            }
            (state, _) => {
                self.state = state;
                None
            }
        }
    }

    /// Evaluate one bar: update the range signal, then decide entry or exit.
    pub fn on_bar(&mut self, bar: &OhlcvBar, broker: &mut SimulatedBroker) {
        self.signal.on_new_bar(bar);
        let Some(range) = self.signal.latest() else {
            return;
        };

        match std::mem::replace(&mut self.state, PositionState::Flat) {
            PositionState::Flat => {
                let buy_line = bar.open + self.params.k * range;
                let lot_notional = bar.close * self.params.lot_size as f64;
                let lots = if lot_notional > 0.0 {
                    (broker.cash() / lot_notional).floor() as u32
                } else {
                    0
                };
                if lots > 0 && bar.close > buy_line {
                    let quantity = lots * self.params.lot_size;
                    let order_id = broker.submit_market(Side::Buy, quantity);
                    self.state = PositionState::Entering { order_id, quantity };
                }
            }
            PositionState::Holding(position) => {
                let sell_line = bar.open - self.params.k * range;
                if bar.close < sell_line {
                    let order_id = broker.submit_market(Side::Sell, position.quantity);
                    self.state = PositionState::ExitPending { position, order_id };
                } else {
                    self.state = PositionState::Holding(position);
                }
            }
            // waiting on the broker; nothing to decide
            waiting => self.state = waiting,
        }
    }
}
