//! Simulated broker: market orders, percentage commission, deferred fills.
//!
//! Orders submitted while processing bar t are filled (or cancelled) at bar
//! t+1's open, matching how a market order placed after the close would
//! execute. A buy is cancelled when cash cannot cover notional plus
//! commission at fill time; any order landing on a zero-volume bar is
//! cancelled (no liquidity).

use chrono::NaiveDate;

use crate::domain::ohlcv::OhlcvBar;

pub type OrderId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone)]
struct Order {
    id: OrderId,
    side: Side,
    quantity: u32,
}

#[derive(Debug, Clone)]
pub enum OrderEvent {
    Filled {
        id: OrderId,
        side: Side,
        quantity: u32,
        price: f64,
        commission: f64,
        date: NaiveDate,
    },
    Cancelled {
        id: OrderId,
        side: Side,
        quantity: u32,
    },
}

pub struct SimulatedBroker {
    cash: f64,
    commission_pct: f64,
    pending: Vec<Order>,
    next_id: OrderId,
}

impl SimulatedBroker {
    pub fn new(initial_cash: f64, commission_pct: f64) -> Self {
        Self {
            cash: initial_cash,
            commission_pct,
            pending: Vec::new(),
            next_id: 1,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn pending_orders(&self) -> usize {
        self.pending.len()
    }

    /// commission = notional * pct / 100
    pub fn commission(&self, notional: f64) -> f64 {
        notional * self.commission_pct / 100.0
    }

    /// Queue a market order; it executes on the next processed bar.
    pub fn submit_market(&mut self, side: Side, quantity: u32) -> OrderId {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Order { id, side, quantity });
        id
    }

    /// Execute all pending orders against the incoming bar, in submission
    /// order, at the bar's open. Orders submitted during event handling go
    /// to the next bar.
    pub fn process_bar(&mut self, bar: &OhlcvBar) -> Vec<OrderEvent> {
        let orders = std::mem::take(&mut self.pending);
        let mut events = Vec::with_capacity(orders.len());

        for order in orders {
            if bar.volume <= 0 {
                events.push(OrderEvent::Cancelled {
                    id: order.id,
                    side: order.side,
                    quantity: order.quantity,
                });
                continue;
            }

            let notional = order.quantity as f64 * bar.open;
            let commission = self.commission(notional);

            match order.side {
                Side::Buy => {
                    if notional + commission > self.cash {
                        events.push(OrderEvent::Cancelled {
                            id: order.id,
                            side: order.side,
                            quantity: order.quantity,
                        });
                        continue;
                    }
                    self.cash -= notional + commission;
                }
                Side::Sell => {
                    self.cash += notional - commission;
                }
            }

            events.push(OrderEvent::Filled {
                id: order.id,
                side: order.side,
                quantity: order.quantity,
                price: bar.open,
                commission,
                date: bar.date,
            });
        }

        events
    }
}
