//! Order summary arithmetic for the final step.
//!
//! Pure money math in integer cents; no floats, so sub-cent drift cannot
//! creep into the receipt. The discount is the first-order promotion at a
//! flat 20 % of the subtotal, rounded half-up to the nearest cent.

use serde::{Deserialize, Serialize};

/// First-order promotion, in percent of the subtotal.
pub const FIRST_ORDER_DISCOUNT_PCT: u64 = 20;

/// An order line plus the derived totals, all in cents.
///
/// Quantity never drops below 1; `decrement` at 1 is a no-op, mirroring
/// the stepper control on the summary screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    quantity: u32,
    unit_price_cents: u64,
    delivery_fee_cents: u64,
    first_order: bool,
}

impl OrderSummary {
    pub fn new(quantity: u32, unit_price_cents: u64, delivery_fee_cents: u64) -> Self {
        Self {
            quantity: quantity.max(1),
            unit_price_cents,
            delivery_fee_cents,
            first_order: true,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price_cents(&self) -> u64 {
        self.unit_price_cents
    }

    pub fn delivery_fee_cents(&self) -> u64 {
        self.delivery_fee_cents
    }

    pub fn set_first_order(&mut self, first_order: bool) {
        self.first_order = first_order;
    }

    pub fn increment(&mut self) {
        self.quantity += 1;
    }

    /// Lower the quantity by one, floored at 1.
    pub fn decrement(&mut self) {
        if self.quantity > 1 {
            self.quantity -= 1;
        }
    }

    pub fn subtotal_cents(&self) -> u64 {
        self.unit_price_cents * u64::from(self.quantity)
    }

    /// Promotion amount deducted from the subtotal; zero after the first
    /// order.
    pub fn discount_cents(&self) -> u64 {
        if !self.first_order {
            return 0;
        }
        // Round half-up to the nearest cent.
        (self.subtotal_cents() * FIRST_ORDER_DISCOUNT_PCT + 50) / 100
    }

    pub fn total_cents(&self) -> u64 {
        self.subtotal_cents() - self.discount_cents() + self.delivery_fee_cents
    }
}
