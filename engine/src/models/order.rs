//! Order lifecycle model.
//!
//! An order travels Pending → Shipped → Delivered and never regresses.
//! Applying an already-reached transition again is a no-op, which makes the
//! ledger confirmation path idempotent by construction.
//!
//! The `OrderBook` tracks every order of a game in placement order. Shipments
//! are applied to the oldest open orders on an edge first (FIFO), and
//! deliveries are scheduled `shipping_delay` weeks after shipment.

use crate::models::role::{validate_order_flow, InvalidFlow, OrderParty, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing or mutating orders.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error(transparent)]
    InvalidFlow(#[from] InvalidFlow),

    #[error("order quantity must be positive")]
    ZeroQuantity,
}

/// Lifecycle status of an order. Transitions are forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed, not yet (fully) shipped by the recipient.
    Pending,
    /// Fully shipped by the recipient in the given week.
    Shipped { week: u32 },
    /// Goods arrived at the sender in the given week.
    Delivered { week: u32 },
}

impl OrderStatus {
    fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Shipped { .. } => 1,
            OrderStatus::Delivered { .. } => 2,
        }
    }
}

/// Ledger mirroring metadata carried on each order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMeta {
    /// Reference assigned by the ledger on successful submission.
    pub external_id: Option<String>,
    /// True once the ledger has confirmed the order exists.
    pub confirmed: bool,
    /// Failed submission attempts awaiting reconciliation retry.
    pub sync_attempts: u32,
}

/// A replenishment order between adjacent tiers of the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: String,
    sender: OrderParty,
    recipient: Role,
    quantity: u32,
    placed_week: u32,
    delivery_week: u32,
    /// Units of this order covered by shipments so far.
    shipped_quantity: u32,
    status: OrderStatus,
    pub ledger: LedgerMeta,
}

impl Order {
    /// Create a new pending order.
    ///
    /// # Errors
    ///
    /// Rejects non-adjacent (sender, recipient) pairs and zero quantities;
    /// nothing is mutated on error.
    pub fn new(
        sender: OrderParty,
        recipient: Role,
        quantity: u32,
        placed_week: u32,
        order_delay: u32,
    ) -> Result<Self, OrderError> {
        validate_order_flow(sender, recipient)?;
        if quantity == 0 {
            return Err(OrderError::ZeroQuantity);
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            recipient,
            quantity,
            placed_week,
            delivery_week: placed_week + order_delay,
            shipped_quantity: 0,
            status: OrderStatus::Pending,
            ledger: LedgerMeta::default(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> OrderParty {
        self.sender
    }

    pub fn recipient(&self) -> Role {
        self.recipient
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn placed_week(&self) -> u32 {
        self.placed_week
    }

    /// Week the order becomes visible to the recipient as incoming demand.
    pub fn delivery_week(&self) -> u32 {
        self.delivery_week
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self.status, OrderStatus::Delivered { .. })
    }

    /// Units still awaiting shipment coverage.
    pub fn unshipped_quantity(&self) -> u32 {
        self.quantity - self.shipped_quantity
    }

    /// Record `amount` units shipped against this order.
    ///
    /// Returns true if the order became fully shipped with this call.
    fn cover(&mut self, amount: u32, week: u32) -> bool {
        debug_assert!(amount <= self.unshipped_quantity());
        self.shipped_quantity += amount;
        if self.shipped_quantity >= self.quantity && self.status.rank() < 1 {
            self.status = OrderStatus::Shipped { week };
            true
        } else {
            false
        }
    }

    /// Advance to Shipped. No-op if already Shipped or Delivered.
    pub fn mark_shipped(&mut self, week: u32) {
        if self.status.rank() < 1 {
            self.shipped_quantity = self.quantity;
            self.status = OrderStatus::Shipped { week };
        }
    }

    /// Advance to Delivered. No-op if already Delivered.
    pub fn mark_delivered(&mut self, week: u32) {
        if self.status.rank() < 2 {
            self.shipped_quantity = self.quantity;
            self.status = OrderStatus::Delivered { week };
        }
    }
}

/// A shipment delivery scheduled for a future week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ScheduledDelivery {
    order_id: String,
    due_week: u32,
}

/// All orders of a single game, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    orders: Vec<Order>,
    deliveries: Vec<ScheduledDelivery>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly placed order and return its id.
    pub fn place(&mut self, order: Order) -> String {
        let id = order.id().to_string();
        self.orders.push(order);
        id
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Order> {
        self.orders.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Apply `quantity` units shipped by `supplier` to its oldest open
    /// orders, FIFO. Orders that become fully shipped get a delivery
    /// scheduled `shipping_delay` weeks out (immediately delivered when the
    /// delay is zero, e.g. the Retailer handing goods to the customer).
    ///
    /// Returns the ids of orders that transitioned to Shipped.
    pub fn record_shipment(
        &mut self,
        supplier: Role,
        mut quantity: u32,
        week: u32,
        shipping_delay: u32,
    ) -> Vec<String> {
        let mut shipped = Vec::new();
        for order in self
            .orders
            .iter_mut()
            .filter(|o| o.recipient() == supplier && o.unshipped_quantity() > 0)
        {
            if quantity == 0 {
                break;
            }
            let take = order.unshipped_quantity().min(quantity);
            quantity -= take;
            if order.cover(take, week) {
                shipped.push(order.id().to_string());
                if shipping_delay == 0 {
                    order.mark_delivered(week);
                } else {
                    self.deliveries.push(ScheduledDelivery {
                        order_id: order.id().to_string(),
                        due_week: week + shipping_delay,
                    });
                }
            }
        }
        shipped
    }

    /// Mark every shipment whose transit completed by `week` as Delivered.
    ///
    /// Returns the ids of orders that transitioned.
    pub fn process_deliveries(&mut self, week: u32) -> Vec<String> {
        let mut due = Vec::new();
        self.deliveries.retain(|d| {
            if d.due_week <= week {
                due.push(d.order_id.clone());
                false
            } else {
                true
            }
        });

        let mut delivered = Vec::new();
        for id in due {
            if let Some(order) = self.get_mut(&id) {
                if !order.is_delivered() {
                    order.mark_delivered(week);
                    delivered.push(id);
                }
            }
        }
        delivered
    }

    /// Find the order carrying the given ledger reference.
    pub fn find_by_external_ref(&self, external_ref: &str) -> Option<&Order> {
        self.orders
            .iter()
            .find(|o| o.ledger.external_id.as_deref() == Some(external_ref))
    }

    /// Shape-match an inbound ledger event by (week, role pair, quantity).
    ///
    /// Returns the id of the oldest unconfirmed match plus the total number
    /// of candidates, so the caller can flag ambiguity. No foreign key exists
    /// until a submission succeeds, hence this heuristic.
    pub fn oldest_shape_match(
        &self,
        week: u32,
        sender: OrderParty,
        recipient: Role,
        quantity: u32,
    ) -> (Option<String>, usize) {
        let mut candidates = self.orders.iter().filter(|o| {
            o.placed_week() == week
                && o.sender() == sender
                && o.recipient() == recipient
                && o.quantity() == quantity
                && !o.ledger.confirmed
        });
        let first = candidates.next().map(|o| o.id().to_string());
        let count = if first.is_some() {
            1 + candidates.count()
        } else {
            0
        };
        (first, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(qty: u32, week: u32) -> Order {
        Order::new(OrderParty::Role(Role::Retailer), Role::Wholesaler, qty, week, 2).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_flow_and_zero_quantity() {
        assert!(matches!(
            Order::new(OrderParty::Customer, Role::Factory, 5, 1, 2),
            Err(OrderError::InvalidFlow(_))
        ));
        assert_eq!(
            Order::new(OrderParty::Customer, Role::Retailer, 0, 1, 2),
            Err(OrderError::ZeroQuantity)
        );
    }

    #[test]
    fn test_status_is_forward_only() {
        let mut o = order(4, 1);
        o.mark_delivered(3);
        // A late "shipped" confirmation must not regress the status.
        o.mark_shipped(2);
        assert_eq!(o.status(), OrderStatus::Delivered { week: 3 });
    }

    #[test]
    fn test_mark_delivered_is_idempotent() {
        let mut o = order(4, 1);
        o.mark_delivered(3);
        o.mark_delivered(5);
        assert_eq!(o.status(), OrderStatus::Delivered { week: 3 });
    }

    #[test]
    fn test_fifo_shipment_coverage() {
        let mut book = OrderBook::new();
        let first = book.place(order(4, 1));
        let second = book.place(order(4, 1));

        // 6 units cover the first order fully and half of the second.
        let shipped = book.record_shipment(Role::Wholesaler, 6, 2, 2);
        assert_eq!(shipped, vec![first.clone()]);
        assert!(book.get(&second).unwrap().is_pending());
        assert_eq!(book.get(&second).unwrap().unshipped_quantity(), 2);

        // The remainder completes the second order.
        let shipped = book.record_shipment(Role::Wholesaler, 2, 3, 2);
        assert_eq!(shipped, vec![second.clone()]);

        // Deliveries land after the shipping delay.
        assert!(book.process_deliveries(3).contains(&first));
        assert!(book.process_deliveries(5).contains(&second));
        assert!(book.get(&first).unwrap().is_delivered());
    }

    #[test]
    fn test_zero_shipping_delay_delivers_immediately() {
        let mut book = OrderBook::new();
        let id = book.place(
            Order::new(OrderParty::Customer, Role::Retailer, 4, 1, 0).unwrap(),
        );
        book.record_shipment(Role::Retailer, 4, 1, 0);
        assert!(book.get(&id).unwrap().is_delivered());
    }

    #[test]
    fn test_oldest_shape_match_is_fifo_and_counts_candidates() {
        let mut book = OrderBook::new();
        let first = book.place(order(4, 1));
        let _second = book.place(order(4, 1));

        let (matched, count) =
            book.oldest_shape_match(1, OrderParty::Role(Role::Retailer), Role::Wholesaler, 4);
        assert_eq!(matched, Some(first.clone()));
        assert_eq!(count, 2);

        // Confirming the first removes it from the candidate set.
        book.get_mut(&first).unwrap().ledger.confirmed = true;
        let (matched, count) =
            book.oldest_shape_match(1, OrderParty::Role(Role::Retailer), Role::Wholesaler, 4);
        assert_ne!(matched, Some(first));
        assert_eq!(count, 1);
    }
}
