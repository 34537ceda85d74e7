// src/model/inventory.rs

use crate::error::LedgerError;
use crate::model::events::StockArrival;
use crate::model::types::{OrderId, ProductId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Stock of one finished product.
///
/// `available` is what is on hand; `reserved` is the part of it already
/// promised to an order in the current scheduling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub available: u32,
    pub reserved: u32,
}

impl StockLevel {
    /// On hand and not promised to anyone.
    pub fn free(&self) -> u32 {
        self.available - self.reserved
    }
}

/// Finished-goods inventory. Every mutation keeps `reserved <= available`
/// and leaves the ledger untouched when it would not.
#[derive(Debug, Default)]
pub struct InventoryLedger {
    stock: BTreeMap<ProductId, StockLevel>,
    reservations: HashMap<OrderId, (ProductId, u32)>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, product: ProductId) -> StockLevel {
        self.stock.get(&product).copied().unwrap_or_default()
    }

    pub fn available(&self, product: ProductId) -> u32 {
        self.level(product).available
    }

    pub fn reserved(&self, product: ProductId) -> u32 {
        self.level(product).reserved
    }

    pub fn free(&self, product: ProductId) -> u32 {
        self.level(product).free()
    }

    pub fn total_available(&self) -> u32 {
        self.stock.values().map(|s| s.available).sum()
    }

    pub fn add(&mut self, product: ProductId, quantity: u32) {
        self.stock.entry(product).or_default().available += quantity;
    }

    /// Rolls the ledger over to the next day: reservations made during the
    /// previous pass are released and today's arrivals are added.
    pub fn begin_day(&mut self, arrivals: &[StockArrival]) {
        for level in self.stock.values_mut() {
            level.reserved = 0;
        }
        self.reservations.clear();

        for arrival in arrivals {
            self.add(arrival.product_id, arrival.quantity);
        }
    }

    /// Promises `quantity` units of free stock to `order`.
    pub fn reserve(
        &mut self,
        order: OrderId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), LedgerError> {
        if quantity == 0 {
            return Ok(());
        }
        let level = self.stock.entry(product).or_default();
        let reserved = level.reserved + quantity;
        if reserved > level.available {
            return Err(LedgerError::ReservationOverflow {
                product,
                reserved,
                available: level.available,
            });
        }
        level.reserved = reserved;
        self.reservations.entry(order).or_insert((product, 0)).1 += quantity;
        debug!(order, product, quantity, "reserved stock");
        Ok(())
    }

    /// Ships `quantity` units for `order`, consuming any reservation the
    /// order holds first and free stock for the rest.
    pub fn deliver(
        &mut self,
        order: OrderId,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), LedgerError> {
        let held = match self.reservations.get(&order) {
            Some(&(p, q)) if p == product => q,
            _ => 0,
        };
        let level = self.level(product);
        let usable = level.free() + held;
        if usable < quantity {
            return Err(LedgerError::InsufficientStock {
                product,
                requested: quantity,
                free: usable,
            });
        }

        let entry = self.stock.entry(product).or_default();
        entry.available -= quantity;
        entry.reserved -= held;
        self.reservations.remove(&order);
        Ok(())
    }

    pub fn holds_invariant(&self) -> bool {
        self.stock.values().all(|s| s.reserved <= s.available)
    }

    pub fn snapshot(&self) -> Vec<(ProductId, StockLevel)> {
        self.stock.iter().map(|(p, s)| (*p, *s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_beyond_stock_is_rejected_without_change() {
        let mut ledger = InventoryLedger::new();
        ledger.add(7, 10);
        ledger.reserve(1, 7, 6).unwrap();

        let err = ledger.reserve(2, 7, 5).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ReservationOverflow {
                product: 7,
                reserved: 11,
                available: 10
            }
        );
        assert_eq!(ledger.reserved(7), 6);
        assert_eq!(ledger.free(7), 4);
    }

    #[test]
    fn delivery_uses_own_reservation_but_not_others() {
        let mut ledger = InventoryLedger::new();
        ledger.add(7, 10);
        ledger.reserve(1, 7, 8).unwrap();

        // Only 2 units are free for order 2.
        assert!(ledger.deliver(2, 7, 3).is_err());

        ledger.deliver(1, 7, 8).unwrap();
        assert_eq!(ledger.level(7), StockLevel { available: 2, reserved: 0 });
        assert!(ledger.holds_invariant());
    }

    #[test]
    fn begin_day_releases_reservations_and_adds_arrivals() {
        let mut ledger = InventoryLedger::new();
        ledger.add(3, 4);
        ledger.reserve(9, 3, 4).unwrap();

        ledger.begin_day(&[StockArrival {
            product_id: 3,
            quantity: 6,
        }]);

        assert_eq!(ledger.level(3), StockLevel { available: 10, reserved: 0 });
        assert_eq!(ledger.total_available(), 10);
    }

    #[test]
    fn unknown_product_has_no_stock() {
        let mut ledger = InventoryLedger::new();
        assert_eq!(ledger.free(42), 0);
        assert_eq!(
            ledger.deliver(1, 42, 1),
            Err(LedgerError::InsufficientStock {
                product: 42,
                requested: 1,
                free: 0
            })
        );
    }
}
