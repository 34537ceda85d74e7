// src/strategy/traits.rs

use crate::model::types::{Price, ProductId, SupplierAddress};
use std::fmt::Debug;

/// Picks which supplier receives the RFQ for a component.
///
/// Implementations own their randomness (seeded per simulation) so that a
/// manufacturer instance is reproducible end to end.
pub trait SupplierSelector: Debug + Send {
    /// Returns an index into `suppliers`, or `None` to skip this pass.
    /// `suppliers` is never empty.
    fn select(&mut self, component: ProductId, suppliers: &[SupplierAddress]) -> Option<usize>;

    /// Called for every accepted supplier offer.
    fn record_purchase(&mut self, _component: ProductId, _supplier: &str, _unit_price: Price) {}
}

/// Reserve price put on a supplier RFQ.
pub trait PriceModel: Debug + Send {
    /// Highest unit price we are willing to pay. Zero means any price.
    fn reserve_price(&mut self, component: ProductId, quantity: u32) -> Price;

    fn record_purchase(&mut self, _component: ProductId, _unit_price: Price) {}
}

/// The assembly line behind a production request.
pub trait ProductionLine: Debug + Send {
    /// Starts assembling `quantity` units of `product` tomorrow.
    ///
    /// Succeeds only when both the components and the free cycles exist;
    /// on success the consumed components and cycles are removed.
    fn request_production(&mut self, product: ProductId, quantity: u32) -> bool;

    /// Components received from suppliers.
    fn receive_components(&mut self, component: ProductId, quantity: u32);

    /// Resets the cycle budget for the next day.
    fn set_capacity(&mut self, cycles: u32);

    fn free_capacity(&self) -> u32;
}
