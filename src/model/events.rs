// src/model/events.rs

//! Decoded records exchanged with the transport layer.
//!
//! Within one day the transport delivers customer requests, accepted orders,
//! supplier offers and finally the daily status, in that order.

use crate::model::types::{Day, OrderId, Price, ProductId, RequestId, RfqId, SupplierAddress};
use serde::{Deserialize, Serialize};

// =========================================================================
// Inbound
// =========================================================================

/// A customer request for quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRequest {
    pub request_id: RequestId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub reserve_price_per_unit: Price,
    pub due_date: Day,
}

/// A customer order confirming one of our offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedOrder {
    pub order_id: OrderId,
    /// The request our offer answered, when the transport can tell.
    pub request_id: Option<RequestId>,
    pub product_id: ProductId,
    pub quantity: u32,
    pub due_date: Day,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOffer {
    pub rfq_id: RfqId,
    pub unit_price: Price,
    /// Zero means a price quote only.
    pub quantity: u32,
}

/// Every offer one supplier sent today, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOfferBundle {
    pub supplier: SupplierAddress,
    pub offers: Vec<SupplierOffer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockArrival {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// End-of-day signal. Carries what arrived today so the inventory for the
/// next day can be computed before scheduling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStatus {
    pub day: Day,
    /// Assembly cycles the factory can run tomorrow.
    pub factory_capacity: u32,
    /// Finished products that left the assembly line.
    pub product_arrivals: Vec<StockArrival>,
    /// Components delivered by suppliers.
    pub component_arrivals: Vec<StockArrival>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    CustomerRequests { day: Day, requests: Vec<CustomerRequest> },
    CustomerOrders { day: Day, orders: Vec<AcceptedOrder> },
    SupplierOffers { day: Day, bundles: Vec<SupplierOfferBundle> },
    DailyStatus(DailyStatus),
}

impl InboundEvent {
    pub fn day(&self) -> Day {
        match self {
            InboundEvent::CustomerRequests { day, .. }
            | InboundEvent::CustomerOrders { day, .. }
            | InboundEvent::SupplierOffers { day, .. } => *day,
            InboundEvent::DailyStatus(status) => status.day,
        }
    }
}

// =========================================================================
// Outbound
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOffer {
    pub request_id: RequestId,
    pub offered_price: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRfq {
    pub rfq_id: RfqId,
    pub supplier: SupplierAddress,
    pub product_id: ProductId,
    pub quantity: u32,
    pub reserve_price: Price,
    pub due_date: Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub supplier: SupplierAddress,
    pub rfq_id: RfqId,
    /// Index of the accepted offer within the supplier's bundle.
    pub accepted_offer_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub order_id: OrderId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    CustomerOffer(CustomerOffer),
    SupplierRfq(SupplierRfq),
    SupplierOrder(SupplierOrder),
    Production(ProductionRequest),
    Delivery(DeliveryRequest),
}
