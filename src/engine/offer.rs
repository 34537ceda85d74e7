// src/engine/offer.rs

use crate::engine::procurement::ProcurementPlanner;
use crate::model::demand::DemandLedger;
use crate::model::events::{SupplierOffer, SupplierOfferBundle, SupplierOrder};
use crate::model::types::RfqId;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Picks at most one supplier offer per RFQ.
#[derive(Debug, Clone)]
pub struct OfferSelector {
    tolerance: f64,
}

impl OfferSelector {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Returns the position of the winning offer in `offers`.
    ///
    /// The price bar is set by the cheapest offer of the set, quotes and
    /// partial offers included. An offer qualifies when it covers the full
    /// `requested` quantity and stays within `tolerance` of that bar. The
    /// cheapest qualifying offer wins; equal prices go to the earliest
    /// submission.
    pub fn select(&self, requested: u32, offers: &[SupplierOffer]) -> Option<usize> {
        let cheapest = offers.iter().map(|o| o.unit_price).min()?;
        let limit = f64::from(cheapest) * self.tolerance;

        let mut best: Option<usize> = None;
        for (i, offer) in offers.iter().enumerate().rev() {
            let acceptable = offer.quantity > 0
                && offer.quantity >= requested
                && f64::from(offer.unit_price) <= limit;
            if !acceptable {
                continue;
            }
            match best {
                Some(b) if offers[b].unit_price < offer.unit_price => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Resolves every RFQ answered in one supplier's bundle. RFQs without a
    /// viable offer are closed and their quantity goes back to `demand`.
    pub fn resolve_bundle(
        &self,
        bundle: &SupplierOfferBundle,
        planner: &mut ProcurementPlanner,
        demand: &mut DemandLedger,
    ) -> Vec<SupplierOrder> {
        let mut by_rfq: BTreeMap<RfqId, Vec<usize>> = BTreeMap::new();
        for (i, offer) in bundle.offers.iter().enumerate() {
            by_rfq.entry(offer.rfq_id).or_default().push(i);
        }

        let mut orders = Vec::new();
        for (rfq_id, indices) in by_rfq {
            let Some(requested) = planner.open_rfq(rfq_id).map(|r| r.quantity) else {
                debug!(rfq = rfq_id, supplier = %bundle.supplier, "offer for unknown rfq");
                continue;
            };
            let group: Vec<SupplierOffer> =
                indices.iter().map(|&i| bundle.offers[i].clone()).collect();
            let winner = self.select(requested, &group);
            let Some(record) = planner.resolve(rfq_id) else {
                continue;
            };

            match winner {
                Some(pos) => {
                    let index = indices[pos];
                    let offer = &bundle.offers[index];
                    debug!(
                        rfq = rfq_id,
                        supplier = %bundle.supplier,
                        unit_price = offer.unit_price,
                        quantity = offer.quantity,
                        "supplier order"
                    );
                    planner.record_purchase(record.product_id, &bundle.supplier, offer.unit_price);
                    orders.push(SupplierOrder {
                        supplier: bundle.supplier.clone(),
                        rfq_id,
                        accepted_offer_index: index,
                    });
                }
                None => {
                    warn!(
                        rfq = rfq_id,
                        supplier = %bundle.supplier,
                        component = record.product_id,
                        "no viable supplier offer"
                    );
                    demand.record_procurement_failed(record.product_id, record.quantity);
                }
            }
        }
        orders
    }
}
