// src/engine/procurement.rs

use crate::model::demand::{ComponentCatalog, DemandLedger};
use crate::model::events::SupplierRfq;
use crate::model::types::{Day, Price, ProductId, RfqId, SupplierAddress};
use crate::strategy::traits::{PriceModel, SupplierSelector};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// An RFQ we sent and have not resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfqRecord {
    pub rfq_id: RfqId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub issued_on: Day,
    pub due_date: Day,
    pub supplier: SupplierAddress,
}

/// Turns outstanding component demand into supplier RFQs.
#[derive(Debug)]
pub struct ProcurementPlanner {
    supplier_lead_time: Day,
    selector: Box<dyn SupplierSelector>,
    price_model: Box<dyn PriceModel>,
    open: BTreeMap<RfqId, RfqRecord>,
    next_rfq_id: RfqId,
}

impl ProcurementPlanner {
    pub fn new(
        supplier_lead_time: u32,
        selector: Box<dyn SupplierSelector>,
        price_model: Box<dyn PriceModel>,
    ) -> Self {
        Self {
            supplier_lead_time: supplier_lead_time as Day,
            selector,
            price_model,
            open: BTreeMap::new(),
            next_rfq_id: 1,
        }
    }

    /// One RFQ per component with positive demand, for the full quantity.
    /// The demand is booked as covered as soon as the RFQ is issued.
    pub fn plan(
        &mut self,
        current_day: Day,
        demand: &mut DemandLedger,
        catalog: &ComponentCatalog,
    ) -> Vec<SupplierRfq> {
        let mut rfqs = Vec::new();

        for (component, quantity) in demand.positive() {
            let suppliers = catalog.suppliers_for(component);
            if suppliers.is_empty() {
                warn!(component, quantity, "no suppliers for component");
                continue;
            }
            let Some(index) = self.selector.select(component, suppliers) else {
                warn!(component, quantity, "supplier selector declined component");
                continue;
            };
            let Some(supplier) = suppliers.get(index) else {
                warn!(component, index, "supplier selector returned an out-of-range index");
                continue;
            };

            let reserve_price = self.price_model.reserve_price(component, quantity);
            let record = RfqRecord {
                rfq_id: self.next_rfq_id,
                product_id: component,
                quantity,
                issued_on: current_day,
                due_date: current_day + self.supplier_lead_time,
                supplier: supplier.clone(),
            };
            self.next_rfq_id += 1;

            demand.record_procurement_issued(component, quantity);
            debug!(
                rfq = record.rfq_id,
                component,
                quantity,
                supplier = %record.supplier,
                reserve_price,
                "supplier rfq"
            );

            rfqs.push(SupplierRfq {
                rfq_id: record.rfq_id,
                supplier: record.supplier.clone(),
                product_id: component,
                quantity,
                reserve_price,
                due_date: record.due_date,
            });
            self.open.insert(record.rfq_id, record);
        }
        rfqs
    }

    pub fn open_rfq(&self, rfq_id: RfqId) -> Option<&RfqRecord> {
        self.open.get(&rfq_id)
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Closes an RFQ, whatever its outcome.
    pub fn resolve(&mut self, rfq_id: RfqId) -> Option<RfqRecord> {
        self.open.remove(&rfq_id)
    }

    /// Drops RFQs issued before `current_day` that never got an answer and
    /// returns their quantity to the demand ledger.
    pub fn expire_unanswered(&mut self, current_day: Day, demand: &mut DemandLedger) -> usize {
        let stale: Vec<RfqId> = self
            .open
            .values()
            .filter(|r| r.issued_on < current_day)
            .map(|r| r.rfq_id)
            .collect();

        for rfq_id in &stale {
            if let Some(record) = self.open.remove(rfq_id) {
                warn!(
                    rfq = record.rfq_id,
                    component = record.product_id,
                    supplier = %record.supplier,
                    "rfq expired without offers"
                );
                demand.record_procurement_failed(record.product_id, record.quantity);
            }
        }
        stale.len()
    }

    pub fn record_purchase(&mut self, component: ProductId, supplier: &str, unit_price: Price) {
        self.selector.record_purchase(component, supplier, unit_price);
        self.price_model.record_purchase(component, unit_price);
    }
}
