// src/io/market.rs

//! A small synthetic world for the demo binary: customers that send RFQs and
//! sometimes order, suppliers that answer every RFQ with a partial and a
//! complete offer, and a factory floor that finishes production overnight.

use crate::model::demand::{BillOfMaterials, ComponentCatalog};
use crate::model::events::{
    AcceptedOrder, CustomerOffer, CustomerRequest, DailyStatus, OutboundCommand, StockArrival,
    SupplierOffer, SupplierOfferBundle, SupplierOrder, SupplierRfq,
};
use crate::model::types::{Day, OrderId, Price, ProductId, RequestId, RfqId};
use crate::simulation::engine::StartInfo;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("invalid market distribution: {0}")]
    Distribution(String),
}

#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub seed: u64,
    pub requests_per_day: f64,
    pub mean_quantity: f64,
    pub quantity_std_dev: f64,
    /// Due dates are drawn from `day + 3 ..= day + max_due_offset`.
    pub max_due_offset: Day,
    pub factory_capacity: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            requests_per_day: 8.0,
            mean_quantity: 10.0,
            quantity_std_dev: 4.0,
            max_due_offset: 12,
            factory_capacity: 2000,
        }
    }
}

/// Running totals of what the market saw.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketSummary {
    pub requests: usize,
    pub orders: usize,
    pub deliveries: usize,
    pub revenue: u64,
    pub component_cost: u64,
}

struct Catalogue {
    product: ProductId,
    components: [ProductId; 2],
    base_price: Price,
}

static CATALOGUE: [Catalogue; 4] = [
    Catalogue { product: 1, components: [100, 200], base_price: 1600 },
    Catalogue { product: 2, components: [101, 200], base_price: 1800 },
    Catalogue { product: 3, components: [100, 201], base_price: 2000 },
    Catalogue { product: 4, components: [101, 201], base_price: 2300 },
];

static SUPPLIERS: [(&str, ProductId, Price); 6] = [
    ("pintel", 100, 400),
    ("imd", 100, 380),
    ("pintel", 101, 520),
    ("imd", 101, 500),
    ("basus", 200, 250),
    ("macrostar", 201, 300),
];

pub struct Market {
    config: MarketConfig,
    rng: StdRng,
    arrivals: Poisson<f64>,
    quantity: Normal<f64>,
    next_request_id: RequestId,
    next_order_id: OrderId,

    /// Offers received today, answered by customers tomorrow.
    open_offers: Vec<(CustomerRequest, Price)>,
    requests: HashMap<RequestId, CustomerRequest>,
    /// RFQs received today, answered by suppliers tomorrow.
    open_rfqs: Vec<SupplierRfq>,
    sent_bundles: HashMap<String, SupplierOfferBundle>,
    rfqs: HashMap<RfqId, SupplierRfq>,

    component_arrivals: BTreeMap<Day, Vec<StockArrival>>,
    product_arrivals: BTreeMap<Day, Vec<StockArrival>>,
    order_prices: HashMap<OrderId, u64>,
    summary: MarketSummary,
}

impl Market {
    pub fn new(config: MarketConfig) -> Result<Self, MarketError> {
        let arrivals = Poisson::new(config.requests_per_day)
            .map_err(|e| MarketError::Distribution(e.to_string()))?;
        let quantity = Normal::new(config.mean_quantity, config.quantity_std_dev)
            .map_err(|e| MarketError::Distribution(e.to_string()))?;

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            arrivals,
            quantity,
            next_request_id: 1,
            next_order_id: 1,
            open_offers: Vec::new(),
            requests: HashMap::new(),
            open_rfqs: Vec::new(),
            sent_bundles: HashMap::new(),
            rfqs: HashMap::new(),
            component_arrivals: BTreeMap::new(),
            product_arrivals: BTreeMap::new(),
            order_prices: HashMap::new(),
            summary: MarketSummary::default(),
        })
    }

    pub fn start_info(&self) -> StartInfo {
        let bill_of_materials = CATALOGUE.iter().fold(BillOfMaterials::new(), |bom, item| {
            bom.with_product(item.product, &item.components)
        });
        let component_catalog = SUPPLIERS
            .iter()
            .fold(ComponentCatalog::new(), |catalog, (supplier, component, _)| {
                catalog.with_supplier(*component, supplier)
            });
        StartInfo {
            bill_of_materials,
            component_catalog,
        }
    }

    pub fn summary(&self) -> &MarketSummary {
        &self.summary
    }

    // =================================================================
    // Customers
    // =================================================================

    pub fn customer_requests(&mut self, day: Day) -> Vec<CustomerRequest> {
        let count = self.arrivals.sample(&mut self.rng) as usize;
        let mut requests = Vec::with_capacity(count);

        for _ in 0..count {
            let item = &CATALOGUE[self.rng.gen_range(0..CATALOGUE.len())];
            let quantity = self.quantity.sample(&mut self.rng).round().max(1.0) as u32;
            let markup = self.rng.gen_range(0.9..1.25);
            let request = CustomerRequest {
                request_id: self.next_request_id,
                product_id: item.product,
                quantity,
                reserve_price_per_unit: (f64::from(item.base_price) * markup) as Price,
                due_date: day + self.rng.gen_range(3..=self.config.max_due_offset),
            };
            self.next_request_id += 1;
            self.requests.insert(request.request_id, request.clone());
            requests.push(request);
        }

        self.summary.requests += requests.len();
        requests
    }

    pub fn receive_customer_offers(&mut self, offers: &[CustomerOffer]) {
        for offer in offers {
            if let Some(request) = self.requests.remove(&offer.request_id) {
                self.open_offers.push((request, offer.offered_price));
            }
        }
        self.requests.clear();
    }

    /// Customers answer yesterday's offers. Cheaper offers win more often;
    /// now and then a customer orders less than it asked for.
    pub fn customer_orders(&mut self) -> Vec<AcceptedOrder> {
        let mut orders = Vec::new();
        for (request, price) in std::mem::take(&mut self.open_offers) {
            let ratio = f64::from(price) / f64::from(request.reserve_price_per_unit.max(1));
            let p_accept = (1.2 - ratio).clamp(0.05, 0.6);
            if !self.rng.gen_bool(p_accept) {
                continue;
            }
            let quantity = if self.rng.gen_bool(0.1) {
                (request.quantity / 2).max(1)
            } else {
                request.quantity
            };
            let order = AcceptedOrder {
                order_id: self.next_order_id,
                request_id: Some(request.request_id),
                product_id: request.product_id,
                quantity,
                due_date: request.due_date,
            };
            self.next_order_id += 1;
            self.order_prices
                .insert(order.order_id, u64::from(price) * u64::from(quantity));
            orders.push(order);
        }
        self.summary.orders += orders.len();
        orders
    }

    // =================================================================
    // Suppliers
    // =================================================================

    pub fn receive_supplier_rfqs(&mut self, rfqs: &[SupplierRfq]) {
        self.open_rfqs.extend(rfqs.iter().cloned());
    }

    /// Every supplier answers yesterday's RFQs with a cheaper partial offer
    /// followed by a complete one.
    pub fn supplier_offers(&mut self) -> Vec<SupplierOfferBundle> {
        let mut bundles: BTreeMap<String, SupplierOfferBundle> = BTreeMap::new();

        for rfq in std::mem::take(&mut self.open_rfqs) {
            let Some(&(_, _, list_price)) = SUPPLIERS
                .iter()
                .find(|(s, c, _)| *s == rfq.supplier && *c == rfq.product_id)
            else {
                continue;
            };
            let price = (f64::from(list_price) * self.rng.gen_range(0.85..1.15)) as Price;
            if rfq.reserve_price > 0 && price > rfq.reserve_price {
                debug!(rfq = rfq.rfq_id, price, reserve = rfq.reserve_price, "supplier declines");
                continue;
            }

            let bundle = bundles
                .entry(rfq.supplier.clone())
                .or_insert_with(|| SupplierOfferBundle {
                    supplier: rfq.supplier.clone(),
                    offers: Vec::new(),
                });
            bundle.offers.push(SupplierOffer {
                rfq_id: rfq.rfq_id,
                unit_price: price,
                quantity: (rfq.quantity / 2).max(1),
            });
            bundle.offers.push(SupplierOffer {
                rfq_id: rfq.rfq_id,
                unit_price: price + price / 20,
                quantity: rfq.quantity,
            });
            self.rfqs.insert(rfq.rfq_id, rfq);
        }

        self.sent_bundles = bundles
            .iter()
            .map(|(s, b)| (s.clone(), b.clone()))
            .collect();
        bundles.into_values().collect()
    }

    /// Accepted supplier offers ship on the RFQ due date.
    pub fn receive_supplier_orders(&mut self, orders: &[SupplierOrder]) {
        for order in orders {
            let Some(offer) = self
                .sent_bundles
                .get(&order.supplier)
                .and_then(|b| b.offers.get(order.accepted_offer_index))
            else {
                continue;
            };
            let Some(rfq) = self.rfqs.remove(&order.rfq_id) else {
                continue;
            };
            self.summary.component_cost += u64::from(offer.unit_price) * u64::from(offer.quantity);
            self.component_arrivals
                .entry(rfq.due_date)
                .or_default()
                .push(StockArrival {
                    product_id: rfq.product_id,
                    quantity: offer.quantity,
                });
        }
    }

    // =================================================================
    // Factory floor
    // =================================================================

    pub fn daily_status(&mut self, day: Day) -> DailyStatus {
        // Anything scheduled for a day we skipped still arrives.
        let component_arrivals = drain_until(&mut self.component_arrivals, day);
        let product_arrivals = drain_until(&mut self.product_arrivals, day);
        DailyStatus {
            day,
            factory_capacity: self.config.factory_capacity,
            product_arrivals,
            component_arrivals,
        }
    }

    /// Production finishes overnight; deliveries are paid on the spot.
    pub fn receive_factory_schedule(&mut self, day: Day, commands: &[OutboundCommand]) {
        for command in commands {
            match command {
                OutboundCommand::Production(request) => {
                    self.product_arrivals
                        .entry(day + 1)
                        .or_default()
                        .push(StockArrival {
                            product_id: request.product_id,
                            quantity: request.quantity,
                        });
                }
                OutboundCommand::Delivery(delivery) => {
                    self.summary.deliveries += 1;
                    self.summary.revenue += self
                        .order_prices
                        .remove(&delivery.order_id)
                        .unwrap_or(0);
                }
                OutboundCommand::SupplierRfq(rfq) => self.open_rfqs.push(rfq.clone()),
                OutboundCommand::CustomerOffer(_) | OutboundCommand::SupplierOrder(_) => {}
            }
        }
    }
}

fn drain_until(scheduled: &mut BTreeMap<Day, Vec<StockArrival>>, day: Day) -> Vec<StockArrival> {
    let later = scheduled.split_off(&(day + 1));
    let due = std::mem::replace(scheduled, later);
    due.into_values().flatten().collect()
}
