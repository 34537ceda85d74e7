// src/simulation/engine.rs

use crate::engine::bid::{BidEngine, BidHistory};
use crate::engine::offer::OfferSelector;
use crate::engine::procurement::ProcurementPlanner;
use crate::engine::scheduler::{DailyScheduler, DaySchedule, Decision};
use crate::error::{ConfigError, SimulationError};
use crate::model::demand::{BillOfMaterials, ComponentCatalog, DemandLedger};
use crate::model::events::{
    AcceptedOrder, CustomerOffer, CustomerRequest, DailyStatus, InboundEvent, OutboundCommand,
    SupplierOfferBundle, SupplierOrder, SupplierRfq,
};
use crate::model::inventory::InventoryLedger;
use crate::model::order::{Order, OrderBook};
use crate::model::types::Day;
use crate::simulation::config::SimulationConfig;
use crate::strategy::implementations::{Factory, RandomSupplierSelector, ZeroReservePrice};
use crate::strategy::traits::{PriceModel, ProductionLine, SupplierSelector};
use serde::Serialize;
use tracing::info;

/// Collaborators handed over at simulation start.
#[derive(Debug, Clone, Default)]
pub struct StartInfo {
    pub bill_of_materials: BillOfMaterials,
    pub component_catalog: ComponentCatalog,
}

// Serialize so io::reporting can write one CSV row per day
#[derive(Debug, Clone, Default, Serialize)]
pub struct DayRecord {
    pub day: Day,
    pub offers_sent: usize,
    pub orders_accepted: usize,
    pub rfqs_sent: usize,
    pub supplier_orders: usize,
    pub deliveries: usize,
    pub cancellations: usize,
    pub production_units: u32,
    pub pending_orders: usize,
    pub open_rfqs: usize,
    pub stock_on_hand: u32,
}

/// Output of the end-of-day pass.
#[derive(Debug, Clone, Default)]
pub struct DayClose {
    /// Retries for demand that could not be procured earlier.
    pub rfqs: Vec<SupplierRfq>,
    pub schedule: DaySchedule,
}

/// One manufacturer for one simulation. Built at simulation start, dropped
/// (or `finish`ed) at the end; all state lives here.
#[derive(Debug)]
pub struct Manufacturer {
    config: SimulationConfig,
    bom: BillOfMaterials,
    catalog: ComponentCatalog,

    bids: BidEngine,
    demand: DemandLedger,
    procurement: ProcurementPlanner,
    offers: OfferSelector,
    scheduler: DailyScheduler,
    inventory: InventoryLedger,
    orders: OrderBook,
    line: Box<dyn ProductionLine>,

    current_day: Day,
    last_planned_day: Option<Day>,
    today: DayRecord,
    pub history: Vec<DayRecord>,
}

impl Manufacturer {
    pub fn new(config: SimulationConfig, start: StartInfo) -> Result<Self, ConfigError> {
        config.validate()?;

        // Every random strategy gets its own stream derived from the seed.
        let procurement = ProcurementPlanner::new(
            config.supplier_lead_time,
            Box::new(RandomSupplierSelector::new(config.rng_seed.wrapping_add(1))),
            Box::new(ZeroReservePrice),
        );
        let line = Box::new(Factory::new(start.bill_of_materials.clone(), 0));

        info!(
            total_days = config.total_days,
            last_bid_due_date = config.last_biddable_due_date(),
            "simulation started"
        );

        Ok(Self {
            bids: BidEngine::new(&config),
            demand: DemandLedger::new(),
            procurement,
            offers: OfferSelector::new(config.supplier_price_tolerance),
            scheduler: DailyScheduler::new(config.days_before_void),
            inventory: InventoryLedger::new(),
            orders: OrderBook::new(),
            line,
            current_day: 0,
            last_planned_day: None,
            today: DayRecord::default(),
            history: Vec::new(),
            bom: start.bill_of_materials,
            catalog: start.component_catalog,
            config,
        })
    }

    /// Swaps the procurement strategies. Only meaningful before the first RFQ.
    pub fn with_strategies(
        mut self,
        selector: Box<dyn SupplierSelector>,
        price_model: Box<dyn PriceModel>,
    ) -> Self {
        self.procurement =
            ProcurementPlanner::new(self.config.supplier_lead_time, selector, price_model);
        self
    }

    pub fn with_production_line(mut self, line: Box<dyn ProductionLine>) -> Self {
        self.line = line;
        self
    }

    // =================================================================
    // Event handlers, in protocol order
    // =================================================================

    pub fn handle_customer_requests(
        &mut self,
        day: Day,
        requests: &[CustomerRequest],
    ) -> Vec<CustomerOffer> {
        self.advance_to(day);
        let offers = self.bids.handle_requests(day, requests);
        self.today.offers_sent += offers.len();
        offers
    }

    pub fn handle_customer_orders(&mut self, day: Day, orders: &[AcceptedOrder]) -> Vec<SupplierRfq> {
        self.advance_to(day);
        self.bids.record_orders(orders);

        for accepted in orders {
            self.demand
                .record_order_accepted(&self.bom, accepted.product_id, accepted.quantity);
            self.orders.insert(Order::from(accepted));
        }
        self.today.orders_accepted += orders.len();

        self.plan_procurement(day)
    }

    pub fn handle_supplier_offers(
        &mut self,
        day: Day,
        bundles: &[SupplierOfferBundle],
    ) -> Vec<SupplierOrder> {
        self.advance_to(day);
        let mut orders = Vec::new();
        for bundle in bundles {
            orders.extend(
                self.offers
                    .resolve_bundle(bundle, &mut self.procurement, &mut self.demand),
            );
        }
        self.today.supplier_orders += orders.len();
        orders
    }

    /// All of today's messages are in: roll inventory forward and schedule
    /// production and deliveries.
    pub fn handle_daily_status(&mut self, status: &DailyStatus) -> Result<DayClose, SimulationError> {
        let day = status.day;
        self.advance_to(day);

        self.procurement.expire_unanswered(day, &mut self.demand);
        let rfqs = if self.last_planned_day == Some(day) {
            Vec::new()
        } else {
            self.plan_procurement(day)
        };

        self.inventory.begin_day(&status.product_arrivals);
        for arrival in &status.component_arrivals {
            self.line.receive_components(arrival.product_id, arrival.quantity);
        }
        self.line.set_capacity(status.factory_capacity);

        let schedule = self.scheduler.run(
            day,
            &mut self.orders,
            &mut self.inventory,
            &mut self.demand,
            &self.bom,
            self.line.as_mut(),
        )?;

        self.close_day(&schedule);
        Ok(DayClose { rfqs, schedule })
    }

    /// Routes one inbound event to its handler.
    pub fn handle(&mut self, event: &InboundEvent) -> Result<Vec<OutboundCommand>, SimulationError> {
        let commands = match event {
            InboundEvent::CustomerRequests { day, requests } => self
                .handle_customer_requests(*day, requests)
                .into_iter()
                .map(OutboundCommand::CustomerOffer)
                .collect(),
            InboundEvent::CustomerOrders { day, orders } => self
                .handle_customer_orders(*day, orders)
                .into_iter()
                .map(OutboundCommand::SupplierRfq)
                .collect(),
            InboundEvent::SupplierOffers { day, bundles } => self
                .handle_supplier_offers(*day, bundles)
                .into_iter()
                .map(OutboundCommand::SupplierOrder)
                .collect(),
            InboundEvent::DailyStatus(status) => {
                let close = self.handle_daily_status(status)?;
                let mut commands: Vec<OutboundCommand> = close
                    .rfqs
                    .into_iter()
                    .map(OutboundCommand::SupplierRfq)
                    .collect();
                commands.extend(close.schedule.production.into_iter().map(OutboundCommand::Production));
                commands.extend(close.schedule.deliveries.into_iter().map(OutboundCommand::Delivery));
                commands
            }
        };
        Ok(commands)
    }

    /// Ends the simulation and hands back the per-day history.
    pub fn finish(self) -> Vec<DayRecord> {
        info!(
            days = self.history.len(),
            orders = self.orders.len(),
            pending = self.orders.pending_count(),
            "simulation ended"
        );
        self.history
    }

    // =================================================================
    // Accessors
    // =================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn current_day(&self) -> Day {
        self.current_day
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    pub fn inventory(&self) -> &InventoryLedger {
        &self.inventory
    }

    pub fn demand(&self) -> &DemandLedger {
        &self.demand
    }

    pub fn bid_history(&self) -> &BidHistory {
        self.bids.history()
    }

    pub fn open_rfqs(&self) -> usize {
        self.procurement.open_count()
    }

    fn advance_to(&mut self, day: Day) {
        self.current_day = day;
        self.today.day = day;
    }

    fn plan_procurement(&mut self, day: Day) -> Vec<SupplierRfq> {
        let rfqs = self.procurement.plan(day, &mut self.demand, &self.catalog);
        self.last_planned_day = Some(day);
        self.today.rfqs_sent += rfqs.len();
        rfqs
    }

    fn close_day(&mut self, schedule: &DaySchedule) {
        let mut record = std::mem::take(&mut self.today);
        record.deliveries = schedule.deliveries.len();
        record.cancellations = schedule.count(|d| matches!(d, Decision::Cancel));
        record.production_units = schedule.production_units();
        record.pending_orders = self.orders.pending_count();
        record.open_rfqs = self.procurement.open_count();
        record.stock_on_hand = self.inventory.total_available();

        info!(
            day = record.day,
            offers = record.offers_sent,
            orders = record.orders_accepted,
            deliveries = record.deliveries,
            cancellations = record.cancellations,
            production = record.production_units,
            pending = record.pending_orders,
            "day closed"
        );
        self.history.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::events::{StockArrival, SupplierOffer};
    use crate::model::order::OrderState;

    fn start() -> StartInfo {
        StartInfo {
            bill_of_materials: BillOfMaterials::new().with_product(7, &[100, 200]),
            component_catalog: ComponentCatalog::new()
                .with_supplier(100, "pintel")
                .with_supplier(200, "imd"),
        }
    }

    fn manufacturer() -> Manufacturer {
        let config = SimulationConfig {
            total_days: 50,
            days_before_void: 4,
            ..Default::default()
        };
        Manufacturer::new(config, start()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimulationConfig {
            total_days: 0,
            ..Default::default()
        };
        assert!(matches!(
            Manufacturer::new(config, start()),
            Err(ConfigError::NoDays)
        ));
    }

    #[test]
    fn one_order_from_request_to_delivery() {
        let mut m = manufacturer();

        let offers = m.handle_customer_requests(
            1,
            &[CustomerRequest {
                request_id: 11,
                product_id: 7,
                quantity: 4,
                reserve_price_per_unit: 500,
                due_date: 8,
            }],
        );
        assert_eq!(offers.len(), 1);

        let rfqs = m.handle_customer_orders(
            2,
            &[AcceptedOrder {
                order_id: 1,
                request_id: Some(11),
                product_id: 7,
                quantity: 4,
                due_date: 8,
            }],
        );
        assert_eq!(rfqs.len(), 2);
        assert_eq!(m.bid_history().len(), 1);
        m.handle_daily_status(&DailyStatus {
            day: 2,
            ..Default::default()
        })
        .unwrap();

        let bundles: Vec<_> = rfqs
            .iter()
            .map(|rfq| SupplierOfferBundle {
                supplier: rfq.supplier.clone(),
                offers: vec![SupplierOffer {
                    rfq_id: rfq.rfq_id,
                    unit_price: 90,
                    quantity: rfq.quantity,
                }],
            })
            .collect();
        assert_eq!(m.handle_supplier_offers(3, &bundles).len(), 2);
        assert_eq!(m.open_rfqs(), 0);

        // components land, production starts
        let close = m
            .handle_daily_status(&DailyStatus {
                day: 5,
                factory_capacity: 100,
                product_arrivals: vec![],
                component_arrivals: vec![
                    StockArrival { product_id: 100, quantity: 4 },
                    StockArrival { product_id: 200, quantity: 4 },
                ],
            })
            .unwrap();
        assert_eq!(close.schedule.production_units(), 4);

        // products land, delivery the day before the due date
        let close = m
            .handle_daily_status(&DailyStatus {
                day: 7,
                factory_capacity: 100,
                product_arrivals: vec![StockArrival { product_id: 7, quantity: 4 }],
                component_arrivals: vec![],
            })
            .unwrap();
        assert_eq!(close.schedule.deliveries.len(), 1);
        assert_eq!(m.orders().get(1).unwrap().state(), OrderState::Delivered);
        assert_eq!(m.inventory().available(7), 0);

        let history = m.finish();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].deliveries, 1);
    }

    #[test]
    fn status_retries_procurement_when_no_orders_came_in() {
        let start = StartInfo {
            bill_of_materials: BillOfMaterials::new().with_product(7, &[100]),
            component_catalog: ComponentCatalog::new().with_supplier(100, "pintel"),
        };
        let mut m = Manufacturer::new(SimulationConfig::default(), start).unwrap();

        let rfqs = m.handle_customer_orders(
            1,
            &[AcceptedOrder {
                order_id: 1,
                request_id: None,
                product_id: 7,
                quantity: 3,
                due_date: 30,
            }],
        );
        assert_eq!(rfqs.len(), 1);

        // day 2: no offers ever arrive for the day-1 RFQ
        let close = m
            .handle_daily_status(&DailyStatus {
                day: 2,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(close.rfqs.len(), 1);
        assert_eq!(close.rfqs[0].quantity, 3);
        assert_eq!(m.demand().outstanding(100), 0);
    }
}
