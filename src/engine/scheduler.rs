// src/engine/scheduler.rs

use crate::error::SimulationError;
use crate::model::demand::{BillOfMaterials, DemandLedger};
use crate::model::events::{DeliveryRequest, ProductionRequest};
use crate::model::inventory::InventoryLedger;
use crate::model::order::OrderBook;
use crate::model::types::{Day, OrderId};
use crate::strategy::traits::ProductionLine;
use tracing::{debug, info, instrument};

/// What the scheduler did with one order on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Deliver,
    Cancel,
    /// Covered from stock; nothing to produce.
    Reserve,
    /// Production started for `shortfall`, existing stock reserved.
    Produce { shortfall: u32 },
    Defer,
}

/// Factory schedule produced by one pass.
#[derive(Debug, Clone, Default)]
pub struct DaySchedule {
    pub deliveries: Vec<DeliveryRequest>,
    pub production: Vec<ProductionRequest>,
    pub decisions: Vec<(OrderId, Decision)>,
}

impl DaySchedule {
    pub fn count(&self, decision: fn(&Decision) -> bool) -> usize {
        self.decisions.iter().filter(|(_, d)| decision(d)).count()
    }

    pub fn decision_for(&self, order: OrderId) -> Option<Decision> {
        self.decisions
            .iter()
            .find(|(id, _)| *id == order)
            .map(|(_, d)| *d)
    }

    pub fn production_units(&self) -> u32 {
        self.production.iter().map(|p| p.quantity).sum()
    }
}

/// Walks the pending orders once per day and decides, per order, to
/// deliver, cancel, reserve from stock, produce, or wait.
#[derive(Debug, Clone)]
pub struct DailyScheduler {
    days_before_void: Day,
}

impl DailyScheduler {
    pub fn new(days_before_void: u32) -> Self {
        Self {
            days_before_void: days_before_void as Day,
        }
    }

    pub fn void_threshold(&self, current_day: Day) -> Day {
        current_day - self.days_before_void + 2
    }

    /// Runs the daily pass. Orders are visited in arrival order and exactly
    /// one rule fires per order:
    ///
    /// 1. deliver when due tomorrow (or later than that) and stock covers it
    /// 2. cancel when the due date is at or before the void threshold
    /// 3. reserve when free stock covers the whole order
    /// 4. produce the shortfall and reserve the stock we have
    /// 5. otherwise wait for a later day
    #[instrument(skip_all, fields(day = current_day))]
    pub fn run(
        &self,
        current_day: Day,
        orders: &mut OrderBook,
        inventory: &mut InventoryLedger,
        demand: &mut DemandLedger,
        bom: &BillOfMaterials,
        line: &mut dyn ProductionLine,
    ) -> Result<DaySchedule, SimulationError> {
        let void_threshold = self.void_threshold(current_day);
        let mut schedule = DaySchedule::default();

        for order in orders.pending_mut() {
            let product = order.product_id;
            let quantity = order.quantity;
            let free = inventory.free(product);

            let decision = if current_day >= order.due_date - 1
                && order.due_date >= void_threshold
                && inventory.deliver(order.id, product, quantity).is_ok()
            {
                order.deliver()?;
                schedule.deliveries.push(DeliveryRequest { order_id: order.id });
                Decision::Deliver
            } else if order.due_date <= void_threshold {
                info!(
                    order = order.id,
                    due_date = order.due_date,
                    day = current_day,
                    "canceling too late order"
                );
                order.cancel()?;
                demand.record_order_canceled(bom, product, quantity);
                Decision::Cancel
            } else if free >= quantity {
                inventory.reserve(order.id, product, quantity)?;
                Decision::Reserve
            } else if line.request_production(product, quantity - free) {
                inventory.reserve(order.id, product, free)?;
                schedule.production.push(ProductionRequest {
                    product_id: product,
                    quantity: quantity - free,
                });
                Decision::Produce {
                    shortfall: quantity - free,
                }
            } else {
                Decision::Defer
            };

            debug!(order = order.id, ?decision, "scheduled");
            schedule.decisions.push((order.id, decision));
        }

        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::order::{Order, OrderState};
    use crate::strategy::implementations::Factory;

    struct Fixture {
        orders: OrderBook,
        inventory: InventoryLedger,
        demand: DemandLedger,
        bom: BillOfMaterials,
        factory: Factory,
    }

    impl Fixture {
        fn new() -> Self {
            let bom = BillOfMaterials::new().with_product(7, &[100, 200]);
            Self {
                orders: OrderBook::new(),
                inventory: InventoryLedger::new(),
                demand: DemandLedger::new(),
                factory: Factory::new(bom.clone(), 100),
                bom,
            }
        }

        fn accept(&mut self, id: OrderId, quantity: u32, due_date: Day) {
            self.demand.record_order_accepted(&self.bom, 7, quantity);
            self.orders.insert(Order::new(id, 7, quantity, due_date));
        }

        fn run(&mut self, scheduler: &DailyScheduler, day: Day) -> DaySchedule {
            scheduler
                .run(
                    day,
                    &mut self.orders,
                    &mut self.inventory,
                    &mut self.demand,
                    &self.bom,
                    &mut self.factory,
                )
                .unwrap()
        }

        fn state(&self, id: OrderId) -> OrderState {
            self.orders.get(id).unwrap().state()
        }
    }

    #[test]
    fn delivers_when_due_and_in_stock() {
        let mut fx = Fixture::new();
        fx.accept(1, 10, 5);
        fx.inventory.add(7, 10);

        // day 5 with days_before_void 4 gives a void threshold of 3
        let schedule = fx.run(&DailyScheduler::new(4), 5);

        assert_eq!(schedule.decision_for(1), Some(Decision::Deliver));
        assert_eq!(schedule.deliveries, vec![DeliveryRequest { order_id: 1 }]);
        assert_eq!(fx.state(1), OrderState::Delivered);
        assert_eq!(fx.inventory.available(7), 0);
    }

    #[test]
    fn cancels_orders_past_the_void_threshold() {
        let mut fx = Fixture::new();
        fx.accept(1, 10, 2);
        let before = (fx.demand.outstanding(100), fx.demand.outstanding(200));

        let schedule = fx.run(&DailyScheduler::new(4), 5);

        assert_eq!(schedule.decision_for(1), Some(Decision::Cancel));
        assert_eq!(fx.state(1), OrderState::Canceled);
        assert_eq!(before, (10, 10));
        assert_eq!(fx.demand.outstanding(100), 0);
        assert_eq!(fx.demand.outstanding(200), 0);
    }

    #[test]
    fn stock_is_not_promised_twice_in_one_pass() {
        let mut fx = Fixture::new();
        fx.accept(1, 6, 20);
        fx.accept(2, 6, 20);
        fx.inventory.add(7, 8);

        let schedule = fx.run(&DailyScheduler::new(5), 10);

        assert_eq!(schedule.decision_for(1), Some(Decision::Reserve));
        // 2 free units left, 4 more needed and no components in the factory
        assert_eq!(schedule.decision_for(2), Some(Decision::Defer));
        assert_eq!(fx.inventory.reserved(7), 6);
        assert!(fx.inventory.holds_invariant());
    }

    #[test]
    fn produces_shortfall_and_reserves_existing_stock() {
        let mut fx = Fixture::new();
        fx.accept(1, 10, 20);
        fx.accept(2, 3, 20);
        fx.inventory.add(7, 4);
        fx.factory.receive_components(100, 6);
        fx.factory.receive_components(200, 6);

        let schedule = fx.run(&DailyScheduler::new(5), 10);

        assert_eq!(schedule.decision_for(1), Some(Decision::Produce { shortfall: 6 }));
        assert_eq!(
            schedule.production,
            vec![ProductionRequest {
                product_id: 7,
                quantity: 6
            }]
        );
        // the 4 units in stock now belong to order 1
        assert_eq!(fx.inventory.free(7), 0);
        assert_eq!(schedule.decision_for(2), Some(Decision::Defer));
        assert_eq!(fx.factory.component_stock(100), 0);
    }

    #[test]
    fn terminal_orders_are_not_revisited() {
        let mut fx = Fixture::new();
        fx.accept(1, 5, 6);
        fx.inventory.add(7, 20);
        let scheduler = DailyScheduler::new(5);

        let first = fx.run(&scheduler, 5);
        assert_eq!(first.decision_for(1), Some(Decision::Deliver));

        fx.inventory.begin_day(&[]);
        let second = fx.run(&scheduler, 30);
        assert!(second.decisions.is_empty());
        assert_eq!(fx.state(1), OrderState::Delivered);
        assert_eq!(fx.inventory.available(7), 15);
    }

    #[test]
    fn not_due_yet_is_reserved_not_delivered() {
        let mut fx = Fixture::new();
        fx.accept(1, 5, 12);
        fx.inventory.add(7, 5);

        let schedule = fx.run(&DailyScheduler::new(5), 10);

        assert_eq!(schedule.decision_for(1), Some(Decision::Reserve));
        assert_eq!(fx.state(1), OrderState::Pending);
    }
}
