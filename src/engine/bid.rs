// src/engine/bid.rs

use crate::model::events::{AcceptedOrder, CustomerOffer, CustomerRequest};
use crate::model::types::{Day, Price, ProductId, RequestId};
use crate::simulation::config::SimulationConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidOutcome {
    Success,
    /// The order did not match the request exactly; no signal.
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BidHistoryEntry {
    pub request_id: RequestId,
    pub product_id: ProductId,
    /// Offered price divided by the customer's reserve price.
    pub price_ratio: f64,
    pub outcome: BidOutcome,
}

#[derive(Debug, Default)]
pub struct BidHistory {
    entries: Vec<BidHistoryEntry>,
}

impl BidHistory {
    pub fn record(&mut self, entry: BidHistoryEntry) {
        self.entries.push(entry);
    }

    /// Mean price ratio of the successful bids on `product`, if any.
    pub fn average_success_ratio(&self, product: ProductId) -> Option<f64> {
        let (sum, count) = self
            .entries
            .iter()
            .filter(|e| e.product_id == product && e.outcome == BidOutcome::Success)
            .fold((0.0, 0u32), |(sum, count), e| (sum + e.price_ratio, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / f64::from(count))
        }
    }

    pub fn entries(&self) -> &[BidHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An offer we made and have not heard back about yet.
#[derive(Debug, Clone, Copy)]
struct PendingBid {
    product_id: ProductId,
    quantity: u32,
    price_ratio: f64,
    due_date: Day,
}

/// Answers customer requests and learns which price ratios win orders.
#[derive(Debug)]
pub struct BidEngine {
    lead_time: Day,
    last_biddable_due_date: Day,
    exploration_cutoff: Day,
    discount_factor: f64,
    rng: StdRng,
    pending: HashMap<RequestId, PendingBid>,
    history: BidHistory,
}

impl BidEngine {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            lead_time: config.lead_time as Day,
            last_biddable_due_date: config.last_biddable_due_date(),
            exploration_cutoff: config.exploration_cutoff,
            discount_factor: config.price_discount_factor,
            rng: StdRng::seed_from_u64(config.rng_seed),
            pending: HashMap::new(),
            history: BidHistory::default(),
        }
    }

    /// True when we can still produce and deliver in time, and the due date
    /// is not past the end of the game.
    pub fn is_eligible(&self, request: &CustomerRequest, current_day: Day) -> bool {
        request.due_date - current_day >= self.lead_time
            && request.due_date <= self.last_biddable_due_date
    }

    pub fn handle_requests(
        &mut self,
        current_day: Day,
        requests: &[CustomerRequest],
    ) -> Vec<CustomerOffer> {
        self.pending.retain(|_, bid| bid.due_date >= current_day);

        let mut offers = Vec::new();
        for request in requests {
            if !self.is_eligible(request, current_day) {
                continue;
            }

            let ratio = self.price_ratio(request.product_id, current_day);
            let offered_price = (f64::from(request.reserve_price_per_unit) * ratio) as Price;
            self.pending.insert(
                request.request_id,
                PendingBid {
                    product_id: request.product_id,
                    quantity: request.quantity,
                    price_ratio: ratio,
                    due_date: request.due_date,
                },
            );
            debug!(
                request = request.request_id,
                product = request.product_id,
                reserve = request.reserve_price_per_unit,
                offered_price,
                "customer offer"
            );
            offers.push(CustomerOffer {
                request_id: request.request_id,
                offered_price,
            });
        }
        offers
    }

    /// Scores the bids these orders answer. Only an order for exactly the
    /// requested quantity counts as a success.
    pub fn record_orders(&mut self, orders: &[AcceptedOrder]) {
        for order in orders {
            let Some(request_id) = order.request_id else {
                continue;
            };
            let Some(bid) = self.pending.remove(&request_id) else {
                continue;
            };
            let outcome = if order.quantity == bid.quantity {
                BidOutcome::Success
            } else {
                BidOutcome::Unknown
            };
            self.history.record(BidHistoryEntry {
                request_id,
                product_id: bid.product_id,
                price_ratio: bid.price_ratio,
                outcome,
            });
        }
    }

    pub fn history(&self) -> &BidHistory {
        &self.history
    }

    fn price_ratio(&mut self, product: ProductId, current_day: Day) -> f64 {
        if current_day >= self.exploration_cutoff {
            if let Some(ratio) = self.history.average_success_ratio(product) {
                return ratio;
            }
        }
        1.0 - self.rng.gen::<f64>() * self.discount_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            total_days: 50,
            lead_time: 6,
            pipeline_tail_margin: 2,
            exploration_cutoff: 20,
            ..Default::default()
        }
    }

    fn request(id: RequestId, quantity: u32, due_date: Day) -> CustomerRequest {
        CustomerRequest {
            request_id: id,
            product_id: 7,
            quantity,
            reserve_price_per_unit: 1000,
            due_date,
        }
    }

    fn accepted(request_id: RequestId, quantity: u32) -> AcceptedOrder {
        AcceptedOrder {
            order_id: request_id + 100,
            request_id: Some(request_id),
            product_id: 7,
            quantity,
            due_date: 30,
        }
    }

    #[test]
    fn lead_time_boundary() {
        let engine = BidEngine::new(&config());
        assert!(!engine.is_eligible(&request(1, 1, 15), 10));
        assert!(engine.is_eligible(&request(1, 1, 16), 10));
    }

    #[test]
    fn no_bids_past_the_last_biddable_due_date() {
        let mut engine = BidEngine::new(&config());
        let offers = engine.handle_requests(30, &[request(1, 1, 48), request(2, 1, 49)]);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].request_id, 1);
    }

    #[test]
    fn exploration_discounts_at_most_the_factor() {
        let mut engine = BidEngine::new(&config());
        let requests: Vec<_> = (0..50).map(|i| request(i, 5, 30)).collect();
        for offer in engine.handle_requests(10, &requests) {
            assert!(offer.offered_price <= 1000);
            assert!(offer.offered_price >= 800);
        }
    }

    #[test]
    fn exact_quantity_orders_become_successes() {
        let mut engine = BidEngine::new(&config());
        engine.handle_requests(10, &[request(1, 5, 30), request(2, 5, 30)]);

        engine.record_orders(&[accepted(1, 5), accepted(2, 3)]);

        let entries = engine.history().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, BidOutcome::Success);
        assert_eq!(entries[1].outcome, BidOutcome::Unknown);
        assert!(engine.history().average_success_ratio(7).is_some());
        assert!(engine.history().average_success_ratio(8).is_none());
    }

    #[test]
    fn exploitation_reuses_the_winning_ratio() {
        let mut engine = BidEngine::new(&config());
        let first = engine.handle_requests(10, &[request(1, 5, 30)]);
        engine.record_orders(&[accepted(1, 5)]);

        let second = engine.handle_requests(20, &[request(2, 5, 30)]);
        assert_eq!(second[0].offered_price, first[0].offered_price);
    }

    #[test]
    fn exploitation_without_history_falls_back_to_exploration() {
        let mut engine = BidEngine::new(&config());
        let offers = engine.handle_requests(25, &[request(1, 5, 40)]);
        assert_eq!(offers.len(), 1);
        assert!(offers[0].offered_price <= 1000);
        assert!(engine.history().is_empty());
    }
}
