// src/model/order.rs

use crate::error::TransitionError;
use crate::model::events::AcceptedOrder;
use crate::model::types::{Day, OrderId, ProductId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderState {
    Pending,
    Delivered,
    Canceled,
}

impl OrderState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderState::Pending)
    }
}

/// A confirmed customer order.
///
/// The state field is private: the only way out of `Pending` is through
/// `deliver` or `cancel`, and both refuse to touch a terminal order.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub due_date: Day,
    state: OrderState,
}

impl Order {
    pub fn new(id: OrderId, product_id: ProductId, quantity: u32, due_date: Day) -> Self {
        Self {
            id,
            product_id,
            quantity,
            due_date,
            state: OrderState::Pending,
        }
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == OrderState::Pending
    }

    pub fn deliver(&mut self) -> Result<(), TransitionError> {
        self.finish(OrderState::Delivered)
    }

    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        self.finish(OrderState::Canceled)
    }

    fn finish(&mut self, next: OrderState) -> Result<(), TransitionError> {
        if self.state.is_terminal() {
            return Err(TransitionError::AlreadyTerminal {
                order: self.id,
                state: self.state,
            });
        }
        self.state = next;
        Ok(())
    }
}

impl From<&AcceptedOrder> for Order {
    fn from(accepted: &AcceptedOrder) -> Self {
        Order::new(
            accepted.order_id,
            accepted.product_id,
            accepted.quantity,
            accepted.due_date,
        )
    }
}

/// All customer orders of one simulation, in arrival order.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn pending(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_pending())
    }

    pub fn pending_mut(&mut self) -> impl Iterator<Item = &mut Order> {
        self.orders.iter_mut().filter(|o| o.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn count_in(&self, state: OrderState) -> usize {
        self.orders.iter().filter(|o| o.state == state).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
