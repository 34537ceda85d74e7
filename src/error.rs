// src/error.rs

use crate::io::market::MarketError;
use crate::model::order::OrderState;
use crate::model::types::{OrderId, ProductId};
use thiserror::Error;

/// Rejected inventory mutations. The ledger is unchanged when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient stock of product {product}: requested {requested}, free {free}")]
    InsufficientStock {
        product: ProductId,
        requested: u32,
        free: u32,
    },

    #[error("reservation of product {product} would exceed stock: reserved {reserved}, available {available}")]
    ReservationOverflow {
        product: ProductId,
        reserved: u32,
        available: u32,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("order {order} is already {state:?}")]
    AlreadyTerminal { order: OrderId, state: OrderState },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("total_days must be positive")]
    NoDays,

    #[error("lead_time {lead_time} does not fit in a game of {total_days} days")]
    LeadTimeTooLong { lead_time: u32, total_days: u32 },

    #[error("price_discount_factor must lie in [0, 1], got {0}")]
    DiscountOutOfRange(f64),

    #[error("supplier_price_tolerance must be at least 1.0, got {0}")]
    ToleranceBelowOne(f64),

    #[error("days_before_void must be at least 2, got {0}")]
    VoidWindowTooShort(u32),
}

#[derive(Error, Debug)]
pub enum ActorError {
    #[error("manufacturer mailbox is closed")]
    MailboxClosed,

    #[error("manufacturer dropped the reply for day {0}")]
    ReplyDropped(i32),

    #[error("manufacturer task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Actor(#[from] ActorError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("report export failed: {0}")]
    Report(#[from] csv::Error),
}
