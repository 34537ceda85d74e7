// src/model/types.rs

/// Sellable products and components share one id space, as in the BOM.
pub type ProductId = u32;
pub type OrderId = u64;
pub type RequestId = u64;
pub type RfqId = u64;

/// Simulated day number. Signed because the void threshold can go below zero
/// early in the game.
pub type Day = i32;

/// Price per unit, in whole currency units.
pub type Price = u32;

pub type SupplierAddress = String;
