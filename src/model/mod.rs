pub mod demand;
pub mod events;
pub mod inventory;
pub mod order;
pub mod types;
