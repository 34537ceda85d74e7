pub mod actor;
pub mod config;
pub mod engine;
