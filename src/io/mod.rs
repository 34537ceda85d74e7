pub mod market;
pub mod reporting;
