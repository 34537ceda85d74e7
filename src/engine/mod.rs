pub mod bid;
pub mod offer;
pub mod procurement;
pub mod scheduler;
