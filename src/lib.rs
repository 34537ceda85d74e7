//! Order-fulfillment manufacturer for a multi-day supply-chain game.
//!
//! Each simulated day the manufacturer bids on customer requests, turns
//! accepted orders into component demand, buys components from suppliers and
//! schedules production and deliveries against its inventory.

pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use engine::bid::{BidEngine, BidHistory, BidHistoryEntry, BidOutcome};
pub use engine::offer::OfferSelector;
pub use engine::procurement::{ProcurementPlanner, RfqRecord};
pub use engine::scheduler::{DailyScheduler, DaySchedule, Decision};
pub use error::{ActorError, ConfigError, LedgerError, SimulationError, TransitionError};
pub use model::demand::{BillOfMaterials, BomLine, ComponentCatalog, DemandLedger};
pub use model::inventory::{InventoryLedger, StockLevel};
pub use model::order::{Order, OrderBook, OrderState};
pub use simulation::actor::ManufacturerActor;
pub use simulation::config::SimulationConfig;
pub use simulation::engine::{DayClose, DayRecord, Manufacturer, StartInfo};
