//! Off-chain mirror of farm events ("subgraph").
//!
//! `logs` decodes events out of transaction logs, `handlers` replays them
//! into an `EntityStore`.

pub mod entities;
pub mod handlers;
pub mod logs;
pub mod store;

pub use entities::{PoolEntity, StakerEntity};
pub use handlers::Indexer;
pub use logs::{parse_logs, FarmEvent};
pub use store::{EntityStore, JsonFileStore, MemoryStore};
