pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ScheduleConfig;

pub use adapters::storage::{InMemoryStore, JsonFileStore, StoreState};
pub use core::engine::DefenseEngine;
pub use utils::error::{DefenseError, Result};
