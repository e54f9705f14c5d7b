// Budget Stats - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod import;
pub mod repository;
pub mod service;
pub mod stats;
pub mod telemetry;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use config::{Config, LogFormat};
pub use db::{setup_database, SqliteRepository};
pub use entities::{
    Author, AuthorRecord, AuthorRecordResponse, AuthorSummary,
    BudgetEntry, BudgetItem, BudgetRecord, BudgetType,
};
pub use error::{Error, Result};
pub use import::load_csv;
pub use repository::{BudgetRepository, MemoryRepository};
pub use service::BudgetService;
pub use stats::{StatsQuery, StatsSnapshot, YearStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
