//! Chatlens - engagement metrics for local chat history
//!
//! This library provides the core functionality behind the `chatlens` CLI:
//! the chat session model, the metrics aggregation routines, the
//! recompute-on-change binding, SQLite history storage and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat messages, sessions and immutable snapshots
//! - `metrics`: Aggregation routines, the calculator and the binding
//! - `storage`: SQLite-backed session history with JSON import/export
//! - `presets`: Preset conversation starters
//! - `markdown`: Terminal rendering of message content
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatlens::{Config, Snapshot};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let binding = config.binding()?;
//!     binding.update(Snapshot::new(Vec::new()));
//!     if let Some(metrics) = binding.wait_ready().await {
//!         println!("{} messages", metrics.total_messages);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod markdown;
pub mod metrics;
pub mod presets;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{ChatlensError, Result};
pub use metrics::{Metrics, MetricsBinding, MetricsCalculator, MetricsState, ReportZone};
pub use session::{ChatMessage, ChatSession, Role, Snapshot};
pub use storage::SqliteStorage;
