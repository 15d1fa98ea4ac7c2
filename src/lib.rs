//! Membership management service for student organizations.
//!
//! The service tracks colleges, their academic programs and student
//! organizations, the students enrolled in those programs, and which
//! organizations each student has joined. It exposes a JSON API with a
//! uniform list/add/edit/delete flow per entity and a dashboard of
//! aggregate counts at `/`.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use studentorg::{db, App, AppContext, ConfigBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     studentorg::init_tracing_with_config(&config.logging);
//!
//!     let connection = db::connect(&config.database).await?;
//!     db::run_migrations(&connection).await?;
//!
//!     App::new(config, AppContext::new(connection)).serve().await?;
//!     Ok(())
//! }
//! ```

mod app;
mod config;
mod dashboard;
pub mod db;
pub mod entities;
mod error;
mod health;
mod listing;
pub mod migrations;
pub mod resources;
pub mod testing;
mod validation;

pub use app::{router, App, AppContext};
pub use config::{Config, ConfigBuilder, DatabaseConfig, LoggingConfig, ServerConfig};
pub use dashboard::{aggregate, DashboardStats};
pub use error::{AppError, ErrorResponse, Result};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use listing::{ListParams, Page, PAGE_SIZE};
pub use resources::{DeletePreview, DependentCount, Resource};
pub use validation::ValidatedJson;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize tracing from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    init_tracing_with_config(&LoggingConfig::default());
}

/// Initialize tracing with an explicit logging configuration.
///
/// `RUST_LOG` still wins when set, so a deployed instance can be turned up
/// to `debug` without a config change.
pub fn init_tracing_with_config(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
