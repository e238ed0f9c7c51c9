//! OKR reporting engine: turns key result rows into objective progress,
//! department performance, employee utilization and confidence metrics.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod query;
pub mod report;
pub mod source;

pub use config::{DashboardConfig, Selection};
pub use dashboard::{build_dashboard, Dashboard};
pub use error::{OkrError, Result, SchemaError};
pub use models::Record;
