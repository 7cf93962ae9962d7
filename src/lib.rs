pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use app::{Dashboard, ExportFormat, ExportTarget};
pub use config::DashboardConfig;
pub use core::calendar::PeriodKind;
pub use core::session::{Dataset, PathStore, Session};
pub use utils::error::{DashboardError, Result};
