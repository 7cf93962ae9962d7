// Application layer: dashboard views, text rendering and export.

pub mod dashboard;
pub mod export;
pub mod render;

pub use dashboard::{Dashboard, ExportTarget, ReportSettings};
pub use export::ExportFormat;
