pub mod aggregate;
pub mod cache;
pub mod calendar;
pub mod loader;
pub mod session;

pub use crate::domain::model::{Cell, Frame};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
