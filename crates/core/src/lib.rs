#![forbid(unsafe_code)]

pub mod catalog;
#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;
pub mod model;
pub mod navigation;
pub mod quiz;
pub mod time;
pub mod unlock;

pub use catalog::{Catalog, CatalogError};
pub use time::Clock;
