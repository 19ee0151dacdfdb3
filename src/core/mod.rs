pub mod batch;
pub mod classifier;
pub mod distance;
pub mod pipeline;
pub mod registry;
pub mod runner;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
