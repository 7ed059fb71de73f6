pub mod config;
pub mod error;
pub mod pipeline;

pub mod postgres;

pub use config::Config;
pub use error::{ConversionError, Error, Result};
pub use pipeline::{Pipeline, PipelineStats};
