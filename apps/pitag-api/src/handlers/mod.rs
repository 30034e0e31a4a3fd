//! Handlers 模块

pub mod health;
pub mod metrics;
pub mod reports;
pub mod tags;

pub use health::*;
pub use metrics::*;
pub use reports::*;
pub use tags::*;
