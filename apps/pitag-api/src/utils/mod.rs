//! Handler 公共工具

pub mod response;
pub mod validation;

pub use response::*;
pub use validation::*;
