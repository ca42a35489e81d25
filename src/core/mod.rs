//! Core types and traits for model selection

pub mod dataset;
pub mod error;
pub mod traits;
pub mod types;

pub use self::dataset::*;
pub use self::error::*;
pub use self::traits::*;
pub use self::types::*;
