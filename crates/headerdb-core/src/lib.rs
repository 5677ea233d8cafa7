//! HeaderDB Core
//!
//! Core types for the HeaderDB compilation-database augmentation engine:
//! the database model, configuration, and error types.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AugmentConfig, AugmentMode, DefaultTemplatePolicy};
pub use error::{Error, Result};
pub use types::{CompileDatabase, CompileEntry};
