//! Crate-wide error and diagnostic-constant types shared by every storage component.

pub mod constants;
pub mod error;

pub use error::{BufferPoolError, Result};
