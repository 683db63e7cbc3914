//! Common Utilities and Types Library
//! 
//! This crate provides shared identifiers and bit helpers used across the
//! frequency reuse workspace.

pub mod types;
pub mod utils;

// Re-export commonly used items
pub use types::*;
pub use utils::*;
