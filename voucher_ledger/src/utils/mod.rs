//! Utility and helper functions needed for:
//! - Fixed point decimal arithmetic
//! - Error handling
//! - Type casting

pub mod common;
pub mod decimal;
pub mod error;
