//! API v1 Module
//!
//! Re-exports the current upload commands as the v1 surface.

pub use super::commands::*;
