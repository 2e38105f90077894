//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the loader:
//! - Math types and bounding extents
//! - Logging utilities

pub mod math;
pub mod logging;
