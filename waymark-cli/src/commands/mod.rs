//! Command implementations.

pub mod config;
pub mod markers;
pub mod replay;
pub mod tracking;
