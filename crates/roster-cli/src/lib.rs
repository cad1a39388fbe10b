//! CLI library components for the roster dashboard.

pub mod logging;
pub mod render;
