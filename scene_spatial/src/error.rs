//! Error types for the spatial subsystem
//!
//! Only malformed construction input is reported as an error. Degenerate
//! geometry at query time degrades to "no hit" / "not occluded" instead.

use std::fmt;

/// Result type for spatial subsystem operations
pub type Result<T> = std::result::Result<T, Error>;

/// Spatial subsystem errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Vertex or index data rejected at construction time
    InvalidGeometry(String),

    /// Structure configuration rejected (bounds, capacities, depths)
    InvalidConfig(String),

    /// Viewport unusable as a raster target (zero or non-finite size)
    InvalidViewport(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::InvalidViewport(msg) => write!(f, "Invalid viewport: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
