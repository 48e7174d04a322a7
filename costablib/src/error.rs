//! Error types for costablib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generating or reading cosine tables
#[derive(Error, Debug)]
pub enum CostableError {
    /// Step size is zero, negative, or not finite
    #[error("invalid step size {step}: must be a finite value greater than zero")]
    InvalidStep { step: f64 },

    /// Table name is not usable as a C identifier
    #[error("invalid table name '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidName(String),

    /// Fixed-point format with an unsupported number of fractional bits
    #[error("invalid fractional bits {0}: must be between 1 and 30")]
    InvalidFractionalBits(u32),

    /// The sampling loop would exceed the configured sample limit
    #[error("table '{name}' would need more than {limit} samples at step {step}")]
    TooManySamples {
        name: String,
        step: f64,
        limit: usize,
    },

    /// Malformed `name=step` table specification
    #[error("invalid table spec '{spec}': {message}")]
    InvalidTableSpec { spec: String, message: String },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Failed to write a generated table
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a table file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Generated header could not be parsed back
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
