//! # costablib
//!
//! Precomputed cosine lookup tables, emitted as C array literals.
//!
//! ## Overview
//!
//! A table samples `cos` from 0 up to one full revolution in fixed angular
//! steps and renders the samples as a header file:
//!
//! ```text
//! double costable_1[] = {
//! 1.00000000000000000000, 0.54030230586813976501, ..., 1.0 };
//! const int costable_1_size = 8;
//! ```
//!
//! The angle is accumulated step by step, every sample is printed with 20
//! digits after the decimal point, the literal always closes with a `1.0`
//! entry, and the size constant is the number of loop iterations plus one.
//!
//! ## Features
//!
//! - **Generation**: [`generate`] writes one table to any `std::io::Write` sink
//! - **Batches**: [`generate_all`] writes a set of tables into a directory,
//!   [`check_all`] compares existing headers with a fresh generation
//! - **Fixed point**: [`SampleFormat::Fixed`] emits Q-format `int32_t` tables
//! - **Parsing**: [`parse_table`] reads a generated header back into numbers
//!
//! ## Example
//!
//! ```rust
//! use costablib::{generate, parse_table};
//!
//! let mut out = Vec::new();
//! generate(&mut out, 0.1, "costable_0_1").unwrap();
//!
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.starts_with("double costable_0_1[] = {\n1.00000000000000000000, "));
//! assert!(text.ends_with("1.0 };\nconst int costable_0_1_size = 64;\n"));
//!
//! let table = parse_table(&text).unwrap();
//! assert_eq!(table.declared_size, 64);
//! ```

pub mod batch;
pub mod error;
pub mod generator;
pub mod options;
pub mod parse;

pub use batch::{
    check_all, generate_all, BatchResult, CheckResult, GeneratedTable, TableCheck, TableStatus,
};
pub use error::CostableError;
pub use generator::{
    format_sample, generate, generate_with, render_to_string, to_fixed, Table, SAMPLE_PRECISION,
};
pub use options::{
    default_tables, GenerateOptions, SampleFormat, TableSpec, DEFAULT_FRACTIONAL_BITS,
    DEFAULT_MAX_SAMPLES, DEFAULT_OUTPUT_DIR,
};
pub use parse::{discover_tables, parse_table, read_table, ParsedTable};

/// Result type for costablib operations
pub type Result<T> = std::result::Result<T, CostableError>;
