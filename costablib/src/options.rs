//! Input options for table generation.
//!
//! This module contains the configuration types that control which tables
//! are generated and how their samples are rendered.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CostableError;
use crate::Result;

/// Default output directory, relative to the invocation directory.
pub const DEFAULT_OUTPUT_DIR: &str = "lib/table";

/// Default upper bound on samples per table.
pub const DEFAULT_MAX_SAMPLES: usize = 10_000_000;

/// Default Q-format precision, matching the fixed-point library's Q16 build.
pub const DEFAULT_FRACTIONAL_BITS: u32 = 16;

/// How samples are rendered into the array literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleFormat {
    /// `double` entries with 20 digits after the decimal point
    #[default]
    Double,
    /// `int32_t` Q-format entries, `value * 2^fractional_bits` truncated toward zero
    Fixed { fractional_bits: u32 },
}

impl SampleFormat {
    /// Fixed-point format with the given number of fractional bits.
    pub fn fixed(fractional_bits: u32) -> Result<Self> {
        if !(1..=30).contains(&fractional_bits) {
            return Err(CostableError::InvalidFractionalBits(fractional_bits));
        }
        Ok(SampleFormat::Fixed { fractional_bits })
    }

    /// C element type used for the array declaration
    pub fn c_type(&self) -> &'static str {
        match self {
            SampleFormat::Double => "double",
            SampleFormat::Fixed { .. } => "int32_t",
        }
    }
}

impl FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "double" => Ok(SampleFormat::Double),
            "fixed" => Ok(SampleFormat::Fixed {
                fractional_bits: DEFAULT_FRACTIONAL_BITS,
            }),
            _ => Err(format!("Unknown sample format: {}", s)),
        }
    }
}

/// One table to generate: its identifier and angular step in radians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Array name; the size constant is `<name>_size`
    pub name: String,
    /// Angular increment between samples, in radians
    pub step: f64,
}

impl TableSpec {
    /// Create a new table spec. Validation happens at generation time.
    pub fn new(name: impl Into<String>, step: f64) -> Self {
        Self {
            name: name.into(),
            step,
        }
    }

    /// Parse a `name=step` pair, as accepted on the command line.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |message: &str| CostableError::InvalidTableSpec {
            spec: spec.to_string(),
            message: message.to_string(),
        };

        let (name, step) = spec
            .split_once('=')
            .ok_or_else(|| invalid("expected 'name=step'"))?;
        let step: f64 = step
            .trim()
            .parse()
            .map_err(|_| invalid("step is not a number"))?;

        let table = Self::new(name.trim(), step);
        table.validate()?;
        Ok(table)
    }

    /// Check that the name is a C identifier and the step can terminate.
    pub fn validate(&self) -> Result<()> {
        if !is_c_identifier(&self.name) {
            return Err(CostableError::InvalidName(self.name.clone()));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(CostableError::InvalidStep { step: self.step });
        }
        Ok(())
    }

    /// File name of the generated header (`<name>.h`)
    pub fn file_name(&self) -> String {
        format!("{}.h", self.name)
    }
}

pub(crate) fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The five tables shipped with the fixed-point library.
pub fn default_tables() -> Vec<TableSpec> {
    vec![
        TableSpec::new("costable_1", 1.0),
        TableSpec::new("costable_0_1", 0.1),
        TableSpec::new("costable_0_01", 0.01),
        TableSpec::new("costable_0_001", 0.001),
        TableSpec::new("costable_0_0001", 0.0001),
    ]
}

/// Options controlling how each table is sampled and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Rendering of the samples
    pub format: SampleFormat,
    /// Abort a table once its sampling loop exceeds this many iterations
    pub max_samples: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            format: SampleFormat::Double,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl GenerateOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sample format.
    pub fn format(mut self, format: SampleFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the per-table sample limit.
    pub fn max_samples(mut self, limit: usize) -> Self {
        self.max_samples = limit;
        self
    }
}
