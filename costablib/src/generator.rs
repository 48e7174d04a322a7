//! Cosine table sampling and rendering.
//!
//! A table is sampled by walking an angle accumulator from 0 in fixed steps,
//! taking the cosine at each position, until the accumulator passes one full
//! revolution. The rendered array always ends with an extra `1.0` entry for
//! the closing angle, and the size constant is the loop count plus one.

use std::f64::consts::TAU;
use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::error::CostableError;
use crate::options::{GenerateOptions, SampleFormat, TableSpec};
use crate::Result;

/// Digits after the decimal point for `double` samples.
pub const SAMPLE_PRECISION: usize = 20;

/// A sampled cosine table, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Array name
    pub name: String,
    /// Angular step in radians
    pub step: f64,
    /// One cosine sample per loop iteration, excluding the trailing `1.0`
    pub samples: Vec<f64>,
}

impl Table {
    /// Sample a table. Fails on an invalid spec or when the loop would
    /// exceed `options.max_samples` iterations.
    pub fn sample(spec: &TableSpec, options: &GenerateOptions) -> Result<Self> {
        spec.validate()?;

        let mut samples = Vec::new();
        let mut angle = 0.0_f64;
        loop {
            if samples.len() >= options.max_samples {
                return Err(CostableError::TooManySamples {
                    name: spec.name.clone(),
                    step: spec.step,
                    limit: options.max_samples,
                });
            }
            samples.push(angle.cos());
            // Accumulated, not `i * step`: rounding drift is part of the output.
            angle += spec.step;
            if angle > TAU {
                break;
            }
        }

        debug!(
            name = %spec.name,
            step = spec.step,
            iterations = samples.len(),
            "sampled cosine table"
        );

        Ok(Self {
            name: spec.name.clone(),
            step: spec.step,
            samples,
        })
    }

    /// Number of sampling loop iterations.
    pub fn iterations(&self) -> usize {
        self.samples.len()
    }

    /// Value of the `<name>_size` constant: iterations plus the trailing entry.
    pub fn declared_size(&self) -> usize {
        self.iterations() + 1
    }

    /// Render the table as a C array literal and size constant.
    pub fn write_to<W: Write>(&self, sink: &mut W, format: SampleFormat) -> Result<()> {
        if let SampleFormat::Fixed { fractional_bits } = format {
            SampleFormat::fixed(fractional_bits)?;
        }
        writeln!(sink, "{} {}[] = {{", format.c_type(), self.name)?;
        match format {
            SampleFormat::Double => {
                for value in &self.samples {
                    write!(sink, "{}, ", format_sample(*value))?;
                }
                writeln!(sink, "1.0 }};")?;
            }
            SampleFormat::Fixed { fractional_bits } => {
                for value in &self.samples {
                    write!(sink, "{}, ", to_fixed(*value, fractional_bits))?;
                }
                writeln!(sink, "{} }};", 1_i32 << fractional_bits)?;
            }
        }
        writeln!(sink, "const int {}_size = {};", self.name, self.declared_size())?;
        Ok(())
    }

    /// Render the table into a string.
    pub fn render(&self, format: SampleFormat) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, format)?;
        // Output is ASCII by construction
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Format a sample with exactly [`SAMPLE_PRECISION`] digits after the point.
pub fn format_sample(value: f64) -> String {
    format!("{:.*}", SAMPLE_PRECISION, value)
}

/// Convert to Q-format: scale by `2^fractional_bits` and truncate toward zero.
///
/// The value is narrowed to `f32` first and scaled in single precision, the
/// same arithmetic as the fixed-point library's `float_to_q`.
pub fn to_fixed(value: f64, fractional_bits: u32) -> i32 {
    (value as f32 * (1_u32 << fractional_bits) as f32) as i32
}

/// Write a `double` cosine table named `name` with the given step to `sink`.
pub fn generate<W: Write>(sink: &mut W, step: f64, name: &str) -> Result<()> {
    generate_with(sink, &TableSpec::new(name, step), &GenerateOptions::default())?;
    Ok(())
}

/// Sample and render a table, returning the sampled table.
pub fn generate_with<W: Write>(
    sink: &mut W,
    spec: &TableSpec,
    options: &GenerateOptions,
) -> Result<Table> {
    let table = Table::sample(spec, options)?;
    table.write_to(sink, options.format)?;
    Ok(table)
}

/// Sample and render a table into a string.
pub fn render_to_string(spec: &TableSpec, options: &GenerateOptions) -> Result<String> {
    Table::sample(spec, options)?.render(options.format)
}
