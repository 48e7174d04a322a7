//! Generating and checking a set of tables in an output directory.
//!
//! Each table is written to `<dir>/<name>.h`. Tables are independent; the
//! first failure aborts the batch.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::CostableError;
use crate::generator::{render_to_string, Table};
use crate::options::{GenerateOptions, SampleFormat, TableSpec};
use crate::Result;

/// Summary of one written table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedTable {
    /// Array name
    pub name: String,
    /// Angular step in radians
    pub step: f64,
    /// Path of the written header
    pub path: PathBuf,
    /// Value of the size constant
    pub declared_size: usize,
    /// Size of the header in bytes
    pub bytes: u64,
}

/// Result of generating a set of tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    /// Output directory
    pub dir: PathBuf,
    /// One entry per table, in input order
    pub tables: Vec<GeneratedTable>,
}

impl BatchResult {
    /// Total bytes written across all tables.
    pub fn total_bytes(&self) -> u64 {
        self.tables.iter().map(|t| t.bytes).sum()
    }
}

/// Generate every table in `specs` into `dir`, creating it if needed.
///
/// # Example
///
/// ```rust,ignore
/// use costablib::{default_tables, generate_all, GenerateOptions};
///
/// let result = generate_all("lib/table", &default_tables(), &GenerateOptions::new())?;
/// assert_eq!(result.tables.len(), 5);
/// ```
pub fn generate_all(
    dir: impl AsRef<Path>,
    specs: &[TableSpec],
    options: &GenerateOptions,
) -> Result<BatchResult> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| CostableError::FileWrite {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut result = BatchResult {
        dir: dir.to_path_buf(),
        tables: Vec::with_capacity(specs.len()),
    };

    for spec in specs {
        let path = dir.join(spec.file_name());
        let table = write_table(&path, spec, options)?;
        let bytes = fs::metadata(&path)
            .map_err(|source| CostableError::FileRead {
                path: path.clone(),
                source,
            })?
            .len();

        info!(name = %spec.name, path = %path.display(), bytes, "wrote table");
        result.tables.push(GeneratedTable {
            name: spec.name.clone(),
            step: spec.step,
            path,
            declared_size: table.declared_size(),
            bytes,
        });
    }

    Ok(result)
}

fn write_table(path: &Path, spec: &TableSpec, options: &GenerateOptions) -> Result<Table> {
    // Sample and check the format before creating the file, so failures leave nothing behind
    let table = Table::sample(spec, options)?;
    if let SampleFormat::Fixed { fractional_bits } = options.format {
        SampleFormat::fixed(fractional_bits)?;
    }

    let wrap = |source: std::io::Error| CostableError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    let mut sink = BufWriter::new(file);
    table
        .write_to(&mut sink, options.format)
        .map_err(|e| match e {
            CostableError::Io(source) => wrap(source),
            other => other,
        })?;
    sink.flush().map_err(wrap)?;
    Ok(table)
}

/// State of a table file relative to what would be generated now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// File content is byte-identical to a fresh generation
    UpToDate,
    /// File exists but differs
    Stale,
    /// File does not exist
    Missing,
}

/// Check outcome for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCheck {
    /// Array name
    pub name: String,
    /// Path that was compared
    pub path: PathBuf,
    /// Comparison outcome
    pub status: TableStatus,
}

/// Result of checking a set of tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    /// Directory that was checked
    pub dir: PathBuf,
    /// One entry per table, in input order
    pub tables: Vec<TableCheck>,
}

impl CheckResult {
    /// True when every table is up to date.
    pub fn is_clean(&self) -> bool {
        self.tables
            .iter()
            .all(|t| t.status == TableStatus::UpToDate)
    }
}

/// Regenerate every table in memory and compare with the files in `dir`.
pub fn check_all(
    dir: impl AsRef<Path>,
    specs: &[TableSpec],
    options: &GenerateOptions,
) -> Result<CheckResult> {
    let dir = dir.as_ref();
    let mut result = CheckResult {
        dir: dir.to_path_buf(),
        tables: Vec::with_capacity(specs.len()),
    };

    for spec in specs {
        let expected = render_to_string(spec, options)?;
        let path = dir.join(spec.file_name());

        let status = match fs::read(&path) {
            Ok(actual) if actual == expected.as_bytes() => TableStatus::UpToDate,
            Ok(_) => TableStatus::Stale,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => TableStatus::Missing,
            Err(source) => return Err(CostableError::FileRead { path, source }),
        };
        if status != TableStatus::UpToDate {
            warn!(name = %spec.name, path = %path.display(), ?status, "table out of date");
        }

        result.tables.push(TableCheck {
            name: spec.name.clone(),
            path,
            status,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::default_tables;
    use crate::parse::read_table;
    use tempfile::tempdir;

    #[test]
    fn test_generate_default_tables() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("lib/table");

        let result = generate_all(&out, &default_tables(), &GenerateOptions::new()).unwrap();

        assert_eq!(result.tables.len(), 5);
        let sizes: Vec<usize> = result.tables.iter().map(|t| t.declared_size).collect();
        assert_eq!(sizes, vec![8, 64, 630, 6285, 62833]);

        for table in &result.tables {
            assert_eq!(table.path, out.join(format!("{}.h", table.name)));
            let parsed = read_table(&table.path).unwrap();
            assert_eq!(parsed.name, table.name);
            assert_eq!(parsed.declared_size, table.declared_size);
            assert_eq!(fs::metadata(&table.path).unwrap().len(), table.bytes);
        }
        assert!(result.total_bytes() > 0);
    }

    #[test]
    fn test_generate_is_idempotent() {
        let dir = tempdir().unwrap();
        let specs = vec![TableSpec::new("costable_0_01", 0.01)];

        generate_all(dir.path().join("a"), &specs, &GenerateOptions::new()).unwrap();
        generate_all(dir.path().join("b"), &specs, &GenerateOptions::new()).unwrap();

        let a = fs::read(dir.path().join("a/costable_0_01.h")).unwrap();
        let b = fs::read(dir.path().join("b/costable_0_01.h")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_rejects_bad_spec_without_writing() {
        let dir = tempdir().unwrap();
        let specs = vec![TableSpec::new("ok", 1.0), TableSpec::new("bad", 0.0)];

        let result = generate_all(dir.path(), &specs, &GenerateOptions::new());
        assert!(matches!(result, Err(CostableError::InvalidStep { .. })));
        assert!(dir.path().join("ok.h").exists());
        assert!(!dir.path().join("bad.h").exists());
    }

    #[test]
    fn test_generate_into_file_path_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let result = generate_all(&blocker, &default_tables(), &GenerateOptions::new());
        assert!(matches!(result, Err(CostableError::FileWrite { .. })));
    }

    #[test]
    fn test_check_all() {
        let dir = tempdir().unwrap();
        let specs = vec![
            TableSpec::new("fresh", 1.0),
            TableSpec::new("stale", 0.5),
            TableSpec::new("missing", 0.25),
        ];
        let options = GenerateOptions::new();

        generate_all(dir.path(), &specs[..2], &options).unwrap();
        fs::write(dir.path().join("stale.h"), "double stale[] = {\n1.0 };\n").unwrap();

        let result = check_all(dir.path(), &specs, &options).unwrap();
        let statuses: Vec<TableStatus> = result.tables.iter().map(|t| t.status).collect();
        assert_eq!(
            statuses,
            vec![TableStatus::UpToDate, TableStatus::Stale, TableStatus::Missing]
        );
        assert!(!result.is_clean());

        generate_all(dir.path(), &specs, &options).unwrap();
        assert!(check_all(dir.path(), &specs, &options).unwrap().is_clean());
    }

    #[test]
    fn test_check_detects_format_change() {
        let dir = tempdir().unwrap();
        let specs = vec![TableSpec::new("q", 0.5)];

        generate_all(dir.path(), &specs, &GenerateOptions::new()).unwrap();
        let fixed = GenerateOptions::new().format(SampleFormat::Fixed { fractional_bits: 16 });
        let result = check_all(dir.path(), &specs, &fixed).unwrap();
        assert_eq!(result.tables[0].status, TableStatus::Stale);
    }
}
