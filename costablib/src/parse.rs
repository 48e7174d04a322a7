//! Reading generated tables back.
//!
//! Parses the array literal and size constant emitted by the generator so
//! existing headers can be inspected and round-trip checked.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use serde::Serialize;

use crate::error::CostableError;
use crate::options::is_c_identifier;
use crate::Result;

/// A table header parsed back into numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTable {
    /// Element type of the array (`double`, `int32_t`, ...)
    pub element_type: String,
    /// Array name
    pub name: String,
    /// Every entry of the array literal, including the trailing one
    pub entries: Vec<f64>,
    /// Value of the `<name>_size` constant
    pub declared_size: usize,
}

impl ParsedTable {
    /// Number of entries actually present in the literal.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the size constant agrees with the literal.
    pub fn size_matches(&self) -> bool {
        self.declared_size == self.entries.len()
    }

    /// Entries produced by the sampling loop (all but the trailing entry).
    pub fn samples(&self) -> &[f64] {
        match self.entries.split_last() {
            Some((_, samples)) => samples,
            None => &[],
        }
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> CostableError {
    CostableError::Parse {
        line,
        message: message.into(),
    }
}

/// Parse the declaration line `<type> <name>[] = {`.
fn parse_declaration(line_no: usize, line: &str) -> Result<(String, String)> {
    let decl = line
        .trim()
        .strip_suffix('{')
        .map(str::trim_end)
        .and_then(|s| s.strip_suffix('='))
        .map(str::trim_end)
        .and_then(|s| s.strip_suffix("[]"))
        .ok_or_else(|| parse_error(line_no, "expected '<type> <name>[] = {'"))?;

    let (element_type, name) = decl
        .trim()
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| parse_error(line_no, "missing element type"))?;

    if !is_c_identifier(name) {
        return Err(parse_error(
            line_no,
            format!("array name '{}' is not a C identifier", name),
        ));
    }

    Ok((element_type.trim().to_string(), name.to_string()))
}

/// Parse a complete generated header.
pub fn parse_table(text: &str) -> Result<ParsedTable> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty());

    let (decl_line, decl) = lines
        .next()
        .ok_or_else(|| parse_error(0, "empty input"))?;
    let (element_type, name) = parse_declaration(decl_line, decl)?;

    // Entries may be split over several lines; collect until the closing brace
    let mut entries = Vec::new();
    let mut closed = false;
    let mut last_line = decl_line;
    for (line_no, line) in lines.by_ref() {
        last_line = line_no;
        let (body, rest) = match line.split_once("};") {
            Some((body, rest)) => (body, Some(rest)),
            None => (line, None),
        };
        for token in body.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let value: f64 = token
                .parse()
                .map_err(|_| parse_error(line_no, format!("invalid entry '{}'", token)))?;
            entries.push(value);
        }
        if let Some(rest) = rest {
            if !rest.trim().is_empty() {
                return Err(parse_error(line_no, "unexpected text after '};'"));
            }
            closed = true;
            break;
        }
    }
    if !closed {
        return Err(parse_error(last_line, "array literal is not closed"));
    }

    let (size_line, size) = lines
        .next()
        .ok_or_else(|| parse_error(last_line, "missing size constant"))?;
    let prefix = format!("const int {}_size =", name);
    let declared_size = size
        .trim()
        .strip_prefix(&prefix)
        .and_then(|s| s.trim().strip_suffix(';'))
        .ok_or_else(|| parse_error(size_line, format!("expected '{} <n>;'", prefix)))?
        .trim()
        .parse()
        .map_err(|_| parse_error(size_line, "size is not an integer"))?;

    if let Some((line_no, _)) = lines.next() {
        return Err(parse_error(line_no, "unexpected trailing content"));
    }

    Ok(ParsedTable {
        element_type,
        name,
        entries,
        declared_size,
    })
}

/// Read and parse a header file.
pub fn read_table(path: impl AsRef<Path>) -> Result<ParsedTable> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CostableError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&text)
}

/// Resolve inputs to header files: directories expand to their `*.h` files,
/// anything else is treated as a glob pattern. Results are sorted.
pub fn discover_tables(inputs: &[impl AsRef<str>]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        let pattern = if Path::new(input).is_dir() {
            format!("{}/*.h", input.trim_end_matches('/'))
        } else {
            input.to_string()
        };

        let matches = glob(&pattern).map_err(|e| CostableError::InvalidGlob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        let before = paths.len();
        for entry in matches.flatten() {
            if entry.is_file() {
                paths.push(entry);
            }
        }
        if paths.len() == before && !Path::new(input).is_dir() {
            return Err(CostableError::FileRead {
                path: PathBuf::from(input),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no matching files"),
            });
        }
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, render_to_string};
    use crate::options::{GenerateOptions, SampleFormat, TableSpec};
    use tempfile::tempdir;

    fn generated(step: f64, name: &str) -> String {
        let mut buf = Vec::new();
        generate(&mut buf, step, name).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_parse_generated_table() {
        let table = parse_table(&generated(1.0, "costable_1")).unwrap();

        assert_eq!(table.element_type, "double");
        assert_eq!(table.name, "costable_1");
        assert_eq!(table.declared_size, 8);
        assert_eq!(table.entry_count(), 8);
        assert!(table.size_matches());
        assert_eq!(table.entries[0], 1.0);
        assert_eq!(*table.entries.last().unwrap(), 1.0);
    }

    #[test]
    fn test_round_trip_matches_cosine() {
        let step = 0.1;
        let table = parse_table(&generated(step, "costable_0_1")).unwrap();
        assert_eq!(table.samples().len(), 63);

        for (i, value) in table.samples().iter().enumerate() {
            let expected = (i as f64 * step).cos();
            assert!(
                (value - expected).abs() < 1e-13,
                "entry {i}: {value} vs {expected}"
            );
        }
    }

    #[test]
    fn test_parse_fixed_table() {
        let options = GenerateOptions::new().format(SampleFormat::Fixed { fractional_bits: 8 });
        let text = render_to_string(&TableSpec::new("q", 0.5), &options).unwrap();
        let table = parse_table(&text).unwrap();

        assert_eq!(table.element_type, "int32_t");
        assert_eq!(table.entries[0], 256.0);
        assert_eq!(*table.entries.last().unwrap(), 256.0);
        assert!(table.size_matches());
    }

    #[test]
    fn test_parse_multiline_entries() {
        let text = "double t[] = {\n1.0, 0.5,\n-0.5,\n1.0 };\nconst int t_size = 4;\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.entries, vec![1.0, 0.5, -0.5, 1.0]);
        assert_eq!(table.samples(), &[1.0, 0.5, -0.5]);
    }

    #[test]
    fn test_parse_reports_size_mismatch() {
        let text = "double t[] = {\n1.0, 1.0 };\nconst int t_size = 3;\n";
        let table = parse_table(text).unwrap();
        assert_eq!(table.declared_size, 3);
        assert!(!table.size_matches());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_table(""), Err(CostableError::Parse { .. })));
        assert!(matches!(
            parse_table("int x = 3;\n"),
            Err(CostableError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_table("double t[] = {\n1.0, abc, 1.0 };\nconst int t_size = 3;\n"),
            Err(CostableError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_table("double t[] = {\n1.0, 1.0\n"),
            Err(CostableError::Parse { .. })
        ));
        assert!(matches!(
            parse_table("double t[] = {\n1.0 };\nconst int other_size = 1;\n"),
            Err(CostableError::Parse { line: 3, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_non_identifier_name() {
        let name = "xxxxxñbbbbbbbbbbbbbbb";
        let text = format!("double {name}[] = {{\n1.0 }};\nconst int {name}_size = 1;\n");
        assert!(matches!(
            parse_table(&text),
            Err(CostableError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_table("double 9t[] = {\n1.0 };\nconst int 9t_size = 1;\n"),
            Err(CostableError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_read_table_missing_file() {
        let dir = tempdir().unwrap();
        let result = read_table(dir.path().join("nope.h"));
        assert!(matches!(result, Err(CostableError::FileRead { .. })));
    }

    #[test]
    fn test_discover_tables() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.h"), generated(1.0, "b")).unwrap();
        std::fs::write(dir.path().join("a.h"), generated(1.0, "a")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let dir_str = dir.path().to_string_lossy().to_string();
        let found = discover_tables(&[dir_str.as_str()]).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.h", "b.h"]);

        let pattern = format!("{}/a*", dir_str);
        assert_eq!(discover_tables(&[pattern]).unwrap().len(), 1);

        let missing = format!("{}/zzz*.h", dir_str);
        assert!(discover_tables(&[missing]).is_err());
    }
}
