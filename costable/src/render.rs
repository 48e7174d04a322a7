//! Template rendering for CLI output using outstanding

use std::path::{Path, PathBuf};

use console::Style;
use costablib::{BatchResult, CheckResult, ParsedTable, TableStatus};
use outstanding::{render_auto, render_with_output, Theme};
use serde::Serialize;

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// Include template at compile time
const REPORT_TEMPLATE: &str = include_str!("../templates/report.jinja");

const NAME_WIDTH: usize = 20;
const CELL_WIDTH: usize = 12;

/// Map the `--output` value to an outstanding output mode
pub fn output_mode_from_arg(value: Option<&str>) -> OutputMode {
    match value {
        Some("json") => OutputMode::Json,
        Some("text") => OutputMode::Text,
        Some("term-debug") => OutputMode::TermDebug,
        Some("term") => OutputMode::Term,
        _ => OutputMode::Auto,
    }
}

/// Data context shared by all table templates
#[derive(Debug, Serialize)]
struct ReportContext {
    /// Title line above the table
    title: String,
    /// Pre-padded column headers
    header: String,
    /// Separator line (dashes)
    separator: String,
    /// Pre-padded data rows
    rows: Vec<String>,
    /// Summary line below the table
    footer: String,
}

/// Create the theme with styles
fn create_theme() -> Theme {
    Theme::new().add("header", Style::new().bold())
}

/// Pad a name column, adding a ".." prefix when it is too long
fn name_cell(name: &str) -> String {
    let max_len = NAME_WIDTH - 2;
    let len = name.chars().count();
    let name = if len > max_len {
        // Keep the last `max_len - 2` chars, cut on a char boundary
        let start = name
            .char_indices()
            .nth(len - max_len + 2)
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("..{}", &name[start..])
    } else {
        name.to_string()
    };
    format!("{:<width$}", name, width = NAME_WIDTH)
}

fn row(name: &str, cells: &[String]) -> String {
    let mut line = name_cell(name);
    for cell in cells {
        line.push_str(&format!(" {:>width$}", cell, width = CELL_WIDTH));
    }
    line.trim_end().to_string()
}

fn build_context(
    title: String,
    columns: &[&str],
    rows: Vec<String>,
    footer: String,
) -> ReportContext {
    let cells: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    ReportContext {
        title,
        header: row("Table", &cells),
        separator: "-".repeat(NAME_WIDTH + (CELL_WIDTH + 1) * columns.len()),
        rows,
        footer,
    }
}

fn with_newline(mut output: String) -> String {
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Render the report table with outstanding's text/term modes
fn render_text(context: &ReportContext, mode: OutputMode) -> anyhow::Result<String> {
    let theme = create_theme();
    let output = render_with_output(REPORT_TEMPLATE, context, &theme, mode)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(with_newline(output))
}

/// Serialize raw result data through outstanding's structured output
fn render_structured<T: Serialize>(value: &T, mode: OutputMode) -> anyhow::Result<String> {
    let theme = create_theme();
    let output = render_auto(REPORT_TEMPLATE, value, &theme, mode)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(with_newline(output))
}

/// Render the result of a `generate` run
pub fn render_batch(result: &BatchResult, mode: OutputMode) -> anyhow::Result<String> {
    if mode.is_structured() {
        return render_structured(result, mode);
    }

    let rows = result
        .tables
        .iter()
        .map(|t| {
            row(
                &t.name,
                &[
                    t.step.to_string(),
                    t.declared_size.to_string(),
                    t.bytes.to_string(),
                ],
            )
        })
        .collect();
    let footer = format!(
        "Wrote {} tables ({} bytes) to {}",
        result.tables.len(),
        result.total_bytes(),
        result.dir.display()
    );
    let context = build_context(
        "Generated cosine tables".to_string(),
        &["Step", "Size", "Bytes"],
        rows,
        footer,
    );
    render_text(&context, mode)
}

fn status_label(status: TableStatus) -> &'static str {
    match status {
        TableStatus::UpToDate => "up-to-date",
        TableStatus::Stale => "stale",
        TableStatus::Missing => "missing",
    }
}

/// Render the result of a `check` run
pub fn render_check(result: &CheckResult, mode: OutputMode) -> anyhow::Result<String> {
    if mode.is_structured() {
        return render_structured(result, mode);
    }

    let rows = result
        .tables
        .iter()
        .map(|t| row(&t.name, &[status_label(t.status).to_string()]))
        .collect();
    let outdated = result
        .tables
        .iter()
        .filter(|t| t.status != TableStatus::UpToDate)
        .count();
    let footer = if outdated == 0 {
        format!("All {} tables up to date", result.tables.len())
    } else {
        format!(
            "{} of {} tables need regeneration",
            outdated,
            result.tables.len()
        )
    };
    let context = build_context(
        format!("Checking {}", result.dir.display()),
        &["Status"],
        rows,
        footer,
    );
    render_text(&context, mode)
}

/// One inspected header file
#[derive(Debug, Serialize)]
pub struct InspectedTable {
    pub path: PathBuf,
    #[serde(flatten)]
    pub table: ParsedTable,
    pub entry_count: usize,
    pub size_matches: bool,
}

impl InspectedTable {
    pub fn new(path: &Path, table: ParsedTable) -> Self {
        Self {
            path: path.to_path_buf(),
            entry_count: table.entry_count(),
            size_matches: table.size_matches(),
            table,
        }
    }
}

/// Render parsed headers for the `inspect` command
pub fn render_inspect(tables: &[InspectedTable], mode: OutputMode) -> anyhow::Result<String> {
    if mode.is_structured() {
        return render_structured(&tables, mode);
    }

    let rows = tables
        .iter()
        .map(|t| {
            row(
                &t.table.name,
                &[
                    t.table.element_type.clone(),
                    t.entry_count.to_string(),
                    t.table.declared_size.to_string(),
                    if t.size_matches { "ok" } else { "mismatch" }.to_string(),
                ],
            )
        })
        .collect();
    let mismatched = tables.iter().filter(|t| !t.size_matches).count();
    let footer = format!("{} tables, {} size mismatches", tables.len(), mismatched);
    let context = build_context(
        "Inspected tables".to_string(),
        &["Type", "Entries", "Declared", "Size"],
        rows,
        footer,
    );
    render_text(&context, mode)
}
