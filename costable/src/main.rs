//! # costable
//!
//! A CLI tool for generating cosine lookup table headers.
//!
//! ## Overview
//!
//! costable is built on top of costablib. Run without arguments it writes the
//! five standard tables (`costable_1` through `costable_0_0001`) into
//! `lib/table/`, one `<name>.h` header each.
//!
//! ## Usage
//!
//! ```bash
//! # Generate the standard tables into lib/table
//! costable
//!
//! # Custom directory and tables
//! costable generate --dir include/tables --table sintab_fine=0.005
//!
//! # Q16 fixed-point tables
//! costable generate --format fixed --fractional-bits 16
//!
//! # Verify committed headers are current (exit code 1 otherwise)
//! costable check
//!
//! # Parse existing headers
//! costable inspect lib/table --output json
//! ```

use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use costablib::{
    check_all, default_tables, discover_tables, generate_all, read_table, GenerateOptions,
    SampleFormat, TableSpec, DEFAULT_OUTPUT_DIR,
};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

mod render;

use render::{
    output_mode_from_arg, render_batch, render_check, render_inspect, InspectedTable, OutputMode,
};

/// Arguments selecting which tables to build and how
fn table_args() -> Vec<Arg> {
    vec![
        Arg::new("dir")
            .short('d')
            .long("dir")
            .default_value(DEFAULT_OUTPUT_DIR)
            .help("Directory holding the generated headers"),
        Arg::new("table")
            .short('t')
            .long("table")
            .action(ArgAction::Append)
            .value_name("NAME=STEP")
            .help("Table to generate (can be specified multiple times, replaces the default set)"),
        Arg::new("format")
            .short('f')
            .long("format")
            .value_parser(["double", "fixed"])
            .default_value("double")
            .help("Sample format: 20-digit doubles or Q-format int32_t"),
        Arg::new("fractional-bits")
            .long("fractional-bits")
            .value_parser(value_parser!(u32))
            .default_value("16")
            .help("Fractional bits for --format fixed (1-30)"),
        Arg::new("max-samples")
            .long("max-samples")
            .value_parser(value_parser!(usize))
            .help("Abort a table that needs more samples than this"),
    ]
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("costable")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate cosine lookup table headers at several angular resolutions")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .global(true)
                .value_parser(["auto", "term", "text", "term-debug", "json"])
                .default_value("auto")
                .help("Output format for the report"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Verbosity level (-v, -vv, -vvv)"),
        )
        .args(table_args())
        .subcommand(
            Command::new("generate")
                .about("Write table headers (default command)")
                .args(table_args()),
        )
        .subcommand(
            Command::new("check")
                .about("Check that existing headers match a fresh generation")
                .args(table_args()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Parse table headers and report their contents")
                .arg(
                    Arg::new("paths")
                        .num_args(1..)
                        .default_value(DEFAULT_OUTPUT_DIR)
                        .help("Header files, directories or glob patterns"),
                ),
        )
}

/// Setup logging based on verbosity
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Extract table specs from matches, falling back to the standard set
fn build_specs(matches: &ArgMatches) -> anyhow::Result<Vec<TableSpec>> {
    match matches.get_many::<String>("table") {
        Some(values) => values
            .map(|v| TableSpec::parse(v).map_err(anyhow::Error::from))
            .collect(),
        None => Ok(default_tables()),
    }
}

/// Build generation options from matches
fn build_options(matches: &ArgMatches) -> anyhow::Result<GenerateOptions> {
    let format: SampleFormat = matches
        .get_one::<String>("format")
        .map(|s| s.parse::<SampleFormat>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    let format = match format {
        SampleFormat::Fixed { fractional_bits } => {
            let bits = matches
                .get_one::<u32>("fractional-bits")
                .copied()
                .unwrap_or(fractional_bits);
            SampleFormat::fixed(bits)?
        }
        SampleFormat::Double => SampleFormat::Double,
    };

    let mut options = GenerateOptions::new().format(format);
    if let Some(limit) = matches.get_one::<usize>("max-samples") {
        options = options.max_samples(*limit);
    }
    Ok(options)
}

fn output_dir(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("dir")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_OUTPUT_DIR)
}

/// Handler for generate command
fn generate_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<ExitCode> {
    let specs = build_specs(matches)?;
    let options = build_options(matches)?;
    debug!(tables = specs.len(), ?options, "generating");

    let result = generate_all(output_dir(matches), &specs, &options)?;
    print!("{}", render_batch(&result, mode)?);
    Ok(ExitCode::SUCCESS)
}

/// Handler for check command
fn check_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<ExitCode> {
    let specs = build_specs(matches)?;
    let options = build_options(matches)?;

    let result = check_all(output_dir(matches), &specs, &options)?;
    print!("{}", render_check(&result, mode)?);
    Ok(if result.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Handler for inspect command
fn inspect_handler(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<ExitCode> {
    let inputs: Vec<String> = matches
        .get_many::<String>("paths")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    let mut tables = Vec::new();
    for path in discover_tables(&inputs[..])? {
        let table = read_table(&path)?;
        tables.push(InspectedTable::new(&path, table));
    }

    print!("{}", render_inspect(&tables, mode)?);
    Ok(ExitCode::SUCCESS)
}

/// Global flags propagate down, so the innermost matches see them all
fn innermost(matches: &ArgMatches) -> &ArgMatches {
    match matches.subcommand() {
        Some((_, sub)) => sub,
        None => matches,
    }
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    let globals = innermost(&matches);

    init_logging(globals.get_count("verbose"));
    let mode = output_mode_from_arg(globals.get_one::<String>("output").map(|s| s.as_str()));

    let result = match matches.subcommand() {
        Some(("generate", sub)) => generate_handler(sub, mode),
        Some(("check", sub)) => check_handler(sub, mode),
        Some(("inspect", sub)) => inspect_handler(sub, mode),
        // Root command (no subcommand) is treated as generate
        _ => generate_handler(&matches, mode),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_valid() {
        build_command().debug_assert();
    }

    #[test]
    fn test_default_specs() {
        let matches = build_command().get_matches_from(["costable"]);
        let specs = build_specs(&matches).unwrap();
        assert_eq!(specs, default_tables());
        assert_eq!(output_dir(&matches), "lib/table");
    }

    #[test]
    fn test_custom_specs() {
        let matches = build_command().get_matches_from([
            "costable", "generate", "-t", "a=0.5", "--table", "b=0.25", "--dir", "out",
        ]);
        let sub = innermost(&matches);
        let specs = build_specs(sub).unwrap();
        assert_eq!(
            specs,
            vec![TableSpec::new("a", 0.5), TableSpec::new("b", 0.25)]
        );
        assert_eq!(output_dir(sub), "out");
    }

    #[test]
    fn test_invalid_spec_is_error() {
        let matches = build_command().get_matches_from(["costable", "-t", "a=-1"]);
        assert!(build_specs(&matches).is_err());
    }

    #[test]
    fn test_fixed_options() {
        let matches = build_command().get_matches_from([
            "costable",
            "check",
            "--format",
            "fixed",
            "--fractional-bits",
            "12",
            "--max-samples",
            "500",
        ]);
        let options = build_options(innermost(&matches)).unwrap();
        assert_eq!(options.format, SampleFormat::Fixed { fractional_bits: 12 });

        let matches = build_command().get_matches_from(["costable"]);
        assert_eq!(
            build_options(&matches).unwrap().format,
            SampleFormat::Double
        );
        assert_eq!(options.max_samples, 500);

        let matches = build_command().get_matches_from([
            "costable",
            "--format",
            "fixed",
            "--fractional-bits",
            "40",
        ]);
        assert!(build_options(&matches).is_err());
    }

    #[test]
    fn test_global_output_flag() {
        let matches = build_command().get_matches_from(["costable", "check", "-o", "json", "-vv"]);
        let globals = innermost(&matches);
        assert!(matches!(
            output_mode_from_arg(globals.get_one::<String>("output").map(|s| s.as_str())),
            OutputMode::Json
        ));
        assert_eq!(globals.get_count("verbose"), 2);
    }
}
