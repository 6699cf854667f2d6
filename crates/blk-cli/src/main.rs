//! `blk` CLI — check, reformat, and export BLK documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Validate a document (stdin → diagnostics on stderr)
//! cat settings.blk | blk check
//!
//! # Validate a file; #include paths resolve relative to it
//! blk check -i settings.blk
//!
//! # Rewrite a document in canonical form
//! blk fmt -i settings.blk -o settings.blk
//!
//! # Export to pretty-printed JSON
//! blk json -i settings.blk
//! ```
//!
//! Enum-typed values (`e_*`) parse against an empty registry here, so they
//! come through as placeholders with a warning; full enum support needs the
//! library API, where the host registers its types.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::path::Path;
use std::process;

use blk_core::{
    block_to_json, serialize_block, Block, EnumRegistry, FsResolver, ParseReport,
    Parser as BlkParser,
};

#[derive(Parser)]
#[command(name = "blk", version, about = "BLK hierarchical config format CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and report problems without producing output
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Reformat a document into canonical form
    Fmt {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Export a document as pretty-printed JSON
    Json {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = EnumRegistry::new();

    match cli.command {
        Commands::Check { input } => {
            let report = parse_input(input.as_deref(), &registry)?;
            for diag in &report.diagnostics {
                eprintln!("warning: {diag}");
            }
            match report.error {
                None => {
                    eprintln!("ok");
                }
                Some(err) => {
                    eprintln!("error: {err}");
                    process::exit(1);
                }
            }
        }
        Commands::Fmt { input, output } => {
            let block = parse_strict(input.as_deref(), &registry)?;
            let mut text = serialize_block(&block, &registry);
            text.push('\n');
            write_output(output.as_deref(), &text)?;
        }
        Commands::Json { input, output } => {
            let block = parse_strict(input.as_deref(), &registry)?;
            let value = block_to_json(&block, &registry);
            let mut pretty = serde_json::to_string_pretty(&value)?;
            pretty.push('\n');
            write_output(output.as_deref(), &pretty)?;
        }
    }

    Ok(())
}

/// Parses the input into a full report. File inputs resolve `#include`
/// relative to their directory; stdin has no include base.
fn parse_input(path: Option<&str>, registry: &EnumRegistry) -> Result<ParseReport> {
    let text = read_input(path)?;
    let report = match path {
        Some(path) => {
            let base = Path::new(path).parent().unwrap_or(Path::new("."));
            let resolver = FsResolver::new(base);
            BlkParser::new(&text, registry)
                .with_resolver(&resolver)
                .parse_document()
        }
        None => BlkParser::new(&text, registry).parse_document(),
    };
    Ok(report)
}

fn parse_strict(path: Option<&str>, registry: &EnumRegistry) -> Result<Block> {
    let report = parse_input(path, registry)?;
    match report.error {
        None => Ok(report.root),
        Some(err) => Err(err).context("Failed to parse BLK document"),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
