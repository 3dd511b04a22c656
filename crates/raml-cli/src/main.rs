#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # raml-cli
//!
//! Command-line front end for the RAML resolver.
//!
//! Resolves a root document (includes, traits, resource types, schemas)
//! and prints the result.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use raml_parser::{ParserConfig, Parser as RamlParser};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "raml")]
#[command(about = "RAML document resolver CLI")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a document and print the resulting tree
    Parse {
        /// Root RAML file
        input: PathBuf,

        /// Keep schemas and non-document includes as raw text
        #[arg(long)]
        no_schemas: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// List every resource path of a document
    Resources {
        /// Root RAML file
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ParserConfig::from_yaml_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => ParserConfig::default(),
    };
    let mut parser = RamlParser::new().with_config(config);

    match cli.command {
        Commands::Parse {
            input,
            no_schemas,
            format,
        } => {
            let parse_schemas = parser.config().parse_schemas && !no_schemas;
            let api = parser
                .parse_with(&input, parse_schemas)
                .with_context(|| format!("parsing {}", input.display()))?;
            tracing::info!("Resolved {}", input.display());
            for (location, file_name) in api.unresolved_includes() {
                tracing::warn!("Unresolved include {} at {}", file_name, location);
            }

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(api.root())?,
                OutputFormat::Yaml => serde_yaml::to_string(api.root())?,
            };
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", rendered.trim_end())?;
        }
        Commands::Resources { input } => {
            let api = parser
                .parse(&input)
                .with_context(|| format!("parsing {}", input.display()))?;

            let mut stdout = std::io::stdout().lock();
            for resource in api.all_resources() {
                writeln!(stdout, "{}", resource.path())?;
            }
        }
    }

    Ok(())
}
