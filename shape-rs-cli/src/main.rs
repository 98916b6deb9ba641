//! # shape-rs-cli
//!
//! Convert shape-rs AST documents to and from JSON Schema and check data
//! against them.
//!
//! ## Usage
//!
//! ```bash
//! # AST document -> JSON Schema on stdout
//! shape-rs export order.ast.json
//!
//! # With document metadata, written to a file
//! shape-rs export order.ast.json -o order.schema.json --id https://example.com/order.json
//!
//! # JSON Schema -> AST document
//! shape-rs import order.schema.json -o order.ast.json
//!
//! # Decode a data file; exits with status 2 if it does not match
//! shape-rs check --schema order.ast.json order.json
//!
//! # Initialize configuration
//! shape-rs init
//! ```
//!
//! Logging goes to stderr and is controlled by `SHAPE_RS_LOG`
//! (e.g. `SHAPE_RS_LOG=shape_rs=debug`), or by `--verbose` / `--quiet`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use shape_rs_cli::{
    commands,
    config::{CliArgs, Config, ConfigManager},
    error::CliError,
    writer::{FileWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "shape-rs")]
#[command(author, version, about = "Convert and check shape-rs schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an AST document to a JSON Schema document
    Export {
        /// AST document (JSON)
        input: PathBuf,

        /// `$id` of the generated document (also adds `$schema`)
        #[arg(long)]
        id: Option<String>,

        /// Title of the generated document
        #[arg(long)]
        title: Option<String>,

        /// Description of the generated document
        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Convert a JSON Schema document to an AST document
    Import {
        /// JSON Schema document
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Decode a data file against an AST document
    Check {
        /// AST document (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Data file (JSON)
        data: PathBuf,

        /// Maximum nesting depth accepted while decoding
        #[arg(long)]
        max_depth: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Initialize a new shape-rs configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "shape-rs.toml")]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Preview output without writing files
    #[arg(long)]
    dry_run: bool,
}

impl OutputArgs {
    fn pretty(&self) -> Option<bool> {
        self.compact.then_some(false)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            match e {
                CliError::Validation(_) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SHAPE_RS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Export {
            input,
            id,
            title,
            description,
            output,
        } => {
            let config = load_config(
                config_path,
                CliArgs {
                    pretty: output.pretty(),
                    id,
                    title,
                    description,
                    ..Default::default()
                },
            )?;
            cmd_export(&input, &output, &config)
        }

        Commands::Import { input, output } => {
            let config = load_config(
                config_path,
                CliArgs {
                    pretty: output.pretty(),
                    ..Default::default()
                },
            )?;
            cmd_import(&input, &output, &config)
        }

        Commands::Check {
            schema,
            data,
            max_depth,
            output,
        } => {
            let config = load_config(
                config_path,
                CliArgs {
                    pretty: output.pretty(),
                    max_depth,
                    ..Default::default()
                },
            )?;
            cmd_check(&schema, &data, &output, &config)
        }

        Commands::Init { output, force } => cmd_init(output, force),
    }
}

fn load_config(path: Option<&Path>, args: CliArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(path)?;
    ConfigManager::merge_cli_args(config, &args)
}

/// Export command implementation.
fn cmd_export(input: &Path, output: &OutputArgs, config: &Config) -> Result<(), CliError> {
    let ast = commands::read_ast(input)?;
    let schema = commands::export(&ast, config);
    emit(&schema, output, config)
}

/// Import command implementation.
fn cmd_import(input: &Path, output: &OutputArgs, config: &Config) -> Result<(), CliError> {
    let schema = commands::read_json(input)?;
    let ast = commands::import(&schema)?;
    emit(&ast, output, config)
}

/// Check command implementation.
fn cmd_check(
    schema: &Path,
    data: &Path,
    output: &OutputArgs,
    config: &Config,
) -> Result<(), CliError> {
    let ast = commands::read_ast(schema)?;
    let document = commands::read_json(data)?;
    let decoded = commands::check(&ast, &document, config)?;
    eprintln!("{} {} is valid", "✓".green(), data.display());
    emit(&decoded, output, config)
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        eprintln!(
            "{} Configuration file already exists: {}",
            "Error:".red(),
            output.display()
        );
        eprintln!("  Use --force to overwrite");
        return Err(CliError::Validation(
            "Configuration file already exists".to_string(),
        ));
    }

    let content = ConfigManager::default_config_content();
    std::fs::write(&output, content)?;

    eprintln!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Render a document and send it to the output sink.
fn emit(document: &serde_json::Value, output: &OutputArgs, config: &Config) -> Result<(), CliError> {
    let content = commands::render(document, config.output.pretty)?;
    let writer = FileWriter::new(output.dry_run);

    match writer.write(output.output.as_deref(), &content)? {
        WriteResult::Written { path, bytes } => {
            eprintln!(
                "{} Written {} bytes to {}",
                "✓".green(),
                bytes,
                path.display()
            );
        }
        WriteResult::Printed { .. } => {}
        WriteResult::DryRun { content, path } => {
            let target = path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "stdout".to_string());
            eprintln!("{} Would write to {}:", "[dry-run]".yellow(), target);
            eprintln!("{}", "─".repeat(60).dimmed());
            eprintln!("{}", content);
            eprintln!("{}", "─".repeat(60).dimmed());
        }
    }

    Ok(())
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
