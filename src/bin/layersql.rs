//! layersql: inspect annotated SQL from the command line
//!
//! # Usage
//!
//! ```bash
//! # Parse a statement
//! layersql parse "create or replace table out as (select layer.train(*) from src)"
//!
//! # Parse a file, JSON output
//! layersql parse --file model.sql --format json
//!
//! # Dump the token tree
//! layersql tokens "select a, b from src"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use layer_sql::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "layersql")]
#[command(version)]
#[command(about = "Inspect train/predict annotations in SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    layersql parse \"create or replace table out as (select layer.train(*) from src)\"
    layersql parse --file scoring.sql --format json
    layersql tokens \"select a, layer.predict('m', b) from src\"")]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, env = "LAYERSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the annotation namespace
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a statement and show the extracted annotation
    Parse {
        /// The SQL statement
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        sql: Option<String>,

        /// Read the statement from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print the token tree of a statement
    Tokens {
        /// The SQL statement
        sql: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "layer_sql=debug" } else { "layer_sql=warn" };
    let filter = match level.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let parser = LayerSqlParser::with_config(load_config(cli)?);

    match &cli.command {
        Commands::Parse { sql, file } => {
            let sql = match (sql, file) {
                (_, Some(path)) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read file '{}'", path.display()))?,
                (Some(sql), None) => sql.clone(),
                (None, None) => anyhow::bail!("Either SQL or --file must be provided"),
            };
            parse_statement(&parser, &sql, cli.format)
        }
        Commands::Tokens { sql } => show_tokens(&parser, sql, cli.format),
    }
}

fn load_config(cli: &Cli) -> Result<LayerSqlConfig> {
    let config = match &cli.config {
        Some(path) => LayerSqlConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => LayerSqlConfig::discover().context("Failed to load config")?,
    };

    match &cli.namespace {
        Some(ns) => Ok(LayerSqlConfig::builder()
            .namespace(ns.as_str())
            .default_prediction_column(config.default_prediction_column)
            .build()?),
        None => Ok(config),
    }
}

fn parse_statement(parser: &LayerSqlParser, sql: &str, format: OutputFormat) -> Result<()> {
    let parsed = parser.parse(sql)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        OutputFormat::Pretty => match &parsed {
            Some(function) => print_function(function),
            None => println!(
                "{}",
                format!("No {}.* annotation found.", parser.config().namespace).yellow()
            ),
        },
    }
    Ok(())
}

fn print_function(function: &AnnotationFunction) {
    println!(
        "{} {}",
        "Function:".green().bold(),
        function.kind().to_string().cyan().bold()
    );
    println!("  {} {}", "Source:".dimmed(), function.source_name().white());
    println!("  {} {}", "Target:".dimmed(), function.target_name().white());

    match function {
        AnnotationFunction::Train(train) => {
            println!("  {}", "Train columns:".dimmed());
            for col in &train.train_columns {
                println!("    • {}", col.white());
            }
        }
        AnnotationFunction::Predict(predict) => {
            println!("  {} {}", "Model:".dimmed(), predict.model_name.yellow());
            println!(
                "  {} {}",
                "Select columns:".dimmed(),
                predict.select_columns.join(", ").white()
            );
            println!(
                "  {} {}",
                "Predict columns:".dimmed(),
                predict.predict_columns.join(", ").white()
            );
            println!(
                "  {} {}",
                "Prediction column:".dimmed(),
                predict.prediction_column.white()
            );
            println!();
            println!("{}", "Rebuilt SQL:".green().bold());
            println!("  {}", predict.rebuilt_sql.white());
        }
    }
}

fn show_tokens(parser: &LayerSqlParser, sql: &str, format: OutputFormat) -> Result<()> {
    let tree = parser.tokenize(sql)?;
    match format {
        OutputFormat::Json => {
            let leaves: Vec<serde_json::Value> = tree
                .flatten()
                .into_iter()
                .filter_map(|leaf| {
                    let kind = leaf.leaf_kind()?;
                    Some(serde_json::json!({ "kind": kind, "value": leaf.value() }))
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&leaves)?);
        }
        OutputFormat::Pretty => print!("{}", tree.pretty()),
    }
    Ok(())
}
