//! Command-line interface for trying requests against a configuration.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use console::style;

use crate::config::{HostContext, ProviderConfig};
use crate::error::Result;
use crate::granularity::Granularity;
use crate::request::{NormalizedRequest, OaiRequest};
use crate::validator::RequestValidator;
use crate::xml::error_document;

/// Base URL used when neither the configuration nor `--base-url` set one.
const DEFAULT_BASE_URL: &str = "http://localhost/oai";

/// OAI-PMH Provider - Validate OAI-PMH requests against a provider configuration.
#[derive(Parser)]
#[command(name = "oaipmh-provider")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a request and print the normalized arguments or the error response.
    Check {
        /// Request arguments (e.g., verb=ListRecords metadataPrefix=oai_dc)
        #[arg(value_parser = parse_argument, required = true)]
        arguments: Vec<(String, String)>,

        /// Provider configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Base URL when the configuration has none
        #[arg(short, long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },
}

/// Host context backed by command-line flags.
struct CliHost {
    base_url: String,
}

impl HostContext for CliHost {
    fn application_name(&self) -> String {
        env!("CARGO_PKG_NAME").to_string()
    }

    fn catalog_url(&self) -> String {
        self.base_url.clone()
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            arguments,
            config,
            base_url,
        } => check_command(arguments, config.as_deref(), base_url),
    }
}

/// Split a `name=value` argument.
fn parse_argument(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("empty argument name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Execute the check command.
fn check_command(
    arguments: Vec<(String, String)>,
    config_path: Option<&Path>,
    base_url: String,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ProviderConfig::load(path)?,
        None => ProviderConfig::default(),
    };
    let identity = config.resolve(&CliHost { base_url })?;
    let formats = config.format_registry();

    let request = OaiRequest::from_pairs(arguments);
    let verb = request.verb().unwrap_or_default();

    match RequestValidator::new(&formats).validate(verb, &request) {
        Ok(normalized) => {
            println!(
                "{} {} request",
                style("Valid").green().bold(),
                style(verb).cyan()
            );
            for line in describe(&normalized) {
                println!("  {line}");
            }
        }
        Err(error) => {
            println!(
                "{}",
                error_document(&identity.url, &request, &error, &Utc::now())?
            );
        }
    }

    Ok(())
}

/// Human-readable lines for a normalized request.
fn describe(request: &NormalizedRequest) -> Vec<String> {
    let mut lines = Vec::new();
    let mut push = |name: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{name}: {value}"));
        }
    };

    push("identifier", request.identifier.clone());
    push("metadataPrefix", request.metadata_prefix.clone());
    push(
        "from",
        request.from.map(|ts| Granularity::DateTime.format(&ts)),
    );
    push(
        "until",
        request.until.map(|ts| Granularity::DateTime.format(&ts)),
    );
    push("set", request.set.clone());
    push("resumptionToken", request.resumption_token.clone());
    for (name, value) in &request.extra {
        push(name, Some(value.clone()));
    }

    lines
}
