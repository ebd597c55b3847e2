//! pid-tool: parse, validate and mint persistent identifiers from the shell
//!
//! Log output goes to stderr and follows `RUST_LOG`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pid_core::{
    format_identifier_string, is_valid_global_id, DvObject, GlobalId, InMemoryPidRegistry,
    MapSettings, PidProvider,
};
use pid_providers::{InMemoryRegistryClient, ProviderSet};

#[derive(Parser)]
#[command(name = "pid-tool")]
#[command(about = "Persistent identifier toolkit")]
struct Cli {
    /// TOML settings file with [pid] and [permalink] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a PID or resolver URL
    Parse {
        /// e.g. doi:10.5072/FK2/BYM3IW or https://doi.org/10.5072/FK2/BYM3IW
        raw: String,
    },
    /// Check a protocol/authority/identifier triple
    Validate {
        protocol: String,
        authority: String,
        identifier: String,
    },
    /// Strip whitespace, quotes and semicolons
    Format { value: String },
    /// Show the provider serving a protocol
    Dispatch {
        /// Defaults to the configured protocol
        protocol: Option<String>,
    },
    /// Mint a new identifier with the default provider
    Generate {
        /// Mint a data-file identifier under this dataset identifier
        #[arg(long)]
        dataset: Option<String>,
    },
}

#[derive(Serialize)]
struct ParsedPid {
    #[serde(flatten)]
    id: GlobalId,
    canonical: String,
    url: String,
}

impl From<GlobalId> for ParsedPid {
    fn from(id: GlobalId) -> Self {
        Self {
            canonical: id.as_string(),
            url: id.to_url(),
            id,
        }
    }
}

#[derive(Serialize)]
struct ProviderSummary {
    protocol: String,
    name: String,
    provider_type: String,
    authority: String,
    shoulder: String,
    information: Vec<String>,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => MapSettings::load(path)?,
        None => MapSettings::new(),
    };
    let providers = ProviderSet::from_settings(
        &settings,
        Arc::new(InMemoryPidRegistry::new()),
        Arc::new(InMemoryRegistryClient::new()),
    );
    let dispatcher = providers.dispatcher();

    match cli.command {
        Commands::Parse { raw } => match dispatcher.parse(&raw) {
            Some(id) => print_json(&ParsedPid::from(id))?,
            None => {
                eprintln!("Not a recognized persistent identifier: {}", raw);
                std::process::exit(1);
            }
        },
        Commands::Validate {
            protocol,
            authority,
            identifier,
        } => {
            let valid = is_valid_global_id(
                Some(protocol.as_str()),
                Some(authority.as_str()),
                Some(identifier.as_str()),
            );
            println!("{}", valid);
            if !valid {
                std::process::exit(1);
            }
        }
        Commands::Format { value } => {
            println!("{}", format_identifier_string(Some(value.as_str())).unwrap_or_default());
        }
        Commands::Dispatch { protocol } => {
            let provider = match protocol {
                Some(protocol) => dispatcher.get_bean(&protocol, &settings),
                None => dispatcher.get_default_bean(&settings),
            };
            let Some(provider) = provider else {
                eprintln!("No provider configured");
                std::process::exit(1);
            };
            print_json(&ProviderSummary {
                protocol: provider.protocol().to_string(),
                name: provider.name().to_string(),
                provider_type: provider.provider_type().to_string(),
                authority: provider.authority().to_string(),
                shoulder: provider.shoulder().to_string(),
                information: provider.provider_information(),
            })?;
        }
        Commands::Generate { dataset } => {
            let Some(provider) = dispatcher.get_default_bean(&settings) else {
                eprintln!("No provider configured for the default protocol");
                std::process::exit(1);
            };
            let mut obj = match dataset {
                Some(identifier) => DvObject::data_file(Some(identifier)),
                None => DvObject::dataset(),
            };
            provider.generate_identifier(&mut obj)?;
            match obj.global_id() {
                Some(id) => print_json(&ParsedPid::from(id))?,
                None => return Err("generated identifier is not valid".into()),
            }
        }
    }

    Ok(())
}
