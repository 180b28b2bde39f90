use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};

use anistream_core::{
    logging,
    models::{RawLinkResult, ServerListing},
    provider::{CollaboratorError, ServerLister, StreamAdapter},
    Config, ServerSelection, StreamResolver, Variant,
};

#[derive(Parser, Debug)]
#[command(name = "anistream")]
#[command(about = "Resolve anime episode servers into proxied HLS streams", long_about = None)]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "ANISTREAM_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one server selection and print the result as JSON
    Resolve {
        /// Server name, e.g. "HD-4"
        #[arg(long)]
        server: String,

        /// Audio variant (sub or dub)
        #[arg(long = "type", default_value = "sub")]
        variant: Variant,

        /// Server index from the server listing
        #[arg(long)]
        index: Option<u32>,

        /// Upstream server id from the server listing
        #[arg(long)]
        id: Option<String>,

        /// Episode reference, either "<slug>?ep=<id>" or a bare episode id
        episode_ref: String,
    },
}

/// Stand-in for the scraping collaborators, which are provided by the host
/// application rather than this binary.
struct Unavailable;

#[async_trait]
impl StreamAdapter for Unavailable {
    async fn extract(
        &self,
        selection: &ServerSelection,
        _episode_ref: &str,
    ) -> Result<RawLinkResult, CollaboratorError> {
        Err(CollaboratorError::Unavailable(format!(
            "no stream adapter for server {}",
            selection.name
        )))
    }
}

#[async_trait]
impl ServerLister for Unavailable {
    async fn get_servers(&self, _content_ref: &str) -> Result<ServerListing, CollaboratorError> {
        Err(CollaboratorError::Unavailable("no server lister".to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load configuration
    let config = Config::load(args.config.as_deref())?;

    // 2. Validate configuration (fail fast on misconfigurations)
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("Config validation error: {e}");
        }
        return Err(anyhow::anyhow!(
            "Configuration validation failed with {} error(s)",
            errors.len()
        ));
    }

    // 3. Initialize logging
    logging::init_logging(&config.logging)?;

    let Command::Resolve {
        server,
        variant,
        index,
        id,
        episode_ref,
    } = args.command;

    let mut selection = ServerSelection::new(server, variant);
    selection.index = index;
    selection.id = id;

    let collaborators = Arc::new(Unavailable);
    let resolver = StreamResolver::from_config(&config, collaborators.clone(), collaborators);

    info!("Resolving {} ({}) for {}", selection.name, selection.variant, episode_ref);
    let resolution = resolver.resolve(&selection, &episode_ref).await;
    if !resolution.is_playable() {
        warn!("No playable stream for {}", selection.name);
    }

    println!("{}", serde_json::to_string_pretty(&resolution)?);
    Ok(())
}
