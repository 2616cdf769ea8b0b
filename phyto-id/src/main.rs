//! phyto-id - Plant Identification CLI
//!
//! Identifies the plant in an image file and prints the result list as
//! JSON. Tiers: remote inference service → on-device model → placeholder.

use anyhow::{Context, Result};
use clap::Parser;
use phyto_common::Catalog;
use phyto_id::{
    IdentificationResolver, ModelCache, NetworkStatus, OnnxModelLoader, ResolverSettings,
    UserIntent,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "phyto-id", version, about = "Identify a plant from a photograph")]
struct Cli {
    /// Image file to identify
    image: PathBuf,

    /// Identification purpose (agriculture | medecine)
    #[arg(long)]
    intent: Option<UserIntent>,

    /// Configuration file (overrides PHYTO_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the remote inference service
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = phyto_common::config::load_config(cli.config.as_deref())?;
    phyto_common::logging::init_tracing(&config.logging)?;

    info!("Starting phyto-id v{}", env!("CARGO_PKG_VERSION"));

    let settings = ResolverSettings::resolve(&config)?;
    let catalog = Arc::new(Catalog::bundled()?);
    let network = Arc::new(NetworkStatus::new(!cli.offline));
    let model_cache = Arc::new(ModelCache::new(Arc::new(OnnxModelLoader::new(
        config.model.clone(),
    ))));

    let resolver =
        IdentificationResolver::standard(&settings, catalog, network, Arc::clone(&model_cache))?;

    let image = tokio::fs::read(&cli.image)
        .await
        .with_context(|| format!("Failed to read image {}", cli.image.display()))?;

    let results = resolver.identify(image, cli.intent).await?;
    model_cache.dispose().await;

    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
