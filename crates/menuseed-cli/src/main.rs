//! menuseed - replace a remote menu catalog with a dataset.

mod config;

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use menuseed_client::{CatalogStore, HttpCatalogClient, MemoryCatalog};
use menuseed_core::{dangling_references, load_dataset, sample_dataset, HttpFetcher, Seeder};

use crate::config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menuseed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Args::parse().into_config()?;

    let dataset = match &config.dataset {
        Some(path) => {
            info!(path = %path.display(), "loading dataset");
            load_dataset(path)?
        }
        None => {
            info!("using bundled sample dataset");
            sample_dataset()?
        }
    };

    for reference in dangling_references(&dataset) {
        warn!(%reference, "dangling reference");
    }

    let store: Arc<dyn CatalogStore> = match config.client {
        Some(client) => {
            info!(
                endpoint = %client.endpoint,
                project = %client.project_id,
                database = %client.database_id,
                "connecting to catalog backend"
            );
            Arc::new(HttpCatalogClient::new(client)?)
        }
        None => {
            info!("dry run, seeding an in-memory catalog");
            Arc::new(MemoryCatalog::new())
        }
    };
    let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout)?);

    let seeder = Seeder::new(store, fetcher, dataset, config.seed);
    let summary = seeder.run().await?;

    info!(
        rows_removed = summary.reset.rows_deleted,
        files_removed = summary.reset.files_deleted,
        unresolved_categories = summary.unresolved_categories,
        "catalog seeded"
    );
    Ok(())
}
