//! Ingest command handler.
//!
//! Rebuilds the vector store from a recipe dataset.

use clap::Args;
use cookbook_core::{config::AppConfig, AppResult};
use cookbook_knowledge::{create_provider, ingest, manifest_path, open_store, IngestOptions};
use std::path::PathBuf;

/// Load a recipe dataset into the vector store, replacing its contents
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Dataset file (JSON array of recipes), relative to the workspace
    #[arg(short, long, default_value = "dataset.json")]
    pub dataset: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let dataset = if self.dataset.is_absolute() {
            self.dataset.clone()
        } else {
            config.workspace.join(&self.dataset)
        };

        let embedder = create_provider(&config.embedding, &config.embedding_endpoint())?;
        let store = open_store(config);

        let options = IngestOptions {
            dataset: dataset.clone(),
            manifest_path: Some(manifest_path(config)),
        };

        let stats = ingest(embedder.as_ref(), store.as_ref(), &options).await?;

        if self.json {
            let output = serde_json::json!({
                "dataset": dataset,
                "store": config.store_path(),
                "documents": stats.documents,
                "bytesRead": stats.bytes_read,
                "durationSecs": stats.duration_secs,
                "datasetSha256": stats.dataset_sha256,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Ingested {} recipes ({} bytes) into {} in {:.2}s",
                stats.documents,
                stats.bytes_read,
                config.store_path().display(),
                stats.duration_secs
            );
        }

        Ok(())
    }
}
