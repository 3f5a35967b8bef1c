//! Stats command handler.
//!
//! Reports what the vector store currently holds.

use clap::Args;
use cookbook_core::{config::AppConfig, AppResult};
use cookbook_knowledge::{manifest_path, open_store, read_manifest};

/// Show vector store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let store = open_store(config);
        let documents = store.count().await?;
        let manifest = read_manifest(&manifest_path(config))?;

        if self.json {
            let output = serde_json::json!({
                "store": config.store_path(),
                "table": config.store.table,
                "documents": documents,
                "manifest": manifest,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Store: {}", config.store_path().display());
        println!("  Table: {}", config.store.table);
        println!("  Documents: {}", documents);

        match manifest {
            Some(m) => {
                println!("  Last ingest: {}", m.ingested_at.to_rfc3339());
                println!("  Dataset: {} (sha256 {})", m.dataset.display(), m.dataset_sha256);
                println!(
                    "  Embeddings: {} / {} ({} dims)",
                    m.embedding_provider, m.embedding_model, m.dimensions
                );
            }
            None => println!("  Last ingest: unknown (no manifest)"),
        }

        Ok(())
    }
}
