//! Dataset ingestion: parse, flatten, embed, store.

use crate::document::RecipeDocument;
use crate::embeddings::EmbeddingProvider;
use crate::recipe::parse_dataset;
use crate::vector_store::{EmbeddedDocument, VectorStore};
use chrono::{DateTime, Utc};
use cookbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File name of the manifest written inside the store directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Options for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Dataset file (JSON array of recipes)
    pub dataset: PathBuf,

    /// Where to write the manifest; `None` skips it
    pub manifest_path: Option<PathBuf>,
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    pub documents: usize,
    pub bytes_read: u64,
    pub duration_secs: f64,
    pub dataset_sha256: String,
}

/// Record of the last successful ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestManifest {
    pub documents: usize,
    pub dataset: PathBuf,
    pub dataset_sha256: String,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub store_backend: String,
    pub ingested_at: DateTime<Utc>,
}

/// Load a dataset and replace the store contents with its documents.
///
/// Every document is embedded before the store is touched, so any parse or
/// embedding failure leaves the previous contents in place.
pub async fn ingest(
    embedder: &dyn EmbeddingProvider,
    store: &dyn VectorStore,
    options: &IngestOptions,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    tracing::info!("Starting ingestion from {:?}", options.dataset);

    let bytes = std::fs::read(&options.dataset).map_err(|e| {
        AppError::Dataset(format!("Failed to read dataset {:?}: {}", options.dataset, e))
    })?;
    let contents = std::str::from_utf8(&bytes)
        .map_err(|e| AppError::Dataset(format!("Dataset is not valid UTF-8: {}", e)))?;
    let dataset_sha256 = sha256_hex(&bytes);

    let records = parse_dataset(contents)?;
    let documents: Vec<RecipeDocument> = records.iter().map(RecipeDocument::from_record).collect();

    let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();

    tracing::info!(
        "Embedding {} documents using provider '{}' (model: {})",
        texts.len(),
        embedder.provider_name(),
        embedder.model_name()
    );

    let embeddings = if texts.is_empty() {
        Vec::new()
    } else {
        embedder.verify_connection().await?;
        embedder.embed_batch(&texts).await?
    };

    if embeddings.len() != documents.len() {
        return Err(AppError::Knowledge(format!(
            "Embedding provider returned {} vectors for {} documents",
            embeddings.len(),
            documents.len()
        )));
    }

    let embedded: Vec<EmbeddedDocument> = documents
        .into_iter()
        .zip(embeddings)
        .map(|(document, embedding)| EmbeddedDocument {
            document,
            embedding,
        })
        .collect();
    let count = embedded.len();

    store.replace_all(embedded).await?;

    if let Some(manifest_path) = &options.manifest_path {
        let manifest = IngestManifest {
            documents: count,
            dataset: options.dataset.clone(),
            dataset_sha256: dataset_sha256.clone(),
            embedding_provider: embedder.provider_name().to_string(),
            embedding_model: embedder.model_name().to_string(),
            dimensions: embedder.dimensions(),
            store_backend: store.backend_name().to_string(),
            ingested_at: Utc::now(),
        };
        write_manifest(manifest_path, &manifest)?;
    }

    let duration = start.elapsed();

    tracing::info!(
        "Ingestion completed: {} documents, {} bytes in {:.2}s",
        count,
        bytes.len(),
        duration.as_secs_f64()
    );

    Ok(IngestStats {
        documents: count,
        bytes_read: bytes.len() as u64,
        duration_secs: duration.as_secs_f64(),
        dataset_sha256,
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn write_manifest(path: &Path, manifest: &IngestManifest) -> AppResult<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json)?;
    tracing::debug!("Wrote ingest manifest to {:?}", path);
    Ok(())
}

/// Read the manifest of the last ingestion, if any.
pub fn read_manifest(path: &Path) -> AppResult<Option<IngestManifest>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)?;
    let manifest = serde_json::from_str(&contents)?;
    Ok(Some(manifest))
}
