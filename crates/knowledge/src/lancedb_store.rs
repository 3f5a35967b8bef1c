//! LanceDB-backed vector store.

use crate::document::{DocumentMetadata, RecipeDocument};
use crate::vector_store::{cosine_similarity, rank, EmbeddedDocument, ScoredDocument, VectorStore};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use cookbook_core::{AppError, AppResult};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// LanceDB-backed store holding one table of recipe documents.
///
/// The table is opened lazily and cached. Replacing the contents builds the
/// new table in a staging directory and swaps it in once the write succeeded.
pub struct LanceDbStore {
    path: PathBuf,
    table_name: String,
    dimensions: usize,
    table: RwLock<Option<Table>>,
}

impl LanceDbStore {
    /// Create a store handle. Nothing is read until the first query.
    ///
    /// # Arguments
    /// * `path` - Directory of the LanceDB database
    /// * `table_name` - Name of the table (typically "recipes")
    /// * `dimensions` - Dimension of embedding vectors (e.g., 1024)
    pub fn new(path: impl Into<PathBuf>, table_name: impl Into<String>, dimensions: usize) -> Self {
        Self {
            path: path.into(),
            table_name: table_name.into(),
            dimensions,
            table: RwLock::new(None),
        }
    }

    fn create_schema(dimensions: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("recipe_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("content", DataType::Utf8, false),
            // {id, title} as JSON, keeps the id's original type
            Field::new("metadata", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    dimensions as i32,
                ),
                false,
            ),
        ]))
    }

    fn documents_to_batch(&self, documents: &[EmbeddedDocument]) -> AppResult<RecordBatch> {
        let schema = Self::create_schema(self.dimensions);

        let mut ids = Vec::with_capacity(documents.len());
        let mut titles = Vec::with_capacity(documents.len());
        let mut contents = Vec::with_capacity(documents.len());
        let mut metadata = Vec::with_capacity(documents.len());
        let mut values = Vec::with_capacity(documents.len() * self.dimensions);

        for doc in documents {
            if doc.embedding.len() != self.dimensions {
                return Err(AppError::Knowledge(format!(
                    "Embedding dimension mismatch for recipe '{}': expected {}, got {}",
                    doc.document.metadata.id,
                    self.dimensions,
                    doc.embedding.len()
                )));
            }

            ids.push(doc.document.metadata.id.to_string());
            titles.push(doc.document.metadata.title.clone());
            contents.push(doc.document.content.clone());
            metadata.push(serde_json::to_string(&doc.document.metadata)?);
            values.extend_from_slice(&doc.embedding);
        }

        let vector_array = FixedSizeListArray::try_new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            self.dimensions as i32,
            Arc::new(Float32Array::from(values)),
            None,
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to create vector array: {}", e)))?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(titles)),
                Arc::new(StringArray::from(contents)),
                Arc::new(StringArray::from(metadata)),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to create RecordBatch: {}", e)))
    }

    /// Convert search results back into scored documents.
    fn batch_to_hits(batch: &RecordBatch, query: &[f32]) -> AppResult<Vec<ScoredDocument>> {
        let contents = string_column(batch, "content")?;
        let metadata = string_column(batch, "metadata")?;

        let vectors = batch
            .column_by_name("vector")
            .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
            .ok_or_else(|| AppError::Knowledge("Invalid vector column".to_string()))?;

        let mut hits = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let metadata: DocumentMetadata = serde_json::from_str(metadata.value(row))
                .map_err(|e| AppError::Knowledge(format!("Failed to parse metadata: {}", e)))?;

            let vector_ref = vectors.value(row);
            let vector = vector_ref
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| AppError::Knowledge("Invalid vector values".to_string()))?;

            hits.push(ScoredDocument {
                document: RecipeDocument {
                    content: contents.value(row).to_string(),
                    metadata,
                },
                score: cosine_similarity(vector.values(), query),
            });
        }

        Ok(hits)
    }

    async fn connect(path: &Path) -> AppResult<lancedb::Connection> {
        let uri = path.to_string_lossy().to_string();
        lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to connect to LanceDB: {}", e)))
    }

    /// Open the table, reusing the cached handle when there is one.
    async fn open_table(&self) -> AppResult<Table> {
        if let Some(table) = self.table.read().await.as_ref() {
            return Ok(table.clone());
        }

        let mut cached = self.table.write().await;
        if let Some(table) = cached.as_ref() {
            return Ok(table.clone());
        }

        if !self.path.exists() {
            return Err(AppError::Knowledge(format!(
                "Vector store not found at {:?}. Run 'cookbook ingest' first.",
                self.path
            )));
        }

        let conn = Self::connect(&self.path).await?;
        let table = conn
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| {
                AppError::Knowledge(format!(
                    "Failed to open table '{}' in {:?}: {}",
                    self.table_name, self.path, e
                ))
            })?;

        tracing::debug!("Opened LanceDB table '{}' at {:?}", self.table_name, self.path);
        *cached = Some(table.clone());
        Ok(table)
    }

    /// Sibling directory `<store>.<suffix>`.
    fn sibling_path(&self, suffix: &str) -> AppResult<PathBuf> {
        let name = self.path.file_name().ok_or_else(|| {
            AppError::Config(format!("Invalid vector store path: {:?}", self.path))
        })?;

        let mut sibling = name.to_os_string();
        sibling.push(".");
        sibling.push(suffix);
        Ok(self.path.with_file_name(sibling))
    }

    /// Move `staging` into the store location.
    ///
    /// The live directory is renamed aside first and put back if the swap
    /// fails, so there is always a readable store at `path`.
    fn swap_in(&self, staging: &Path) -> AppResult<()> {
        let previous = self.sibling_path("previous")?;
        if previous.exists() {
            std::fs::remove_dir_all(&previous)?;
        }

        let had_previous = self.path.exists();
        if had_previous {
            std::fs::rename(&self.path, &previous)?;
        }

        if let Err(e) = std::fs::rename(staging, &self.path) {
            if had_previous {
                std::fs::rename(&previous, &self.path)?;
            }
            return Err(AppError::Knowledge(format!(
                "Failed to move new store into {:?}: {}",
                self.path, e
            )));
        }

        if had_previous {
            if let Err(e) = std::fs::remove_dir_all(&previous) {
                tracing::warn!("Failed to remove previous store {:?}: {}", previous, e);
            }
        }
        Ok(())
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> AppResult<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| AppError::Knowledge(format!("Invalid {} column", name)))
}

#[async_trait]
impl VectorStore for LanceDbStore {
    fn backend_name(&self) -> &str {
        "lancedb"
    }

    async fn replace_all(&self, documents: Vec<EmbeddedDocument>) -> AppResult<()> {
        let batch = self.documents_to_batch(&documents)?;
        let schema = batch.schema();
        let staging = self.sibling_path("staging")?;

        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        if let Some(parent) = staging.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create store directory: {}", e))
            })?;
        }

        {
            let conn = Self::connect(&staging).await?;
            conn.create_table(
                &self.table_name,
                RecordBatchIterator::new(vec![Ok(batch)], schema),
            )
            .execute()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to create table: {}", e)))?;
        }

        let mut cached = self.table.write().await;
        *cached = None;
        self.swap_in(&staging)?;

        tracing::info!(
            "Wrote {} documents to LanceDB table '{}' at {:?}",
            documents.len(),
            self.table_name,
            self.path
        );
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<ScoredDocument>> {
        if query_embedding.len() != self.dimensions {
            return Err(AppError::Knowledge(format!(
                "Query embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                query_embedding.len()
            )));
        }

        if top_k == 0 {
            return Ok(Vec::new());
        }

        let table = self.open_table().await?;
        let rows = table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to count rows: {}", e)))?;
        if rows == 0 {
            return Ok(Vec::new());
        }

        let batches = table
            .query()
            .nearest_to(query_embedding.to_vec())
            .map_err(|e| AppError::Knowledge(format!("Failed to create query: {}", e)))?
            .distance_type(DistanceType::Cosine)
            .limit(top_k)
            .execute()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to execute search: {}", e)))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to collect results: {}", e)))?;

        let mut hits = Vec::new();
        for batch in &batches {
            hits.extend(Self::batch_to_hits(batch, query_embedding)?);
        }

        tracing::debug!("LanceDB returned {} hits", hits.len());
        Ok(rank(hits, top_k))
    }

    async fn count(&self) -> AppResult<usize> {
        let table = self.open_table().await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to count rows: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeId;
    use tempfile::TempDir;

    fn embedded(id: RecipeId, title: &str, embedding: Vec<f32>) -> EmbeddedDocument {
        EmbeddedDocument {
            document: RecipeDocument {
                content: format!("Tên món: {}\nNguyên liệu: \nCác bước: ", title),
                metadata: DocumentMetadata {
                    id,
                    title: title.to_string(),
                },
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn test_missing_store_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = LanceDbStore::new(temp.path().join("recipes_db"), "recipes", 3);

        let err = store.search(&[1.0, 0.0, 0.0], 3).await.unwrap_err();
        assert!(err.to_string().contains("cookbook ingest"));
    }

    #[tokio::test]
    async fn test_replace_and_search() {
        let temp = TempDir::new().unwrap();
        let store = LanceDbStore::new(temp.path().join("recipes_db"), "recipes", 3);

        store
            .replace_all(vec![
                embedded(RecipeId::Int(1), "Phở bò", vec![1.0, 0.0, 0.0]),
                embedded(RecipeId::from("gr-2"), "Gà rán", vec![0.0, 1.0, 0.0]),
                embedded(RecipeId::Int(3), "Bún chả", vec![0.6, 0.8, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 3);

        let hits = store.search(&[0.0, 1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.metadata.id, RecipeId::from("gr-2"));
        assert_eq!(hits[1].document.metadata.id, RecipeId::Int(3));
        assert!(hits[0].document.content.starts_with("Tên món: Gà rán"));
    }

    #[tokio::test]
    async fn test_replace_discards_previous_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("recipes_db");
        let store = LanceDbStore::new(&path, "recipes", 2);

        store
            .replace_all(vec![embedded(RecipeId::Int(1), "Cũ", vec![1.0, 0.0])])
            .await
            .unwrap();
        store.count().await.unwrap();

        store
            .replace_all(vec![
                embedded(RecipeId::Int(2), "Mới", vec![1.0, 0.0]),
                embedded(RecipeId::Int(3), "Mới 2", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        let hits = store.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(hits.iter().all(|h| h.document.metadata.id != RecipeId::Int(1)));
        assert!(!temp.path().join("recipes_db.staging").exists());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_leaves_store_untouched() {
        let temp = TempDir::new().unwrap();
        let store = LanceDbStore::new(temp.path().join("recipes_db"), "recipes", 2);

        store
            .replace_all(vec![embedded(RecipeId::Int(1), "Phở gà", vec![1.0, 0.0])])
            .await
            .unwrap();

        let result = store
            .replace_all(vec![embedded(RecipeId::Int(2), "Sai", vec![1.0, 0.0, 0.0])])
            .await;
        assert!(result.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_dataset_creates_empty_table() {
        let temp = TempDir::new().unwrap();
        let store = LanceDbStore::new(temp.path().join("recipes_db"), "recipes", 2);

        store.replace_all(Vec::new()).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_swap_keeps_previous_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("recipes_db");
        let store = LanceDbStore::new(&path, "recipes", 2);

        store
            .replace_all(vec![embedded(RecipeId::Int(1), "Phở bò", vec![1.0, 0.0])])
            .await
            .unwrap();

        // nothing to move in, so the rename fails
        let err = store.swap_in(&temp.path().join("missing.staging")).unwrap_err();
        assert!(matches!(err, AppError::Knowledge(_)));

        assert!(path.exists());
        assert!(!temp.path().join("recipes_db.previous").exists());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_leftover_previous_directory_is_cleared() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("recipes_db");
        std::fs::create_dir_all(temp.path().join("recipes_db.previous")).unwrap();
        let store = LanceDbStore::new(&path, "recipes", 2);

        store
            .replace_all(vec![embedded(RecipeId::Int(1), "Cũ", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .replace_all(vec![embedded(RecipeId::Int(2), "Mới", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert!(!temp.path().join("recipes_db.previous").exists());
    }

    #[tokio::test]
    async fn test_search_on_empty_table_returns_nothing() {
        let temp = TempDir::new().unwrap();
        let store = LanceDbStore::new(temp.path().join("recipes_db"), "recipes", 2);

        store.replace_all(Vec::new()).await.unwrap();
        let hits = store.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }
}
