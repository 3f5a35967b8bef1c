//! Recipe dataset records.

use cookbook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Recipe identifier as it appears in the dataset.
///
/// Datasets exported from the cookbook backend use numeric ids, hand-written
/// ones often use strings. The original JSON type is kept so sources echo the
/// id back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Int(i64),
    Text(String),
}

impl RecipeId {
    /// Whether the id carries no usable value.
    pub fn is_blank(&self) -> bool {
        match self {
            RecipeId::Int(_) => false,
            RecipeId::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Int(n) => write!(f, "{}", n),
            RecipeId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecipeId {
    fn from(value: i64) -> Self {
        RecipeId::Int(value)
    }
}

impl From<&str> for RecipeId {
    fn from(value: &str) -> Self {
        RecipeId::Text(value.to_string())
    }
}

/// One ingredient line. Quantity and unit are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
}

/// One preparation step. Only the title is indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub title: String,
}

/// A recipe as read from the dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    pub id: RecipeId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub ingredients: Vec<Ingredient>,

    #[serde(default)]
    pub steps: Vec<RecipeStep>,
}

/// Read and validate a dataset file.
pub fn load_dataset(path: &Path) -> AppResult<Vec<RecipeRecord>> {
    tracing::debug!("Loading dataset from {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Dataset(format!("Failed to read dataset {:?}: {}", path, e))
    })?;

    parse_dataset(&contents)
}

/// Parse a dataset held in memory.
///
/// The whole array must be well-formed: a single bad record fails the parse.
pub fn parse_dataset(contents: &str) -> AppResult<Vec<RecipeRecord>> {
    let records: Vec<RecipeRecord> = serde_json::from_str(contents)
        .map_err(|e| AppError::Dataset(format!("Malformed recipe dataset: {}", e)))?;

    validate_records(&records)?;

    tracing::info!("Parsed {} recipes", records.len());
    Ok(records)
}

fn validate_records(records: &[RecipeRecord]) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        if record.id.is_blank() {
            return Err(AppError::Dataset(format!(
                "Recipe at index {} has a blank id",
                index
            )));
        }

        if !seen.insert(&record.id) {
            return Err(AppError::Dataset(format!(
                "Duplicate recipe id '{}' at index {}",
                record.id, index
            )));
        }
    }

    Ok(())
}
