//! Flattened recipe documents as stored in the vector store.

use crate::recipe::{RecipeId, RecipeRecord};
use serde::{Deserialize, Serialize};

/// Metadata carried alongside each document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub id: RecipeId,
    pub title: String,
}

/// Searchable text form of one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl RecipeDocument {
    /// Flatten a record into the three-line document format.
    pub fn from_record(record: &RecipeRecord) -> Self {
        let ingredients = record
            .ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let steps = record
            .steps
            .iter()
            .map(|s| s.title.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let content = format!(
            "Tên món: {}\nNguyên liệu: {}\nCác bước: {}",
            record.title, ingredients, steps
        );

        Self {
            content,
            metadata: DocumentMetadata {
                id: record.id.clone(),
                title: record.title.clone(),
            },
        }
    }
}
