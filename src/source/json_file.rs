// Catalog loading from the JSON files the scrapers write
use crate::model::{Deal, Recipe, RecordError, SourceError};
use crate::source::traits::{CatalogSource, Loaded};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

pub struct JsonFileSource {
    deals_path: String,
    recipes_path: String,
}

impl JsonFileSource {
    pub fn new(deals_path: &str, recipes_path: &str) -> Self {
        Self {
            deals_path: deals_path.to_string(),
            recipes_path: recipes_path.to_string(),
        }
    }

    async fn read(path: &str) -> Result<String, SourceError> {
        fs::read_to_string(path).await.map_err(|source| SourceError::Io {
            path: path.to_string(),
            source,
        })
    }
}

/// Decodes a JSON array one element at a time so a single bad record is
/// rejected instead of failing the whole catalog.
pub fn decode_records<T: DeserializeOwned>(
    path: &str,
    content: &str,
    reject: fn(usize, String) -> RecordError,
) -> Result<Loaded<T>, SourceError> {
    let root: Value = serde_json::from_str(content).map_err(|source| SourceError::Json {
        path: path.to_string(),
        source,
    })?;
    let Value::Array(items) = root else {
        return Err(SourceError::NotAnArray { path: path.to_string() });
    };

    let mut records = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                let err = reject(index, e.to_string());
                warn!("{}: dropping undecodable {}", path, err);
                rejected.push(err);
            }
        }
    }

    info!("Loaded {} records from {} ({} rejected)", records.len(), path, rejected.len());
    Ok(Loaded { records, rejected })
}

fn reject_deal(index: usize, reason: String) -> RecordError {
    RecordError::Deal { index, reason }
}

fn reject_recipe(index: usize, reason: String) -> RecordError {
    RecordError::Recipe { index, reason }
}

#[async_trait::async_trait]
impl CatalogSource for JsonFileSource {
    async fn load_deals(&self) -> Result<Loaded<Deal>, SourceError> {
        let content = Self::read(&self.deals_path).await?;
        decode_records(&self.deals_path, &content, reject_deal)
    }

    async fn load_recipes(&self) -> Result<Loaded<Recipe>, SourceError> {
        let content = Self::read(&self.recipes_path).await?;
        decode_records(&self.recipes_path, &content, reject_recipe)
    }
}
