use crate::model::{Deal, Recipe, RecordError, SourceError};

/// Records decoded from a catalog plus the ones that had to be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RecordError>,
}

#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_deals(&self) -> Result<Loaded<Deal>, SourceError>;
    async fn load_recipes(&self) -> Result<Loaded<Recipe>, SourceError>;
}
