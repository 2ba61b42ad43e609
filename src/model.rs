// Core structs: Deal, Recipe, MatchResult, MatchReport and the error enums
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A discounted product observation from a store flyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default)]
    pub store: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ord_pris: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jfr_pris: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

impl Deal {
    pub fn new(store: &str, name: &str, price: &str) -> Self {
        Self {
            store: store.to_string(),
            name: name.to_string(),
            price: Some(price.to_string()),
            unit: None,
            description: None,
            ord_pris: None,
            jfr_pris: None,
            image: None,
        }
    }
}

/// Image reference: scrapers emit either a single URL or a list of URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Image {
    One(String),
    Many(Vec<String>),
}

impl Image {
    pub fn urls(&self) -> Vec<&str> {
        match self {
            Image::One(url) => vec![url.as_str()],
            Image::Many(urls) => urls.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.urls().iter().all(|u| u.trim().is_empty())
    }
}

/// Servings as published: a plain count or free text such as "2-4" or "8 våfflor".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Servings {
    Count(serde_json::Number),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<String>,
}

impl Nutrition {
    pub fn is_empty(&self) -> bool {
        self.calories.is_none() && self.protein.is_none() && self.fat.is_none() && self.carbs.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "ica_category", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<Servings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplified_ingredients: Option<Vec<String>>,
}

impl Recipe {
    pub fn new(name: &str, ingredients: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            ingredients: Some(ingredients.iter().map(|i| i.to_string()).collect()),
            ..Self::default()
        }
    }

    /// The list the matcher works on. Recipe scrapers write a cleaned
    /// `simplified_ingredients` list next to the raw one; it wins when present.
    pub fn ingredient_list(&self) -> Option<&[String]> {
        self.simplified_ingredients
            .as_deref()
            .or(self.ingredients.as_deref())
    }
}

/// One ingredient paired with the deal that covers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedIngredient {
    pub ingredient: String,
    pub deal_name: String,
    pub deal_store: String,
    pub deal_price: Option<String>,
    pub deal_unit: Option<String>,
    pub ord_pris: Option<String>,
    pub jfr_pris: Option<String>,
    #[serde(alias = "match_score")]
    pub score: f64,
}

impl MatchedIngredient {
    pub fn new(ingredient: &str, deal: &Deal, score: f64) -> Self {
        Self {
            ingredient: ingredient.to_string(),
            deal_name: deal.name.clone(),
            deal_store: deal.store.clone(),
            deal_price: deal.price.clone(),
            deal_unit: deal.unit.clone(),
            ord_pris: deal.ord_pris.clone(),
            jfr_pris: deal.jfr_pris.clone(),
            score,
        }
    }
}

/// Per-recipe outcome: display metadata plus the matched/unmatched split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub name: String,
    pub url: String,
    pub image: Option<Image>,
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub time: Option<String>,
    pub servings: Option<Servings>,
    pub rating: Option<f64>,
    pub reviews: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    pub total_ingredients: usize,
    pub matched_count: usize,
    pub match_percentage: f64,
    pub matched_ingredients: Vec<MatchedIngredient>,
    pub unmatched_ingredients: Vec<String>,
}

impl MatchResult {
    pub fn for_recipe(
        recipe: &Recipe,
        matched: Vec<MatchedIngredient>,
        unmatched: Vec<String>,
    ) -> Self {
        let total = matched.len() + unmatched.len();
        let match_percentage = if total == 0 {
            0.0
        } else {
            matched.len() as f64 / total as f64 * 100.0
        };

        Self {
            name: recipe.name.clone(),
            url: recipe.url.clone(),
            image: recipe.image.clone(),
            category: recipe.category.clone(),
            source: recipe.source.clone(),
            time: recipe.time.clone(),
            servings: recipe.servings.clone(),
            rating: recipe.rating,
            reviews: recipe.reviews,
            nutrition: recipe.nutrition.clone(),
            total_ingredients: total,
            matched_count: matched.len(),
            match_percentage,
            matched_ingredients: matched,
            unmatched_ingredients: unmatched,
        }
    }

    /// Stable sort of the matched bucket by descending score.
    pub fn rank_matches(&mut self) {
        self.matched_ingredients.sort_by(|a, b| b.score.total_cmp(&a.score));
    }
}

/// The artifact written to `recipe_matches.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub last_updated: DateTime<Utc>,
    pub total_deals: usize,
    pub total_recipes: usize,
    #[serde(default)]
    pub skipped_deals: usize,
    #[serde(default)]
    pub skipped_recipes: usize,
    pub recipes: Vec<MatchResult>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{name} must be a number within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("{0} must be at least 1")]
    ZeroLength(&'static str),
    #[error("malformed synonym table: {0}")]
    Synonyms(String),
    #[error("malformed false-match table: {0}")]
    FalseMatches(String),
    #[error("{0} contains an empty entry")]
    EmptyWord(&'static str),
    #[error("invalid normalization pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A single deal or recipe that failed shape validation. Recoverable: the
/// record is dropped and the batch continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("deal #{index}: {reason}")]
    Deal { index: usize, reason: String },
    #[error("recipe #{index}: {reason}")]
    Recipe { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: root element must be an array")]
    NotAnArray { path: String },
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("matching worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid stored timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
}

/// Anything that aborts a batch run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
