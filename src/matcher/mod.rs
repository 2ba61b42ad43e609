// Matcher module: pairs recipe ingredients with current deals.

pub mod aggregator;
pub mod lexicon;
pub mod orchestrator;
pub mod rules;
pub mod scorer;
pub mod selector;

use crate::config::MatchConfig;
use crate::model::{ConfigError, MatchResult, Recipe};
use crate::normalizer::Normalizer;

pub use rules::{Guard, Rule};
pub use scorer::{MatchScorer, Score};
pub use selector::{DealCatalog, DealMatch};

/// Trait defining the interface for an ingredient-to-deal matcher.
pub trait Matcher {
    /// Best deal for one raw ingredient line, if it clears the acceptance threshold.
    fn best_deal<'c>(&self, ingredient: &str, catalog: &'c DealCatalog) -> Option<DealMatch<'c>>;
    fn match_recipe(&self, recipe: &Recipe, catalog: &DealCatalog) -> MatchResult;
}

/// Immutable matching setup: normalizer, compiled lexicon and thresholds.
/// Built once and shared by reference (or `Arc`) for a whole run.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    normalizer: Normalizer,
    scorer: MatchScorer,
    acceptance_threshold: f64,
    rank_matches: bool,
}

impl MatchEngine {
    pub fn new(cfg: &MatchConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            normalizer: Normalizer::new(&cfg.descriptor_prefixes, &cfg.descriptor_suffixes)?,
            scorer: MatchScorer::new(cfg),
            acceptance_threshold: cfg.acceptance_threshold,
            rank_matches: cfg.rank_matches,
        })
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }
}

impl Matcher for MatchEngine {
    fn best_deal<'c>(&self, ingredient: &str, catalog: &'c DealCatalog) -> Option<DealMatch<'c>> {
        self.select(ingredient, catalog)
    }

    fn match_recipe(&self, recipe: &Recipe, catalog: &DealCatalog) -> MatchResult {
        self.aggregate(recipe, catalog)
    }
}
