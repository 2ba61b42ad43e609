use crate::matcher::scorer::Score;
use crate::matcher::MatchEngine;
use crate::model::Deal;
use tracing::debug;

/// A deal with its name normalized once per run.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub deal: Deal,
    pub text: String,
}

/// The deal side of a run, shared read-only by every recipe.
#[derive(Debug, Clone, Default)]
pub struct DealCatalog {
    entries: Vec<CatalogEntry>,
}

impl DealCatalog {
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DealMatch<'c> {
    pub deal: &'c Deal,
    pub score: Score,
}

impl MatchEngine {
    pub fn catalog(&self, deals: Vec<Deal>) -> DealCatalog {
        let entries = deals
            .into_iter()
            .map(|deal| CatalogEntry {
                text: self.normalize(&deal.name),
                deal,
            })
            .collect();
        DealCatalog { entries }
    }

    /// Highest-scoring deal for an already normalized ingredient, before the
    /// acceptance threshold is applied. Ties keep the earliest deal.
    pub fn best_candidate<'c>(&self, ingredient: &str, catalog: &'c DealCatalog) -> Option<DealMatch<'c>> {
        let mut best: Option<DealMatch<'c>> = None;

        for entry in catalog.entries() {
            let Some(score) = self.scorer.score(ingredient, &entry.text) else {
                continue;
            };
            if best.is_none_or(|b| score.value > b.score.value) {
                best = Some(DealMatch { deal: &entry.deal, score });
            }
            // Nothing can beat an exact hit, and later ties lose anyway.
            if score.value >= 1.0 {
                break;
            }
        }

        best
    }

    /// Best candidate accepted only at or above the acceptance threshold.
    pub fn select<'c>(&self, ingredient: &str, catalog: &'c DealCatalog) -> Option<DealMatch<'c>> {
        let normalized = self.normalize(ingredient);
        let candidate = self.best_candidate(&normalized, catalog)?;

        if candidate.score.value >= self.acceptance_threshold {
            debug!(
                "'{}' -> '{}' [{}] {:.2} via {:?}",
                ingredient, candidate.deal.name, candidate.deal.store, candidate.score.value, candidate.score.rule
            );
            Some(candidate)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::matcher::{Matcher, Rule};

    fn engine_with_threshold(threshold: f64) -> MatchEngine {
        let cfg = MatchConfig {
            acceptance_threshold: threshold,
            ..MatchConfig::default()
        };
        MatchEngine::new(&cfg).unwrap()
    }

    #[test]
    fn ties_keep_catalog_order() {
        let engine = engine_with_threshold(0.6);
        let catalog = engine.catalog(vec![
            Deal::new("Willys", "Kyckling", "75:-"),
            Deal::new("ICA", "Kyckling", "79:-"),
        ]);

        let best = engine.best_deal("kyckling", &catalog).unwrap();
        assert_eq!(best.deal.store, "Willys");
    }

    #[test]
    fn higher_tier_beats_earlier_deal() {
        let engine = engine_with_threshold(0.6);
        let catalog = engine.catalog(vec![
            Deal::new("ICA", "Kycklingbröst", "99:-"),
            Deal::new("Coop", "Riven ost", "39:-"),
            Deal::new("Willys", "Parmesan", "45:-"),
        ]);

        let best = engine.best_deal("parmesan", &catalog).unwrap();
        assert_eq!(best.deal.store, "Willys");
        assert_eq!(best.score.rule, Rule::Exact);
    }

    #[test]
    fn threshold_is_inclusive() {
        let deals = vec![Deal::new("ICA", "Mozzarella", "25:-")];

        let at = engine_with_threshold(0.7);
        let catalog = at.catalog(deals.clone());
        let hit = at.best_deal("mozarella", &catalog).unwrap();
        assert_eq!(hit.score.value, 0.7);
        assert_eq!(hit.score.rule, Rule::Fuzzy);

        let above = engine_with_threshold(0.7 + 1e-9);
        let catalog = above.catalog(deals);
        assert!(above.best_deal("mozarella", &catalog).is_none());
    }

    #[test]
    fn synonym_tier_boundary() {
        let deals = vec![Deal::new("Coop", "Ost", "59:-")];

        let at = engine_with_threshold(0.85);
        assert!(at.best_deal("parmesan", &at.catalog(deals.clone())).is_some());

        let above = engine_with_threshold(0.85 + 1e-9);
        assert!(above.best_deal("parmesan", &above.catalog(deals)).is_none());
    }

    #[test]
    fn candidate_below_threshold_is_still_reported() {
        let engine = engine_with_threshold(0.9);
        let catalog = engine.catalog(vec![Deal::new("Coop", "Ost", "59:-")]);
        let candidate = engine.best_candidate("parmesan", &catalog).unwrap();
        assert_eq!(candidate.score.value, 0.85);
        assert!(engine.best_deal("parmesan", &catalog).is_none());
    }
}
