use crate::matcher::MatchEngine;
use crate::matcher::Matcher;
use crate::matcher::selector::DealCatalog;
use crate::model::{Deal, MatchError, MatchReport, MatchResult, Recipe, RecordError};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Records that survived shape validation, ready for matching.
pub struct Intake {
    pub catalog: DealCatalog,
    pub recipes: Vec<Recipe>,
    pub skipped_deals: usize,
    pub skipped_recipes: usize,
}

fn check_deal(index: usize, deal: &Deal) -> Result<(), RecordError> {
    if deal.name.trim().is_empty() {
        return Err(RecordError::Deal { index, reason: "missing name".into() });
    }
    if deal.store.trim().is_empty() {
        return Err(RecordError::Deal { index, reason: "missing store".into() });
    }
    Ok(())
}

fn check_recipe(index: usize, recipe: &Recipe) -> Result<(), RecordError> {
    if recipe.ingredient_list().is_none() {
        return Err(RecordError::Recipe {
            index,
            reason: format!("'{}' has no ingredient list", recipe.name),
        });
    }
    Ok(())
}

impl MatchEngine {
    /// Drops malformed records with a warning instead of failing the batch.
    pub fn intake(&self, deals: &[Deal], recipes: &[Recipe]) -> Intake {
        let mut skipped_deals = 0;
        let mut valid_deals = Vec::with_capacity(deals.len());
        for (index, deal) in deals.iter().enumerate() {
            match check_deal(index, deal) {
                Ok(()) => valid_deals.push(deal.clone()),
                Err(e) => {
                    warn!("Skipping {}", e);
                    skipped_deals += 1;
                }
            }
        }

        let mut skipped_recipes = 0;
        let mut valid_recipes = Vec::with_capacity(recipes.len());
        for (index, recipe) in recipes.iter().enumerate() {
            match check_recipe(index, recipe) {
                Ok(()) => valid_recipes.push(recipe.clone()),
                Err(e) => {
                    warn!("Skipping {}", e);
                    skipped_recipes += 1;
                }
            }
        }

        Intake {
            catalog: self.catalog(valid_deals),
            recipes: valid_recipes,
            skipped_deals,
            skipped_recipes,
        }
    }

    pub fn run(&self, deals: &[Deal], recipes: &[Recipe]) -> MatchReport {
        self.run_at(deals, recipes, Utc::now())
    }

    /// Same as `run` with a caller-supplied timestamp, which makes the whole
    /// report a pure function of its inputs.
    pub fn run_at(&self, deals: &[Deal], recipes: &[Recipe], now: DateTime<Utc>) -> MatchReport {
        let intake = self.intake(deals, recipes);
        let results = intake
            .recipes
            .iter()
            .map(|recipe| self.match_recipe(recipe, &intake.catalog))
            .collect();
        self.finish(intake, results, now)
    }

    /// Matches contiguous recipe chunks on the blocking pool. Output order
    /// and content are identical to `run_at`.
    pub async fn run_parallel(
        self: &Arc<Self>,
        deals: &[Deal],
        recipes: &[Recipe],
        workers: usize,
        now: DateTime<Utc>,
    ) -> Result<MatchReport, MatchError> {
        let mut intake = self.intake(deals, recipes);
        let catalog = Arc::new(std::mem::take(&mut intake.catalog));
        let chunk_size = intake.recipes.len().div_ceil(workers.max(1)).max(1);

        let tasks: Vec<_> = intake
            .recipes
            .chunks(chunk_size)
            .map(|chunk| {
                let chunk = chunk.to_vec();
                let engine = Arc::clone(self);
                let catalog = Arc::clone(&catalog);
                tokio::task::spawn_blocking(move || {
                    chunk
                        .iter()
                        .map(|recipe| engine.match_recipe(recipe, &catalog))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut results = Vec::with_capacity(intake.recipes.len());
        for joined in join_all(tasks).await {
            results.extend(joined?);
        }

        intake.catalog = Arc::unwrap_or_clone(catalog);
        Ok(self.finish(intake, results, now))
    }

    fn finish(&self, intake: Intake, mut results: Vec<MatchResult>, now: DateTime<Utc>) -> MatchReport {
        if self.rank_matches {
            results.iter_mut().for_each(MatchResult::rank_matches);
        }

        let with_matches = results.iter().filter(|r| r.matched_count > 0).count();
        info!(
            "Matched {} recipes against {} deals ({} with at least one deal, skipped {} deals / {} recipes)",
            results.len(),
            intake.catalog.len(),
            with_matches,
            intake.skipped_deals,
            intake.skipped_recipes
        );

        MatchReport {
            last_updated: now,
            total_deals: intake.catalog.len(),
            total_recipes: results.len(),
            skipped_deals: intake.skipped_deals,
            skipped_recipes: intake.skipped_recipes,
            recipes: results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;

    fn engine() -> MatchEngine {
        MatchEngine::new(&MatchConfig::default()).unwrap()
    }

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-05T06:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let deals = vec![
            Deal::new("ICA", "Kycklingfilé", "89:-"),
            Deal::new("ICA", "  ", "10:-"),
            Deal::new("", "Laxfilé", "129:-"),
        ];
        let broken = Recipe {
            name: "Utan lista".into(),
            ..Recipe::default()
        };
        let recipes = vec![Recipe::new("Gryta", &["kyckling"]), broken];

        let report = engine().run_at(&deals, &recipes, fixed_time());

        assert_eq!(report.total_deals, 1);
        assert_eq!(report.skipped_deals, 2);
        assert_eq!(report.total_recipes, 1);
        assert_eq!(report.skipped_recipes, 1);
        assert_eq!(report.recipes[0].matched_count, 1);
    }

    #[test]
    fn empty_catalogs_yield_empty_report() {
        let report = engine().run_at(&[], &[], fixed_time());
        assert_eq!(report.total_deals, 0);
        assert_eq!(report.total_recipes, 0);
        assert!(report.recipes.is_empty());

        let report = engine().run_at(&[], &[Recipe::new("Gryta", &["kyckling"])], fixed_time());
        assert_eq!(report.recipes[0].matched_count, 0);
        assert_eq!(report.recipes[0].unmatched_ingredients, vec!["kyckling".to_string()]);
    }

    #[test]
    fn ranked_matches_are_stable_by_score() {
        let deals = vec![
            Deal::new("ICA", "Parmesan", "45:-"),
            Deal::new("Coop", "Kyckling", "79:-"),
            Deal::new("Willys", "Laxfilé", "99:-"),
        ];
        let recipes = vec![Recipe::new("Mix", &["riven ost", "kyckling", "laxfilé"])];

        let report = engine().run_at(&deals, &recipes, fixed_time());
        let order: Vec<_> = report.recipes[0]
            .matched_ingredients
            .iter()
            .map(|m| (m.ingredient.as_str(), m.score))
            .collect();

        assert_eq!(order, vec![("kyckling", 1.0), ("laxfilé", 1.0), ("riven ost", 0.85)]);
    }

    #[test]
    fn ranking_can_be_turned_off() {
        let cfg = MatchConfig {
            rank_matches: false,
            ..MatchConfig::default()
        };
        let deals = vec![Deal::new("ICA", "Parmesan", "45:-"), Deal::new("Coop", "Kyckling", "79:-")];
        let recipes = vec![Recipe::new("Mix", &["riven ost", "kyckling"])];

        let report = MatchEngine::new(&cfg).unwrap().run_at(&deals, &recipes, fixed_time());
        assert_eq!(report.recipes[0].matched_ingredients[0].ingredient, "riven ost");
    }

    #[tokio::test]
    async fn parallel_run_equals_sequential_run() {
        let engine = Arc::new(engine());
        let deals = vec![
            Deal::new("ICA", "Kycklingfilé", "89:-"),
            Deal::new("Coop", "Riven ost", "39:-"),
            Deal::new("Willys", "Krossade tomater", "12:-"),
        ];
        let recipes: Vec<Recipe> = (0..13)
            .map(|i| match i % 3 {
                0 => Recipe::new(&format!("r{i}"), &["kyckling", "grädde"]),
                1 => Recipe::new(&format!("r{i}"), &["parmesan", "2 burkar krossade tomater"]),
                _ => Recipe::new(&format!("r{i}"), &[]),
            })
            .collect();

        let sequential = engine.run_at(&deals, &recipes, fixed_time());
        for workers in [1, 3, 8, 32] {
            let parallel = engine
                .run_parallel(&deals, &recipes, workers, fixed_time())
                .await
                .unwrap();
            assert_eq!(parallel, sequential, "workers = {workers}");
        }
    }
}
