// Data-quality indicators for the catalogs and the match report
use crate::model::{Deal, MatchReport, Recipe};
use crate::utils::parse_duration_minutes;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::info;

pub const MATCH_BUCKETS: [&str; 5] = ["0-20%", "21-40%", "41-60%", "61-80%", "81-100%"];

#[derive(Debug, Clone, PartialEq)]
pub struct DealStats {
    pub total: usize,
    pub per_store: BTreeMap<String, usize>,
    pub with_images: usize,
    pub with_prices: usize,
    pub with_comparison_prices: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeStats {
    pub total: usize,
    pub per_source: BTreeMap<String, usize>,
    pub with_ratings: usize,
    pub average_rating: f64,
    pub with_images: usize,
    pub with_nutrition: usize,
    pub average_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStats {
    pub total_recipes: usize,
    pub with_matches: usize,
    pub average_match_percentage: f64,
    pub distribution: [usize; 5],
    pub data_age: Duration,
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { part as f64 / total as f64 * 100.0 }
}

pub fn deal_stats(deals: &[Deal]) -> DealStats {
    let mut per_store = BTreeMap::new();
    for deal in deals {
        let store = if deal.store.is_empty() { "Unknown" } else { deal.store.as_str() };
        *per_store.entry(store.to_string()).or_insert(0) += 1;
    }

    DealStats {
        total: deals.len(),
        per_store,
        with_images: deals.iter().filter(|d| d.image.as_ref().is_some_and(|i| !i.is_empty())).count(),
        with_prices: deals.iter().filter(|d| present(&d.price)).count(),
        with_comparison_prices: deals.iter().filter(|d| present(&d.jfr_pris)).count()
            + deals.iter().filter(|d| present(&d.ord_pris)).count(),
    }
}

pub fn recipe_stats(recipes: &[Recipe]) -> RecipeStats {
    let mut per_source = BTreeMap::new();
    for recipe in recipes {
        let source = recipe.source.clone().unwrap_or_else(|| "unknown".into());
        *per_source.entry(source).or_insert(0) += 1;
    }

    let ratings: Vec<f64> = recipes.iter().filter_map(|r| r.rating).filter(|r| *r > 0.0).collect();
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().sum::<f64>() / ratings.len() as f64
    };

    let minutes: Vec<u32> = recipes
        .iter()
        .filter_map(|r| r.time.as_deref().and_then(parse_duration_minutes))
        .collect();
    let average_minutes = (!minutes.is_empty())
        .then(|| minutes.iter().map(|m| *m as f64).sum::<f64>() / minutes.len() as f64);

    RecipeStats {
        total: recipes.len(),
        per_source,
        with_ratings: ratings.len(),
        average_rating,
        with_images: recipes.iter().filter(|r| r.image.as_ref().is_some_and(|i| !i.is_empty())).count(),
        with_nutrition: recipes.iter().filter(|r| r.nutrition.as_ref().is_some_and(|n| !n.is_empty())).count(),
        average_minutes,
    }
}

/// Index into `MATCH_BUCKETS` for a percentage.
pub fn bucket(percentage: f64) -> usize {
    match percentage {
        p if p <= 20.0 => 0,
        p if p <= 40.0 => 1,
        p if p <= 60.0 => 2,
        p if p <= 80.0 => 3,
        _ => 4,
    }
}

pub fn match_stats(report: &MatchReport, now: DateTime<Utc>) -> MatchStats {
    let mut distribution = [0; 5];
    for recipe in &report.recipes {
        distribution[bucket(recipe.match_percentage)] += 1;
    }

    let total = report.recipes.len();
    let average_match_percentage = if total == 0 {
        0.0
    } else {
        report.recipes.iter().map(|r| r.match_percentage).sum::<f64>() / total as f64
    };

    MatchStats {
        total_recipes: total,
        with_matches: report.recipes.iter().filter(|r| r.matched_count > 0).count(),
        average_match_percentage,
        distribution,
        data_age: now - report.last_updated,
    }
}

impl DealStats {
    pub fn log(&self) {
        info!(
            "Deals: {} total, {} with images ({:.1}%), {} with prices ({:.1}%), {} comparison prices",
            self.total,
            self.with_images,
            percent(self.with_images, self.total),
            self.with_prices,
            percent(self.with_prices, self.total),
            self.with_comparison_prices
        );
        let mut stores: Vec<_> = self.per_store.iter().collect();
        stores.sort_by(|a, b| b.1.cmp(a.1));
        for (store, count) in stores {
            info!("  {:30} {:>4} deals", store, count);
        }
    }
}

impl RecipeStats {
    pub fn log(&self) {
        info!(
            "Recipes: {} total, {} rated (avg {:.2}/5.0), {} with images ({:.1}%), {} with nutrition ({:.1}%)",
            self.total,
            self.with_ratings,
            self.average_rating,
            self.with_images,
            percent(self.with_images, self.total),
            self.with_nutrition,
            percent(self.with_nutrition, self.total)
        );
        if let Some(minutes) = self.average_minutes {
            info!("  Average cooking time: {:.0} min", minutes);
        }
    }
}

impl MatchStats {
    pub fn log(&self) {
        info!(
            "Match quality: {}/{} recipes with deals, average {:.1}%, data age {:.1} h",
            self.with_matches,
            self.total_recipes,
            self.average_match_percentage,
            self.data_age.num_minutes() as f64 / 60.0
        );
        for (label, count) in MATCH_BUCKETS.iter().zip(self.distribution) {
            info!(
                "  {:10} {:>4} ({:>5.1}%)",
                label,
                count,
                percent(count, self.total_recipes)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Image, MatchResult};

    #[test]
    fn deal_stats_count_per_store_and_coverage() {
        let mut with_image = Deal::new("ICA", "Kyckling", "79:-");
        with_image.image = Some(Image::One("https://img/1.jpg".into()));
        with_image.jfr_pris = Some("99:-/kg".into());
        let mut no_price = Deal::new("Coop", "Lax", "");
        no_price.ord_pris = Some("149:-".into());
        let stats = deal_stats(&[with_image, no_price, Deal::new("ICA", "Ost", "39:-")]);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.per_store["ICA"], 2);
        assert_eq!(stats.with_images, 1);
        assert_eq!(stats.with_prices, 2);
        assert_eq!(stats.with_comparison_prices, 2);
    }

    #[test]
    fn recipe_stats_average_rating_and_time() {
        let mut a = Recipe::new("A", &["x"]);
        a.rating = Some(4.0);
        a.time = Some("PT30M".into());
        a.source = Some("ica".into());
        let mut b = Recipe::new("B", &["y"]);
        b.rating = Some(5.0);
        b.time = Some("PT1H30M".into());

        let stats = recipe_stats(&[a, b]);
        assert_eq!(stats.with_ratings, 2);
        assert_eq!(stats.average_rating, 4.5);
        assert_eq!(stats.average_minutes, Some(60.0));
        assert_eq!(stats.per_source["unknown"], 1);
    }

    #[test]
    fn match_distribution_buckets() {
        assert_eq!(bucket(0.0), 0);
        assert_eq!(bucket(20.0), 0);
        assert_eq!(bucket(33.3), 1);
        assert_eq!(bucket(60.0), 2);
        assert_eq!(bucket(100.0), 4);

        let now = Utc::now();
        let recipe = Recipe::new("R", &["a", "b"]);
        let report = MatchReport {
            last_updated: now - Duration::hours(3),
            total_deals: 0,
            total_recipes: 2,
            skipped_deals: 0,
            skipped_recipes: 0,
            recipes: vec![
                MatchResult::for_recipe(&recipe, vec![], vec!["a".into(), "b".into()]),
                MatchResult::for_recipe(&recipe, vec![], vec![]),
            ],
        };
        let stats = match_stats(&report, now);
        assert_eq!(stats.distribution, [2, 0, 0, 0, 0]);
        assert_eq!(stats.with_matches, 0);
        assert_eq!(stats.data_age.num_hours(), 3);
    }
}
