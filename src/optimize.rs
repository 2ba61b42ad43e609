// Compact form of the match report for the frontend
use crate::model::{Image, MatchReport, MatchResult, MatchedIngredient, Nutrition, Servings};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedReport {
    pub last_updated: DateTime<Utc>,
    pub total_deals: usize,
    pub total_recipes: usize,
    /// Store names sorted; matched ingredients refer to them by position.
    pub stores: Vec<String>,
    pub recipes: Vec<OptimizedRecipe>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedRecipe {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<Servings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    pub total_ingredients: usize,
    pub matched_count: usize,
    pub match_percentage: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_ingredients: Vec<OptimizedIngredient>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unmatched_ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizedIngredient {
    pub ingredient: String,
    pub deal_name: String,
    /// Position in `stores`; absent when the deal carried no store name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ord_pris: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jfr_pris: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub score: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

fn optimize_ingredient(
    matched: &MatchedIngredient,
    store_ids: &BTreeMap<&str, usize>,
) -> OptimizedIngredient {
    OptimizedIngredient {
        ingredient: matched.ingredient.clone(),
        deal_name: matched.deal_name.clone(),
        store_id: store_ids.get(matched.deal_store.as_str()).copied(),
        price: non_empty(&matched.deal_price),
        ord_pris: non_empty(&matched.ord_pris),
        jfr_pris: non_empty(&matched.jfr_pris),
        unit: non_empty(&matched.deal_unit),
        score: round_to(matched.score, 2),
    }
}

fn optimize_recipe(result: &MatchResult, store_ids: &BTreeMap<&str, usize>) -> OptimizedRecipe {
    OptimizedRecipe {
        name: result.name.clone(),
        url: result.url.clone(),
        image: result.image.clone().filter(|i| !i.is_empty()),
        category: non_empty(&result.category),
        source: non_empty(&result.source),
        time: non_empty(&result.time),
        servings: result.servings.clone(),
        rating: result.rating.filter(|r| *r > 0.0),
        reviews: result.reviews.filter(|r| *r > 0),
        nutrition: result.nutrition.clone().filter(|n| !n.is_empty()),
        total_ingredients: result.total_ingredients,
        matched_count: result.matched_count,
        match_percentage: round_to(result.match_percentage, 1),
        matched_ingredients: result
            .matched_ingredients
            .iter()
            .map(|m| optimize_ingredient(m, store_ids))
            .collect(),
        unmatched_ingredients: result.unmatched_ingredients.clone(),
    }
}

pub fn optimize(report: &MatchReport) -> OptimizedReport {
    let stores: BTreeSet<&str> = report
        .recipes
        .iter()
        .flat_map(|r| &r.matched_ingredients)
        .map(|m| m.deal_store.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    let store_ids: BTreeMap<&str, usize> = stores.iter().enumerate().map(|(id, s)| (*s, id)).collect();

    OptimizedReport {
        last_updated: report.last_updated,
        total_deals: report.total_deals,
        total_recipes: report.total_recipes,
        stores: stores.iter().map(|s| s.to_string()).collect(),
        recipes: report.recipes.iter().map(|r| optimize_recipe(r, &store_ids)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Deal, Recipe};
    use serde_json::json;

    fn report() -> MatchReport {
        let mut recipe = Recipe::new("Kycklinggryta", &["kycklingfilé", "grädde", "salt"]);
        recipe.url = "https://www.ica.se/recept/gryta".into();
        recipe.category = Some(String::new());
        let mut cream = Deal::new("Coop", "Vispgrädde", "25:-");
        cream.jfr_pris = Some("50:-/l".into());
        let matched = vec![
            MatchedIngredient::new("kycklingfilé", &Deal::new("ICA Maxi", "Kycklingfilé", "89:-"), 1.0),
            MatchedIngredient::new("grädde", &cream, 0.8500001),
        ];

        MatchReport {
            last_updated: "2026-01-05T06:00:00Z".parse().unwrap(),
            total_deals: 2,
            total_recipes: 1,
            skipped_deals: 0,
            skipped_recipes: 0,
            recipes: vec![MatchResult::for_recipe(&recipe, matched, vec!["salt".into()])],
        }
    }

    #[test]
    fn stores_are_indexed_in_sorted_order() {
        let optimized = optimize(&report());

        assert_eq!(optimized.stores, vec!["Coop", "ICA Maxi"]);
        let matched = &optimized.recipes[0].matched_ingredients;
        assert_eq!(matched[0].store_id, Some(1));
        assert_eq!(matched[1].store_id, Some(0));
        assert_eq!(matched[1].score, 0.85);
        assert_eq!(optimized.recipes[0].match_percentage, 66.7);
    }

    #[test]
    fn empty_fields_are_omitted() {
        let value = serde_json::to_value(optimize(&report())).unwrap();
        let recipe = &value["recipes"][0];

        assert!(recipe.get("category").is_none());
        assert!(recipe.get("image").is_none());
        assert_eq!(
            recipe["matched_ingredients"][1],
            json!({
                "ingredient": "grädde",
                "deal_name": "Vispgrädde",
                "store_id": 0,
                "price": "25:-",
                "jfr_pris": "50:-/l",
                "score": 0.85
            })
        );
        assert_eq!(value["last_updated"], "2026-01-05T06:00:00Z");
    }

    #[test]
    fn storeless_match_gets_no_store_id() {
        let mut report = report();
        let recipe = Recipe::new("Sallad", &["gurka"]);
        let matched = vec![MatchedIngredient::new("gurka", &Deal::new("", "Gurka", "10:-"), 1.0)];
        report.recipes.push(MatchResult::for_recipe(&recipe, matched, vec![]));

        let optimized = optimize(&report);

        assert_eq!(optimized.stores, vec!["Coop", "ICA Maxi"]);
        assert_eq!(optimized.recipes[1].matched_ingredients[0].store_id, None);
        let value = serde_json::to_value(&optimized).unwrap();
        assert!(value["recipes"][1]["matched_ingredients"][0].get("store_id").is_none());
    }
}
