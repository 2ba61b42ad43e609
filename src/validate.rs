// Data-quality checks for catalogs and match reports
use crate::model::{Deal, MatchReport, Recipe};
use std::collections::HashSet;
use thiserror::Error;

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 200;

/// A data-quality finding. None of these stop a run; they are reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Issue {
    #[error("deal catalog is empty")]
    NoDeals,
    #[error("recipe catalog is empty")]
    NoRecipes,
    #[error("deal {index}: missing '{field}'")]
    DealMissing { index: usize, field: &'static str },
    #[error("deal {index}: name too short ({len} chars)")]
    NameTooShort { index: usize, len: usize },
    #[error("deal {index}: name too long ({len} chars)")]
    NameTooLong { index: usize, len: usize },
    #[error("deal {index}: image is not an http(s) URL: {url}")]
    DealImage { index: usize, url: String },
    #[error("deal {index}: duplicate (store={store}, name={name})")]
    Duplicate {
        index: usize,
        store: String,
        name: String,
    },
    #[error("recipe {index}: missing '{field}'")]
    RecipeMissing { index: usize, field: &'static str },
    #[error("recipe {index}: url is not an http(s) URL: {url}")]
    RecipeUrl { index: usize, url: String },
    #[error("recipe {index}: '{field}' should be non-negative")]
    Negative { index: usize, field: &'static str },
    #[error("match {index}: match_percentage out of range (got {value})")]
    PercentageOutOfRange { index: usize, value: f64 },
    #[error("match {index}: matched_count ({matched}) > total_ingredients ({total})")]
    CountMismatch {
        index: usize,
        matched: usize,
        total: usize,
    },
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub fn validate_deals(deals: &[Deal]) -> Vec<Issue> {
    let mut issues = Vec::new();
    if deals.is_empty() {
        issues.push(Issue::NoDeals);
    }

    let mut seen = HashSet::new();
    for (index, deal) in deals.iter().enumerate() {
        if deal.store.trim().is_empty() {
            issues.push(Issue::DealMissing { index, field: "store" });
        }
        if deal.name.trim().is_empty() {
            issues.push(Issue::DealMissing { index, field: "name" });
        } else {
            let len = deal.name.chars().count();
            if len < MIN_NAME_LEN {
                issues.push(Issue::NameTooShort { index, len });
            }
            if len > MAX_NAME_LEN {
                issues.push(Issue::NameTooLong { index, len });
            }
        }

        if let Some(image) = &deal.image {
            for url in image.urls() {
                if !url.is_empty() && !is_http(url) {
                    issues.push(Issue::DealImage { index, url: url.to_string() });
                }
            }
        }

        if !seen.insert((deal.store.as_str(), deal.name.as_str())) {
            issues.push(Issue::Duplicate {
                index,
                store: deal.store.clone(),
                name: deal.name.clone(),
            });
        }
    }
    issues
}

pub fn validate_recipes(recipes: &[Recipe]) -> Vec<Issue> {
    let mut issues = Vec::new();
    if recipes.is_empty() {
        issues.push(Issue::NoRecipes);
    }

    for (index, recipe) in recipes.iter().enumerate() {
        if recipe.name.trim().is_empty() {
            issues.push(Issue::RecipeMissing { index, field: "name" });
        }
        if recipe.url.trim().is_empty() {
            issues.push(Issue::RecipeMissing { index, field: "url" });
        } else if !is_http(&recipe.url) {
            issues.push(Issue::RecipeUrl { index, url: recipe.url.clone() });
        }
        if recipe.rating.is_some_and(|r| r < 0.0) {
            issues.push(Issue::Negative { index, field: "rating" });
        }
    }
    issues
}

pub fn validate_report(report: &MatchReport) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (index, result) in report.recipes.iter().enumerate() {
        let value = result.match_percentage;
        if !(0.0..=100.0).contains(&value) {
            issues.push(Issue::PercentageOutOfRange { index, value });
        }
        if result.matched_count > result.total_ingredients {
            issues.push(Issue::CountMismatch {
                index,
                matched: result.matched_count,
                total: result.total_ingredients,
            });
        }
    }
    issues
}
