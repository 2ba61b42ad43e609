use crate::matcher::MatchEngine;
use crate::matcher::selector::DealCatalog;
use crate::model::{MatchResult, MatchedIngredient, Recipe};

impl MatchEngine {
    /// Walks the ingredients in order and splits them into matched and
    /// unmatched, keeping original order inside each bucket. A recipe without
    /// an ingredient list aggregates as empty.
    pub fn aggregate(&self, recipe: &Recipe, catalog: &DealCatalog) -> MatchResult {
        let ingredients = recipe.ingredient_list().unwrap_or_default();
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();

        for ingredient in ingredients {
            match self.select(ingredient, catalog) {
                Some(m) => matched.push(MatchedIngredient::new(ingredient, m.deal, m.score.value)),
                None => unmatched.push(ingredient.clone()),
            }
        }

        MatchResult::for_recipe(recipe, matched, unmatched)
    }
}
