use crate::config::MatchConfig;
use crate::matcher::lexicon::Lexicon;
use crate::matcher::rules::{Guard, Pair, Rule, Tuning};

/// A positive scoring outcome and the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub value: f64,
    pub rule: Rule,
}

/// Scores one normalized ingredient against one normalized deal name.
#[derive(Debug, Clone)]
pub struct MatchScorer {
    lexicon: Lexicon,
    tuning: Tuning,
}

impl MatchScorer {
    pub fn new(cfg: &MatchConfig) -> Self {
        Self {
            lexicon: Lexicon::from_config(cfg),
            tuning: Tuning {
                min_substring_len: cfg.min_substring_len,
                min_word_len: cfg.min_word_len,
                fuzzy_threshold: cfg.fuzzy_threshold,
                fuzzy_min_len: cfg.fuzzy_min_len,
            },
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Guards first, then rules in precedence order; the first rule that
    /// applies decides. `None` means no match.
    pub fn score(&self, ingredient: &str, deal: &str) -> Option<Score> {
        let pair = Pair { ingredient, deal };

        if Guard::ORDER.iter().any(|g| g.blocks(pair, &self.lexicon)) {
            return None;
        }

        Rule::ORDER.iter().find_map(|rule| {
            rule.evaluate(pair, &self.lexicon, &self.tuning)
                .map(|value| Score { value, rule: *rule })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> MatchScorer {
        MatchScorer::new(&MatchConfig::default())
    }

    #[test]
    fn exact_wins_over_everything() {
        let s = scorer().score("kyckling", "kyckling").unwrap();
        assert_eq!(s.value, 1.0);
        assert_eq!(s.rule, Rule::Exact);
    }

    #[test]
    fn false_match_overrides_substring() {
        assert_eq!(scorer().score("ris", "riskakor"), None);
        assert_eq!(scorer().score("ägg", "pålägg"), None);
    }

    #[test]
    fn ignore_words_never_match() {
        let s = scorer();
        for word in ["salt", "peppar", "olja", "socker", "vatten"] {
            assert_eq!(s.score(word, word), None, "{word} should not match");
        }
    }

    #[test]
    fn substring_beats_synonym() {
        let s = scorer().score("kycklingfile", "kyckling").unwrap();
        assert_eq!(s.rule, Rule::Substring);
        assert_eq!(s.value, 0.9);
    }

    #[test]
    fn synonym_when_no_containment() {
        let s = scorer().score("parmesan", "ost").unwrap();
        assert_eq!(s.rule, Rule::Synonym);
        assert_eq!(s.value, 0.85);
    }

    #[test]
    fn unrelated_items_do_not_match() {
        assert_eq!(scorer().score("kyckling", "banan"), None);
        assert_eq!(scorer().score("tomat", "mjölk"), None);
    }

    #[test]
    fn scores_come_from_the_fixed_tiers() {
        let tiers: Vec<f64> = Rule::ORDER.iter().map(|r| r.score()).collect();
        let pairs = [
            ("kyckling", "kyckling"),
            ("kyckling", "kycklingfile"),
            ("parmesan", "ost"),
            ("gröna bönor", "bönor frysta"),
            ("mozarella", "mozzarella"),
        ];
        for (ingredient, deal) in pairs {
            let s = scorer().score(ingredient, deal).unwrap();
            assert!(tiers.contains(&s.value));
        }
    }
}
