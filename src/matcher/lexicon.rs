use crate::config::MatchConfig;
use crate::normalizer::{canonical_term, tokens};
use std::collections::{BTreeSet, HashSet};

/// Lexical tables in canonical form, built once per run from a `MatchConfig`.
#[derive(Debug, Clone)]
pub struct Lexicon {
    synonyms: Vec<(String, Vec<String>)>,
    ignore_words: HashSet<String>,
    false_matches: Vec<(String, String)>,
    stop_words: HashSet<String>,
}

impl Lexicon {
    pub fn from_config(cfg: &MatchConfig) -> Self {
        Self {
            synonyms: cfg
                .synonyms
                .iter()
                .map(|(base, variants)| {
                    (
                        canonical_term(base),
                        variants.iter().map(|v| canonical_term(v)).collect(),
                    )
                })
                .collect(),
            ignore_words: cfg.ignore_words.iter().map(|w| canonical_term(w)).collect(),
            false_matches: cfg
                .false_matches
                .iter()
                .map(|(i, d)| (canonical_term(i), canonical_term(d)))
                .collect(),
            stop_words: cfg.stop_words.iter().map(|w| canonical_term(w)).collect(),
        }
    }

    pub fn synonyms(&self) -> &[(String, Vec<String>)] {
        &self.synonyms
    }

    pub fn false_matches(&self) -> &[(String, String)] {
        &self.false_matches
    }

    pub fn is_ignored(&self, word: &str) -> bool {
        self.ignore_words.contains(word)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Words that may carry a word-overlap match on their own.
    pub fn significant_words<'t>(&self, text: &'t str, min_len: usize) -> BTreeSet<&'t str> {
        tokens(text)
            .filter(|w| !self.is_stop_word(w) && !self.is_ignored(w))
            .filter(|w| w.chars().count() >= min_len)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_canonicalized() {
        let mut cfg = MatchConfig::default();
        cfg.synonyms.insert("Grädde".into(), vec!["Crème Fraiche".into()]);
        let lexicon = Lexicon::from_config(&cfg);

        assert!(lexicon
            .synonyms()
            .iter()
            .any(|(base, variants)| base == "grädde" && variants.contains(&"creme fraiche".to_string())));
        assert!(lexicon.is_ignored("örter"));
        assert!(lexicon.is_stop_word("på"));
    }

    #[test]
    fn significant_words_skip_short_stop_and_ignore_words() {
        let lexicon = Lexicon::from_config(&MatchConfig::default());
        let words = lexicon.significant_words("lax med salt och citron", 4);
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["citron"]);
    }
}
