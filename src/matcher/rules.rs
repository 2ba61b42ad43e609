// Ordered guards and scoring rules. Guards veto a pair outright; rules are
// tried in `Rule::ORDER` and the first applicable one sets the score.
use crate::matcher::lexicon::Lexicon;
use crate::normalizer::tokens;
use strsim::normalized_levenshtein;

/// Length and similarity knobs the rules read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub min_substring_len: usize,
    pub min_word_len: usize,
    pub fuzzy_threshold: f64,
    pub fuzzy_min_len: usize,
}

/// Both sides of a comparison, already normalized.
#[derive(Debug, Clone, Copy)]
pub struct Pair<'a> {
    pub ingredient: &'a str,
    pub deal: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    FalseMatch,
    IgnoreWord,
}

impl Guard {
    pub const ORDER: [Guard; 2] = [Guard::FalseMatch, Guard::IgnoreWord];

    pub fn blocks(self, pair: Pair<'_>, lexicon: &Lexicon) -> bool {
        match self {
            // A denylisted pair only fires when the ingredient does not name
            // the deal product itself ("riskakor" still matches "Riskakor").
            Guard::FalseMatch => lexicon.false_matches().iter().any(|(ing_term, deal_term)| {
                pair.ingredient.contains(ing_term.as_str())
                    && pair.deal.contains(deal_term.as_str())
                    && !pair.ingredient.contains(deal_term.as_str())
            }),
            Guard::IgnoreWord => {
                let mut words = tokens(pair.ingredient)
                    .filter(|w| !lexicon.is_stop_word(w))
                    .peekable();
                words.peek().is_none() || words.all(|w| lexicon.is_ignored(w))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Exact,
    Substring,
    Synonym,
    WordOverlap,
    Fuzzy,
}

impl Rule {
    pub const ORDER: [Rule; 5] = [
        Rule::Exact,
        Rule::Substring,
        Rule::Synonym,
        Rule::WordOverlap,
        Rule::Fuzzy,
    ];

    pub fn score(self) -> f64 {
        match self {
            Rule::Exact => 1.0,
            Rule::Substring => 0.9,
            Rule::Synonym => 0.85,
            Rule::WordOverlap => 0.75,
            Rule::Fuzzy => 0.7,
        }
    }

    /// The rule's fixed score when it applies to the pair, `None` otherwise.
    pub fn evaluate(self, pair: Pair<'_>, lexicon: &Lexicon, tuning: &Tuning) -> Option<f64> {
        let applies = match self {
            Rule::Exact => pair.ingredient == pair.deal,
            Rule::Substring => {
                let (short, long) = if char_len(pair.ingredient) <= char_len(pair.deal) {
                    (pair.ingredient, pair.deal)
                } else {
                    (pair.deal, pair.ingredient)
                };
                char_len(short) >= tuning.min_substring_len && long.contains(short)
            }
            Rule::Synonym => lexicon.synonyms().iter().any(|(base, variants)| {
                names(pair.deal, base, variants) && names(pair.ingredient, base, variants)
            }),
            Rule::WordOverlap => {
                let ingredient_words = lexicon.significant_words(pair.ingredient, tuning.min_word_len);
                let deal_words = lexicon.significant_words(pair.deal, tuning.min_word_len);
                !ingredient_words.is_disjoint(&deal_words)
            }
            Rule::Fuzzy => {
                char_len(pair.ingredient) > tuning.fuzzy_min_len
                    && char_len(pair.deal) > tuning.fuzzy_min_len
                    && normalized_levenshtein(pair.ingredient, pair.deal) >= tuning.fuzzy_threshold
            }
        };
        applies.then(|| self.score())
    }
}

/// True when `text` is the base term or equals/contains one of its variants.
fn names(text: &str, base: &str, variants: &[String]) -> bool {
    text == base || variants.iter().any(|v| text == v || text.contains(v.as_str()))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
