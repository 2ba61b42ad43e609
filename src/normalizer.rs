// Text normalization shared by ingredient lines and deal names
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const PARENS: &str = r"\([^)]*\)";
const PACK_SIZE: &str = r"\s*à\s*\d+(?:[.,]\d+)?\s*\w*";
const LEADING_QUANTITY: &str = r"^(?:ca\.?\s+)?[\d½¼¾⅓⅔][\d½¼¾⅓⅔/.,\s–-]*(?:(?:g|kg|hg|dl|cl|ml|l|msk|tsk|krm|st|port|burk|burkar|paket|förp|klyfta|klyftor|skiva|skivor|knippe|kruka|nypa)\b\.?\s*)?";
const TRAILING_SIZE: &str = r"\s*(?:ca\.?\s*)?\d+(?:[.,]\d+)?\s*(?:g|kg|hg|ml|cl|dl|l|st)\.?$";

/// Produces the comparable form of ingredient lines and deal names.
#[derive(Debug, Clone)]
pub struct Normalizer {
    parens: Regex,
    pack_size: Regex,
    leading_quantity: Regex,
    trailing_size: Regex,
    prefixes: HashSet<String>,
    suffixes: HashSet<String>,
}

impl Normalizer {
    pub fn new(prefixes: &[String], suffixes: &[String]) -> Result<Self, regex::Error> {
        Ok(Self {
            parens: Regex::new(PARENS)?,
            pack_size: Regex::new(PACK_SIZE)?,
            leading_quantity: Regex::new(LEADING_QUANTITY)?,
            trailing_size: Regex::new(TRAILING_SIZE)?,
            prefixes: prefixes.iter().map(|p| canonical_term(p)).collect(),
            suffixes: suffixes.iter().map(|s| canonical_term(s)).collect(),
        })
    }

    /// Full pipeline: quantities, units, pack sizes, foreign accents,
    /// punctuation and one leading/trailing descriptor word are removed.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.trim().to_lowercase();
        let without_parens = self.parens.replace_all(&lowered, " ");
        let without_pack = self.pack_size.replace_all(&without_parens, " ");
        let trimmed = without_pack.trim();
        let without_quantity = self.leading_quantity.replace(trimmed, "");
        let without_size = self.trailing_size.replace(without_quantity.trim_end(), "");

        let cleaned = canonical_term(&without_size);
        let mut words: Vec<&str> = cleaned.split_whitespace().collect();

        if words.len() > 1 && self.prefixes.contains(words[0]) {
            words.remove(0);
        }
        if words.len() > 1 && words.last().is_some_and(|w| self.suffixes.contains(*w)) {
            words.pop();
        }

        words.join(" ")
    }
}

/// Lower-case, fold accents outside the Swedish alphabet and collapse
/// punctuation into single spaces. Used for lexicon entries, which carry no
/// quantities or descriptors.
pub fn canonical_term(text: &str) -> String {
    let folded = fold_diacritics(&text.to_lowercase());
    let spaced: String = folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strips accents except on å, ä and ö, which are separate letters in Swedish.
pub fn fold_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.nfc() {
        if matches!(ch, 'å' | 'ä' | 'ö' | 'Å' | 'Ä' | 'Ö') {
            out.push(ch);
        } else {
            out.extend(std::iter::once(ch).nfd().filter(|c| !is_combining_mark(*c)));
        }
    }
    out
}

pub fn tokens(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}
