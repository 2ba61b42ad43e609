use crate::model::ConfigError;
use crate::normalizer::canonical_term;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

/// Matching knobs and lexical tables. Every field falls back to the built-in
/// Swedish defaults so a config file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub acceptance_threshold: f64,
    pub min_substring_len: usize,
    pub min_word_len: usize,
    pub fuzzy_threshold: f64,
    pub fuzzy_min_len: usize,
    pub rank_matches: bool,
    pub synonyms: BTreeMap<String, Vec<String>>,
    pub ignore_words: BTreeSet<String>,
    pub false_matches: Vec<(String, String)>,
    pub stop_words: BTreeSet<String>,
    pub descriptor_prefixes: Vec<String>,
    pub descriptor_suffixes: Vec<String>,
}

const SYNONYMS: &[(&str, &[&str])] = &[
    ("färs", &["blandfärs", "nötfärs", "fläskfärs", "kycklingfärs", "köttfärs", "umamifärs"]),
    ("kyckling", &["kycklingfilé", "kycklinglår", "kycklingbröst", "kycklingklubba", "strimlad kyckling", "kycklinglårfilé"]),
    ("lax", &["laxfilé", "varmrökt lax", "gravad lax", "rökt lax"]),
    ("torsk", &["torskfilé", "torskrygg"]),
    ("bacon", &["bacon", "sidfläsk", "stekfläsk"]),
    ("fläsk", &["fläskkotlett", "fläskfilé", "kassler"]),
    ("ost", &["riven ost", "mozzarella", "parmesan", "parmesanost", "cheddar", "västerbottensost", "fetaost"]),
    ("grädde", &["vispgrädde", "matlagningsgrädde", "crème fraiche"]),
    ("gräddfil", &["gräddfil", "crème fraiche"]),
    ("mjölk", &["mjölk", "havremjölk", "lättmjölk"]),
    ("smör", &["smör"]),
    ("lök", &["gul lök", "rödlök", "purjolök", "salladslök", "lökar"]),
    ("potatis", &["potatis", "färskpotatis"]),
    ("tomat", &["tomater", "krossade tomater", "hela tomater", "plommontomater", "babyplommontomater"]),
    ("paprika", &["paprika", "röd paprika", "gul paprika"]),
    ("ägg", &["ägg", "äggula"]),
    ("pasta", &["pasta", "spaghetti", "penne", "makaroner", "tagliatelle", "lasagne", "lasagnette"]),
    ("yoghurt", &["yoghurt", "naturell yoghurt", "turkisk yoghurt", "matyoghurt"]),
    ("druvor", &["druvor", "gröna druvor", "röda druvor"]),
    ("äpplen", &["äpplen", "äpple", "svenska äpplen"]),
    ("räkor", &["räkor", "handskalade räkor", "skaldjur"]),
    ("falukorv", &["falukorv", "korv"]),
    ("köttbullar", &["köttbullar"]),
    ("hamburgare", &["hamburgare", "hamburgarbröd"]),
    ("broccoli", &["broccoli"]),
    ("blomkål", &["blomkål"]),
    ("mango", &["mango"]),
    ("avokado", &["avokado", "avokador"]),
];

const IGNORE_WORDS: &[&str] = &[
    "vatten", "salt", "peppar", "olja", "socker", "mjöl", "buljong", "fond", "krydda", "kryddor", "örter",
];

const FALSE_MATCHES: &[(&str, &str)] = &[
    ("ris", "riskakor"),
    ("ris", "majskakor"),
    ("bröd", "ströbröd"),
    ("ägg", "pålägg"),
    ("ost", "dessertost"),
    ("fläsk", "fläskfilé"),
];

const STOP_WORDS: &[&str] = &["med", "och", "i", "på", "för", "av", "eller", "ca", "g", "kg", "dl", "st"];

const DESCRIPTOR_PREFIXES: &[&str] = &[
    "färsk", "fryst", "ekologisk", "svensk", "riven", "hackad", "skivad", "strimlad", "hel", "hela",
];

const DESCRIPTOR_SUFFIXES: &[&str] = &["färsk", "fryst", "ekologisk"];

fn owned<'a>(words: &'a [&'a str]) -> impl Iterator<Item = String> + 'a {
    words.iter().map(|w| w.to_string())
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.6,
            min_substring_len: 4,
            min_word_len: 4,
            fuzzy_threshold: 0.8,
            fuzzy_min_len: 5,
            rank_matches: true,
            synonyms: SYNONYMS
                .iter()
                .map(|(base, variants)| (base.to_string(), owned(variants).collect::<Vec<_>>()))
                .collect(),
            ignore_words: owned(IGNORE_WORDS).collect(),
            false_matches: FALSE_MATCHES
                .iter()
                .map(|(i, d)| (i.to_string(), d.to_string()))
                .collect(),
            stop_words: owned(STOP_WORDS).collect(),
            descriptor_prefixes: owned(DESCRIPTOR_PREFIXES).collect(),
            descriptor_suffixes: owned(DESCRIPTOR_SUFFIXES).collect(),
        }
    }
}

impl MatchConfig {
    /// Refuses configurations that would produce nonsensical matches.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_interval("acceptance_threshold", self.acceptance_threshold)?;
        check_unit_interval("fuzzy_threshold", self.fuzzy_threshold)?;

        if self.min_substring_len == 0 {
            return Err(ConfigError::ZeroLength("min_substring_len"));
        }
        if self.min_word_len == 0 {
            return Err(ConfigError::ZeroLength("min_word_len"));
        }

        for (base, variants) in &self.synonyms {
            if is_blank(base) {
                return Err(ConfigError::Synonyms(format!("base term '{}' is empty", base)));
            }
            if variants.is_empty() {
                return Err(ConfigError::Synonyms(format!("'{}' has no variants", base)));
            }
            if variants.iter().any(|v| is_blank(v)) {
                return Err(ConfigError::Synonyms(format!("'{}' has an empty variant", base)));
            }
        }

        for (ingredient, deal) in &self.false_matches {
            if is_blank(ingredient) || is_blank(deal) {
                return Err(ConfigError::FalseMatches(format!(
                    "pair ('{}', '{}') has an empty side",
                    ingredient, deal
                )));
            }
            if canonical_term(ingredient) == canonical_term(deal) {
                return Err(ConfigError::FalseMatches(format!(
                    "pair ('{}', '{}') would reject exact matches",
                    ingredient, deal
                )));
            }
        }

        check_words("ignore_words", self.ignore_words.iter())?;
        check_words("stop_words", self.stop_words.iter())?;
        check_words("descriptor_prefixes", self.descriptor_prefixes.iter())?;
        check_words("descriptor_suffixes", self.descriptor_suffixes.iter())?;

        Ok(())
    }
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ThresholdOutOfRange { name, value });
    }
    Ok(())
}

/// Entries are compared in canonical form, so one made only of punctuation
/// or whitespace is as empty as "".
fn is_blank(entry: &str) -> bool {
    canonical_term(entry).is_empty()
}

fn check_words<'a>(
    table: &'static str,
    mut words: impl Iterator<Item = &'a String>,
) -> Result<(), ConfigError> {
    if words.any(|w| is_blank(w)) {
        return Err(ConfigError::EmptyWord(table));
    }
    Ok(())
}

fn default_workers() -> usize {
    4
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub deals_path: String,
    pub recipes_path: String,
    pub output_path: String,
    #[serde(default)]
    pub optimized_output_path: Option<String>,
    #[serde(default)]
    pub db_path: Option<String>,
    #[serde(default)]
    pub check_interval_seconds: Option<u64>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default)]
    pub matching: MatchConfig,
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.matching.validate()?;
    Ok(config)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = MatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.acceptance_threshold, 0.6);
        assert!(cfg.synonyms.contains_key("kyckling"));
        assert!(cfg.ignore_words.contains("salt"));
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        for bad in [-0.1, 1.01, f64::NAN] {
            let cfg = MatchConfig {
                acceptance_threshold: bad,
                ..MatchConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::ThresholdOutOfRange { name: "acceptance_threshold", .. })
            ));
        }
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let mut cfg = MatchConfig::default();
        cfg.synonyms.insert("tomat".into(), vec![]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Synonyms(_))));

        let mut cfg = MatchConfig::default();
        cfg.false_matches.push(("ris".into(), " ".into()));
        assert!(matches!(cfg.validate(), Err(ConfigError::FalseMatches(_))));

        let mut cfg = MatchConfig::default();
        cfg.ignore_words.insert(String::new());
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyWord("ignore_words"))));
    }

    #[test]
    fn punctuation_only_entries_are_rejected() {
        let mut cfg = MatchConfig::default();
        cfg.synonyms.insert("kyckling".into(), vec!["kycklingfilé".into(), "-".into()]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Synonyms(_))));

        let mut cfg = MatchConfig::default();
        cfg.synonyms.insert("()".into(), vec!["tomater".into()]);
        assert!(matches!(cfg.validate(), Err(ConfigError::Synonyms(_))));

        let mut cfg = MatchConfig::default();
        cfg.false_matches.push(("…".into(), "riskakor".into()));
        assert!(matches!(cfg.validate(), Err(ConfigError::FalseMatches(_))));

        let mut cfg = MatchConfig::default();
        cfg.false_matches.push(("Crème".into(), "creme".into()));
        assert!(matches!(cfg.validate(), Err(ConfigError::FalseMatches(_))));

        for (table, word) in [("stop_words", "--"), ("descriptor_prefixes", "!"), ("descriptor_suffixes", "()")] {
            let mut cfg = MatchConfig::default();
            match table {
                "stop_words" => {
                    cfg.stop_words.insert(word.into());
                }
                "descriptor_prefixes" => cfg.descriptor_prefixes.push(word.into()),
                _ => cfg.descriptor_suffixes.push(word.into()),
            }
            assert!(matches!(cfg.validate(), Err(ConfigError::EmptyWord(t)) if t == table));
        }
    }

    #[test]
    fn partial_matching_section_keeps_defaults() {
        let cfg = parse_config(
            r#"{
                "deals_path": "deals.json",
                "recipes_path": "recipes.json",
                "output_path": "recipe_matches.json",
                "matching": { "acceptance_threshold": 0.75 }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.matching.acceptance_threshold, 0.75);
        assert_eq!(cfg.matching.min_substring_len, 4);
        assert_eq!(cfg.workers, 4);
        assert!(cfg.db_path.is_none());
        assert!(cfg.matching.false_matches.contains(&("ris".to_string(), "riskakor".to_string())));
    }

    #[test]
    fn invalid_threshold_in_file_fails_to_load() {
        let err = parse_config(
            r#"{
                "deals_path": "d", "recipes_path": "r", "output_path": "o",
                "matching": { "acceptance_threshold": 1.5 }
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ThresholdOutOfRange { .. }));
    }

    #[test]
    fn example_config_parses() {
        let cfg = parse_config(include_str!("../config.example.json")).unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.check_interval_seconds, None);
        assert_eq!(cfg.matching.synonyms, MatchConfig::default().synonyms);
    }
}
