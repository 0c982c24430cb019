//! Column header normalization and stem derivation.
//!
//! Exports with repeated measurements label them with a number somewhere in
//! the header (`Turnover (2007) 1`, `Investor 2 - Name`). Normalization moves
//! the first digit run to the end and canonicalizes separators so that the
//! reshaper can split each header into a stem and a sequence number.
//!
//! Only the *first* digit run moves. A header carrying two numeric tokens
//! keeps the second one in the name, where it either stays embedded or fuses
//! with the relocated run into one bogus sequence number.
//! [`NormalizedColumn::multiple_digit_runs`] reports these names so callers
//! can warn about them.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit run pattern is valid"));
static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+$").expect("trailing digit pattern is valid"));
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("underscore run pattern is valid"));

/// Digit appended to sentinel headers so they read as the first occurrence.
pub const SENTINEL_SUFFIX: char = '1';

pub const DEFAULT_YEAR_PHRASE: &str = " (2007) ";
pub const DEFAULT_POSTCODE_HEADER: &str = "Head Office Address - Postcode (if UK)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseSubstitution {
    pub phrase: String,
    pub replacement: String,
}

/// Header rewriting rules applied before digit relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerRules {
    /// Literal phrases replaced wherever they occur in a header.
    pub phrase_substitutions: Vec<PhraseSubstitution>,
    /// Headers that stand for the first of a repeated family even though
    /// they carry no number.
    pub sentinel_headers: Vec<String>,
}

impl Default for NormalizerRules {
    fn default() -> Self {
        Self {
            phrase_substitutions: vec![PhraseSubstitution {
                phrase: DEFAULT_YEAR_PHRASE.to_string(),
                replacement: "_".to_string(),
            }],
            sentinel_headers: vec![DEFAULT_POSTCODE_HEADER.to_string()],
        }
    }
}

impl NormalizerRules {
    /// Rules with no substitutions or sentinels; only digit relocation and
    /// separator handling remain.
    pub fn none() -> Self {
        Self {
            phrase_substitutions: Vec::new(),
            sentinel_headers: Vec::new(),
        }
    }
}

/// One header after normalization, with its derived stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedColumn {
    pub raw: String,
    pub normalized: String,
    pub stem: String,
    pub sequence: Option<String>,
    pub multiple_digit_runs: bool,
}

impl NormalizedColumn {
    pub fn new(raw: &str, rules: &NormalizerRules) -> Self {
        let rewritten = apply_rules(raw, rules);
        let multiple_digit_runs = DIGIT_RUN.find_iter(&rewritten).nth(1).is_some();
        let normalized = relocate_sequence(&rewritten);
        let stem = derive_stem(&normalized);
        let sequence = split_sequence(&normalized).map(|(_, digits)| digits.to_string());
        Self {
            raw: raw.to_string(),
            normalized,
            stem,
            sequence,
            multiple_digit_runs,
        }
    }
}

pub fn normalize_name(raw: &str, rules: &NormalizerRules) -> String {
    relocate_sequence(&apply_rules(raw, rules))
}

fn apply_rules(raw: &str, rules: &NormalizerRules) -> String {
    let mut name = raw.to_string();
    for substitution in &rules.phrase_substitutions {
        if !substitution.phrase.is_empty() {
            name = name.replace(&substitution.phrase, &substitution.replacement);
        }
    }
    if rules.sentinel_headers.iter().any(|header| *header == name) {
        name.push(SENTINEL_SUFFIX);
    }
    name
}

fn relocate_sequence(name: &str) -> String {
    match DIGIT_RUN.find(name) {
        Some(run) => {
            let mut relocated = String::with_capacity(name.len());
            relocated.push_str(&name[..run.start()]);
            relocated.push_str(&name[run.end()..]);
            relocated.push_str(run.as_str());
            let separated = replace_separators(&relocated);
            UNDERSCORE_RUN.replace_all(&separated, "_").into_owned()
        }
        None => replace_separators(name),
    }
}

pub fn normalize_columns(raw: &[String], rules: &NormalizerRules) -> Vec<NormalizedColumn> {
    raw.iter()
        .map(|name| NormalizedColumn::new(name, rules))
        .collect()
}

/// Pairs each raw header with its normalized name, preserving order.
pub fn rename_map(raw: &[String], rules: &NormalizerRules) -> Vec<(String, String)> {
    raw.iter()
        .map(|name| (name.clone(), normalize_name(name, rules)))
        .collect()
}

/// Normalized names that occur more than once, in first-collision order.
pub fn find_collisions(normalized: &[String]) -> Vec<String> {
    normalized.iter().duplicates().cloned().collect()
}

/// Removes every digit from a normalized name.
pub fn derive_stem(name: &str) -> String {
    DIGIT_RUN.replace_all(name, "").into_owned()
}

/// Deduplicated stems of all names that are not identifiers, in first-seen order.
pub fn candidate_stems(normalized: &[String], identifiers: &[String]) -> Vec<String> {
    normalized
        .iter()
        .filter(|name| !identifiers.contains(name))
        .map(|name| derive_stem(name))
        .unique()
        .collect()
}

/// Splits `Turnover_12` into (`Turnover_`, `12`); `None` when there is no
/// trailing number.
pub fn split_sequence(name: &str) -> Option<(&str, &str)> {
    TRAILING_DIGITS
        .find(name)
        .map(|digits| (&name[..digits.start()], digits.as_str()))
}

fn replace_separators(name: &str) -> String {
    name.replace(" - ", "_").replace(' ', "_")
}
