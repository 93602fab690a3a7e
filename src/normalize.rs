use anyhow::{Context, Result};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const NOT_APPLICABLE_SENTINELS: &[&str] = &["#N/A", "N/A"];
const QUOTE_GLYPHS: &[char] = &['\u{2019}', '\u{2018}', '\u{02BC}', '`', '\u{00B4}'];

pub fn normalize_text(value: Option<&str>) -> String {
    value
        .map(|text| text.nfkc().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

pub fn is_not_applicable(value: &str) -> bool {
    let trimmed = value.trim();
    NOT_APPLICABLE_SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
}

pub fn straighten_quotes(text: &str) -> String {
    text.chars()
        .map(|ch| if QUOTE_GLYPHS.contains(&ch) { '\'' } else { ch })
        .collect()
}

/// Turns a free-text family hint ("Queen’s Gambit", "Caro-Kann Defence")
/// into a hyphenated lowercase key.
#[derive(Debug)]
pub struct HintSlugger {
    possessive: Regex,
    separators: Regex,
}

impl HintSlugger {
    pub fn new() -> Result<Self> {
        Ok(Self {
            possessive: Regex::new(r"'s\b").context("failed to compile possessive regex")?,
            separators: Regex::new(r"[^A-Za-z0-9]+")
                .context("failed to compile slug separator regex")?,
        })
    }

    pub fn slugify(&self, text: &str) -> String {
        let folded: String = straighten_quotes(text)
            .nfkd()
            .filter(|ch| !is_combining_mark(*ch))
            .collect();

        let stripped = self.possessive.replace_all(&folded, "s");
        let hyphenated = self.separators.replace_all(stripped.trim(), "-");
        let mut key = hyphenated.to_lowercase().trim_matches('-').to_string();

        // Twice: a single pass leaves the second of two adjacent "-s-" runs.
        key = key.replace("-s-", "s-");
        key = key.replace("-s-", "s-");
        key.replace("-gambit-gambit", "-gambit")
    }
}
