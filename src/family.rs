use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::normalize::{HintSlugger, is_not_applicable, straighten_quotes};

pub const HINT_CONFIDENCE: f64 = 0.90;
pub const NAME_PATTERN_CONFIDENCE: f64 = 0.99;
pub const REVIEW_THRESHOLD: f64 = 0.85;

const NAME_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("king s", "kings"),
    ("queen s", "queens"),
    ("bird s", "birds"),
    ("ruy l pez", "ruy lopez"),
    ("ruy lópez", "ruy lopez"),
    ("gr nfeld", "grunfeld"),
];

// First match wins. Multi-word forms sit ahead of any single word they contain.
const NAME_PATTERNS: &[(&str, &str)] = &[
    (r"\bsicilian\b", "sicilian-defense"),
    (r"\bfrench\b", "french-defense"),
    (r"\bcaro[-\s]?kann\b", "caro-kann-defense"),
    (r"\bscandinavian\b|\bcenter\s+counter\b", "scandinavian-defense"),
    (r"\bitalian\b|\bgiuoco\b", "italian-game"),
    (r"\bruy\s*lopez\b|\besp[aá]nola?\b", "ruy-lopez"),
    (r"\bvienna\b", "vienna-game"),
    (r"\bscotch\b", "scotch-game"),
    (r"\btwo\s+knights\b", "two-knights-defense"),
    (r"\bfour\s+knights\b", "four-knights-game"),
    (r"\bphilidor\b", "philidor-defense"),
    (r"\bpetrov\b|\brussian\b", "petrov-defense"),
    (r"\bold\s+benoni\b", "benoni-defense"),
    (r"\bmodern\s+benoni\b", "benoni-defense"),
    (r"\bpirc\b|\bmodern\s+defense\b|\bmodern\b", "pirc-modern"),
    (r"\balekhine?(?:'?s)?\b", "alekhine-defense"),
    (r"\bdutch\b", "dutch-defense"),
    (r"\bbenoni\b", "benoni-defense"),
    (r"\bbenko\b|\bvolga\b", "benko-gambit"),
    (r"\bgr[uü]nfeld\b", "grunfeld-defense"),
    (r"\bnimzo[-\s]?indian\b", "nimzo-indian-defense"),
    (r"\bbogo[-\s]?indian\b", "bogo-indian-defense"),
    (r"\bqueen'?s?\s+indian\b", "queens-indian-defense"),
    (r"\bking'?s?[-\s]?indian\b", "kings-indian-defense"),
    (r"\bsemi[-\s]?slav\b", "semi-slav-defense"),
    (r"\bslav\b", "slav-defense"),
    (r"\bqueen'?s?\s+gambit\b", "queens-gambit"),
    (r"\bcatalan\b", "catalan-opening"),
    (r"\benglish\b", "english-opening"),
    (r"\br[ée]ti\b", "reti-opening"),
    (r"\bbird'?s?\b", "birds-opening"),
    (r"\blondon\b", "london-system"),
    (r"\bcolle\b", "colle-system"),
    (r"\btrompowsky\b", "trompowsky-attack"),
    (r"\bveresov\b|\bjobava\b", "veresov-opening"),
    (r"\bking'?s?\s+gambit\b", "kings-gambit"),
    (r"\bcenter\s+game\b", "center-game"),
];

struct NameCombination {
    words: &'static [&'static str],
    family: &'static str,
    confidence: f64,
    note: &'static str,
}

// Tried only after every entry in NAME_PATTERNS has missed.
const NAME_COMBINATIONS: &[NameCombination] = &[NameCombination {
    words: &["dutch", "staunton"],
    family: "dutch-defense",
    confidence: 0.95,
    note: "inferred staunton under dutch",
}];

// Prefix-anchored. The D bands are split on purpose; keep this order.
const ECO_BANDS: &[(&str, &str, f64)] = &[
    (r"B[2-9][0-9]", "sicilian-defense", 0.90),
    (r"C0[0-9]|C1[0-9]", "french-defense", 0.90),
    (r"B1[0-9]", "caro-kann-defense", 0.85),
    (r"B0[6-9]", "pirc-modern", 0.80),
    (r"B0[0-5]", "open-games", 0.80),
    (r"A8[0-9]|A9[0-9]", "dutch-defense", 0.90),
    (r"A5[6-9]|A7[0-9]", "benoni-defense", 0.85),
    (r"D0[0-9]|D3[0-9]|D4[0-9]|D6[0-9]", "queens-gambit", 0.85),
    (r"D1[0-9]", "slav-defense", 0.85),
    (r"D2[0-9]|D5[0-9]", "queens-gambit", 0.80),
    (r"E0[0-9]", "catalan-opening", 0.80),
    (r"E2[0-9]", "nimzo-indian-defense", 0.85),
    (r"E3[0-9]", "queens-indian-defense", 0.85),
    (r"E6[0-9]", "kings-indian-defense", 0.85),
    (r"D7[0-9]|D8[0-9]|D9[0-9]", "grunfeld-defense", 0.85),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    Hint,
    NamePattern,
    NameCombination,
    EcoBand,
    Unresolved,
}

impl ResolutionTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hint => "hint",
            Self::NamePattern => "name_pattern",
            Self::NameCombination => "name_combination",
            Self::EcoBand => "eco_band",
            Self::Unresolved => "unresolved",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub family_key: String,
    pub confidence: f64,
    pub tier: ResolutionTier,
}

impl Classification {
    fn resolved(family_key: impl Into<String>, confidence: f64, tier: ResolutionTier) -> Self {
        Self {
            family_key: family_key.into(),
            confidence,
            tier,
        }
    }

    pub fn unresolved() -> Self {
        Self::resolved(String::new(), 0.0, ResolutionTier::Unresolved)
    }

    pub fn is_resolved(&self) -> bool {
        !self.family_key.is_empty()
    }

    pub fn needs_review(&self) -> bool {
        !self.is_resolved() || self.confidence < REVIEW_THRESHOLD
    }
}

struct CompiledCombination {
    words: Vec<Regex>,
    family: &'static str,
    confidence: f64,
    note: &'static str,
}

impl CompiledCombination {
    fn matches(&self, lowered: &str) -> bool {
        self.words.iter().all(|word| word.is_match(lowered))
    }
}

/// Maps an alias (name, ECO code, optional family hint) to a canonical
/// family key. Tiers are tried in order and the first hit wins: explicit
/// hint, name patterns, name combinations, ECO bands.
pub struct FamilyClassifier {
    slugger: HintSlugger,
    name_patterns: Vec<(Regex, &'static str)>,
    name_combinations: Vec<CompiledCombination>,
    eco_bands: Vec<(Regex, &'static str, f64)>,
}

impl FamilyClassifier {
    pub fn new() -> Result<Self> {
        let name_patterns = NAME_PATTERNS
            .iter()
            .map(|(pattern, family)| {
                Regex::new(pattern)
                    .with_context(|| format!("failed to compile name pattern for {family}"))
                    .map(|regex| (regex, *family))
            })
            .collect::<Result<Vec<_>>>()?;

        let name_combinations = NAME_COMBINATIONS
            .iter()
            .map(|combination| -> Result<CompiledCombination> {
                let words = combination
                    .words
                    .iter()
                    .map(|word| {
                        Regex::new(&format!(r"\b{}\b", regex::escape(word)))
                            .with_context(|| format!("failed to compile combination word {word}"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledCombination {
                    words,
                    family: combination.family,
                    confidence: combination.confidence,
                    note: combination.note,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let eco_bands = ECO_BANDS
            .iter()
            .map(|(pattern, family, confidence)| {
                Regex::new(&format!("^(?:{pattern})"))
                    .with_context(|| format!("failed to compile ECO band {pattern}"))
                    .map(|regex| (regex, *family, *confidence))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            slugger: HintSlugger::new()?,
            name_patterns,
            name_combinations,
            eco_bands,
        })
    }

    pub fn slugify_hint(&self, hint: &str) -> String {
        self.slugger.slugify(hint)
    }

    pub fn classify(
        &self,
        name: &str,
        eco_code: &str,
        family_hint: Option<&str>,
    ) -> Classification {
        if let Some(classification) = family_hint.and_then(|hint| self.classify_hint(hint)) {
            return classification;
        }

        self.classify_name(name)
            .or_else(|| self.classify_eco(eco_code))
            .unwrap_or_else(Classification::unresolved)
    }

    pub fn classify_hint(&self, hint: &str) -> Option<Classification> {
        if hint.trim().is_empty() || is_not_applicable(hint) {
            return None;
        }

        let key = self.slugify_hint(hint);
        if key.is_empty() {
            return None;
        }
        Some(Classification::resolved(
            key,
            HINT_CONFIDENCE,
            ResolutionTier::Hint,
        ))
    }

    pub fn classify_name(&self, name: &str) -> Option<Classification> {
        let prepared = prepare_name(name);
        if prepared.trim().is_empty() {
            return None;
        }

        if let Some((_, family)) = self
            .name_patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(&prepared))
        {
            return Some(Classification::resolved(
                *family,
                NAME_PATTERN_CONFIDENCE,
                ResolutionTier::NamePattern,
            ));
        }

        self.name_combinations
            .iter()
            .find(|combination| combination.matches(&prepared))
            .map(|combination| {
                Classification::resolved(
                    combination.family,
                    combination.confidence,
                    ResolutionTier::NameCombination,
                )
            })
    }

    pub fn classify_eco(&self, eco_code: &str) -> Option<Classification> {
        let eco = eco_code.trim().to_uppercase();
        if eco.is_empty() {
            return None;
        }

        self.eco_bands
            .iter()
            .find(|(band, _, _)| band.is_match(&eco))
            .map(|(_, family, confidence)| {
                Classification::resolved(*family, *confidence, ResolutionTier::EcoBand)
            })
    }

    /// Notes attached to a name whenever one of the combination rules'
    /// words all appear in it, whichever tier resolved the family.
    pub fn combination_notes(&self, name: &str) -> Vec<&'static str> {
        let lowered = name.to_lowercase();
        self.name_combinations
            .iter()
            .filter(|combination| combination.matches(&lowered))
            .map(|combination| combination.note)
            .collect()
    }
}

fn prepare_name(name: &str) -> String {
    let mut prepared = straighten_quotes(name).to_lowercase();
    for (from, to) in NAME_SUBSTITUTIONS {
        prepared = prepared.replace(from, to);
    }
    prepared
}
