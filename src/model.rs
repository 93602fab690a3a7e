use std::collections::BTreeMap;

use serde::Serialize;

use crate::family::Classification;

pub const REVIEW_REASON: &str = "low_confidence_or_unmatched";
pub const CANONICAL_FAMILY_NOTE: &str = "seeded from alias mapping frequency";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasRecord {
    pub name: String,
    pub eco_code: String,
    pub slug: String,
    pub family_hint: String,
    pub source_file: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceStatus {
    Accepted,
    Declined,
    Neutral,
}

impl AcceptanceStatus {
    pub fn from_name(name: &str) -> Self {
        let lowered = name.to_lowercase();
        if lowered.contains("accepted") {
            Self::Accepted
        } else if lowered.contains("declined") {
            Self::Declined
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrosswalkRecord {
    pub alias: AliasRecord,
    pub classification: Classification,
    pub acceptance_status: AcceptanceStatus,
    pub needs_review: bool,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub alias_name: String,
    pub alias_slug: String,
    pub eco_code: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalFamilyRecord {
    pub key: String,
    pub display_name: String,
    pub eco_group: String,
    pub alias_count: usize,
    pub notes: &'static str,
}

impl CanonicalFamilyRecord {
    pub fn new(key: &str, alias_count: usize) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name_for_key(key),
            eco_group: String::new(),
            alias_count,
            notes: CANONICAL_FAMILY_NOTE,
        }
    }
}

pub fn display_name_for_key(key: &str) -> String {
    key.split('-')
        .map(capitalize)
        .collect::<Vec<String>>()
        .join(" ")
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFileEntry {
    pub filename: String,
    pub sha256: String,
    pub row_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CrosswalkCounts {
    pub source_file_count: usize,
    pub row_count: usize,
    pub review_count: usize,
    pub family_count: usize,
    pub rows_by_tier: BTreeMap<String, usize>,
    pub rows_by_acceptance_status: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrosswalkOutputs {
    pub crosswalk_path: String,
    pub review_path: String,
    pub canonical_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrosswalkRunManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub input_glob: String,
    pub delimiter: String,
    pub sources: Vec<SourceFileEntry>,
    pub counts: CrosswalkCounts,
    pub outputs: CrosswalkOutputs,
    pub families: Vec<CanonicalFamilyRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptance_status_checks_accepted_before_declined() {
        assert_eq!(
            AcceptanceStatus::from_name("Queen's Gambit Accepted"),
            AcceptanceStatus::Accepted
        );
        assert_eq!(
            AcceptanceStatus::from_name("QUEEN'S GAMBIT DECLINED"),
            AcceptanceStatus::Declined
        );
        assert_eq!(
            AcceptanceStatus::from_name("Declined then accepted"),
            AcceptanceStatus::Accepted
        );
        assert_eq!(AcceptanceStatus::from_name("Sicilian"), AcceptanceStatus::Neutral);
        assert_eq!(AcceptanceStatus::from_name(""), AcceptanceStatus::Neutral);
    }

    #[test]
    fn display_name_title_cases_hyphen_segments() {
        assert_eq!(display_name_for_key("caro-kann-defense"), "Caro Kann Defense");
        assert_eq!(display_name_for_key("queens-gambit"), "Queens Gambit");
        assert_eq!(display_name_for_key("e4"), "E4");
    }

    #[test]
    fn canonical_family_record_carries_fixed_note_and_empty_eco_group() {
        let record = CanonicalFamilyRecord::new("sicilian-defense", 3);
        assert_eq!(record.display_name, "Sicilian Defense");
        assert_eq!(record.eco_group, "");
        assert_eq!(record.alias_count, 3);
        assert_eq!(record.notes, "seeded from alias mapping frequency");
    }
}
