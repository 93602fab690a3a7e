use crate::family::FamilyClassifier;
use crate::model::{
    AcceptanceStatus, AliasRecord, CrosswalkRecord, REVIEW_REASON, ReviewRecord,
};
use crate::normalize::{is_not_applicable, normalize_text};

#[derive(Debug, Clone)]
pub struct ProcessedRow {
    pub crosswalk: CrosswalkRecord,
    pub review: Option<ReviewRecord>,
}

pub fn normalize_alias(alias: AliasRecord) -> AliasRecord {
    AliasRecord {
        name: normalize_text(Some(alias.name.as_str())),
        eco_code: normalize_text(Some(alias.eco_code.as_str())),
        slug: normalize_text(Some(alias.slug.as_str())),
        family_hint: normalize_text(Some(alias.family_hint.as_str())),
        source_file: alias.source_file,
    }
}

pub fn process_record(classifier: &FamilyClassifier, alias: AliasRecord) -> ProcessedRow {
    let alias = normalize_alias(alias);
    let acceptance_status = AcceptanceStatus::from_name(&alias.name);

    let hint = Some(alias.family_hint.as_str())
        .filter(|hint| !hint.is_empty() && !is_not_applicable(hint));
    let classification = classifier.classify(&alias.name, &alias.eco_code, hint);
    let needs_review = classification.needs_review();
    let notes = classifier.combination_notes(&alias.name).join("; ");

    let review = needs_review.then(|| ReviewRecord {
        alias_name: alias.name.clone(),
        alias_slug: alias.slug.clone(),
        eco_code: alias.eco_code.clone(),
        reason: REVIEW_REASON,
    });

    ProcessedRow {
        crosswalk: CrosswalkRecord {
            alias,
            classification,
            acceptance_status,
            needs_review,
            notes,
        },
        review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::ResolutionTier;

    fn alias(name: &str, eco_code: &str, family_hint: &str) -> AliasRecord {
        AliasRecord {
            name: name.to_string(),
            eco_code: eco_code.to_string(),
            slug: String::new(),
            family_hint: family_hint.to_string(),
            source_file: "test.csv".to_string(),
        }
    }

    fn process(record: AliasRecord) -> ProcessedRow {
        let classifier = FamilyClassifier::new().expect("rule tables compile");
        process_record(&classifier, record)
    }

    #[test]
    fn fields_are_normalized_before_classification() {
        let row = process(alias("  Ｓｃｏｔｃｈ Game  ", " c45 ", "  "));
        assert_eq!(row.crosswalk.alias.name, "Scotch Game");
        assert_eq!(row.crosswalk.alias.eco_code, "c45");
        assert_eq!(row.crosswalk.classification.family_key, "scotch-game");
    }

    #[test]
    fn unresolved_row_is_queued_for_review() {
        let row = process(alias("random unclassifiable string", "Z99", ""));
        assert_eq!(row.crosswalk.classification.family_key, "");
        assert_eq!(row.crosswalk.classification.confidence, 0.0);
        assert!(row.crosswalk.needs_review);
        let review = row.review.expect("review record");
        assert_eq!(review.alias_name, "random unclassifiable string");
        assert_eq!(review.eco_code, "Z99");
        assert_eq!(review.reason, "low_confidence_or_unmatched");
    }

    #[test]
    fn confident_row_has_no_review_record() {
        let row = process(alias("Queen's Gambit Declined", "D30", ""));
        assert_eq!(row.crosswalk.acceptance_status, AcceptanceStatus::Declined);
        assert_eq!(row.crosswalk.classification.family_key, "queens-gambit");
        assert!(!row.crosswalk.needs_review);
        assert!(row.review.is_none());
    }

    #[test]
    fn sentinel_hint_is_ignored() {
        let row = process(alias("", "E61", "#N/A"));
        assert_eq!(row.crosswalk.classification.tier, ResolutionTier::EcoBand);
        assert_eq!(row.crosswalk.classification.family_key, "kings-indian-defense");
    }

    #[test]
    fn hint_wins_and_curly_apostrophes_slug_identically() {
        let curly = process(alias("Sicilian", "B20", "Queen\u{2019}s Gambit"));
        let straight = process(alias("Sicilian", "B20", "Queen's Gambit"));
        assert_eq!(curly.crosswalk.classification.family_key, "queens-gambit");
        assert_eq!(straight.crosswalk.classification.family_key, "queens-gambit");
        assert_eq!(curly.crosswalk.classification.confidence, 0.90);
    }

    #[test]
    fn dutch_staunton_gets_note() {
        let row = process(alias("Dutch Defense: Staunton Gambit", "A82", ""));
        assert_eq!(row.crosswalk.classification.family_key, "dutch-defense");
        assert_eq!(row.crosswalk.notes, "inferred staunton under dutch");
        assert!(!row.crosswalk.needs_review);
    }

    #[test]
    fn needs_review_tracks_key_and_threshold() {
        let names_and_codes = [
            ("", "B03"),
            ("", "B12"),
            ("Italian Game", ""),
            ("", ""),
            ("", "D25"),
        ];
        for (name, eco) in names_and_codes {
            let row = process(alias(name, eco, ""));
            let classification = &row.crosswalk.classification;
            let expected =
                classification.family_key.is_empty() || classification.confidence < 0.85;
            assert_eq!(row.crosswalk.needs_review, expected, "{name:?} {eco:?}");
            assert_eq!(row.review.is_some(), expected);
            assert_eq!(
                classification.confidence == 0.0,
                classification.family_key.is_empty()
            );
        }
    }
}
