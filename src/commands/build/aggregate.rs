use std::collections::BTreeMap;

use crate::model::{CanonicalFamilyRecord, CrosswalkCounts, CrosswalkRecord, ReviewRecord};

use super::process::ProcessedRow;

/// Running totals over every processed row, in input order.
#[derive(Debug, Default)]
pub(super) struct CrosswalkAggregate {
    pub(super) crosswalk: Vec<CrosswalkRecord>,
    pub(super) reviews: Vec<ReviewRecord>,
    pub(super) family_counts: BTreeMap<String, usize>,
    rows_by_tier: BTreeMap<String, usize>,
    rows_by_acceptance_status: BTreeMap<String, usize>,
}

impl CrosswalkAggregate {
    pub(super) fn record(&mut self, row: ProcessedRow) {
        let classification = &row.crosswalk.classification;
        if classification.is_resolved() {
            *self
                .family_counts
                .entry(classification.family_key.clone())
                .or_default() += 1;
        }
        *self
            .rows_by_tier
            .entry(classification.tier.as_str().to_string())
            .or_default() += 1;
        *self
            .rows_by_acceptance_status
            .entry(row.crosswalk.acceptance_status.as_str().to_string())
            .or_default() += 1;

        if let Some(review) = row.review {
            self.reviews.push(review);
        }
        self.crosswalk.push(row.crosswalk);
    }

    pub(super) fn canonical_families(&self) -> Vec<CanonicalFamilyRecord> {
        self.family_counts
            .iter()
            .map(|(key, count)| CanonicalFamilyRecord::new(key, *count))
            .collect()
    }

    pub(super) fn counts(&self, source_file_count: usize) -> CrosswalkCounts {
        CrosswalkCounts {
            source_file_count,
            row_count: self.crosswalk.len(),
            review_count: self.reviews.len(),
            family_count: self.family_counts.len(),
            rows_by_tier: self.rows_by_tier.clone(),
            rows_by_acceptance_status: self.rows_by_acceptance_status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build::process::process_record;
    use crate::family::FamilyClassifier;
    use crate::model::AliasRecord;

    fn aggregate(rows: &[(&str, &str, &str)]) -> CrosswalkAggregate {
        let classifier = FamilyClassifier::new().expect("rule tables compile");
        let mut aggregate = CrosswalkAggregate::default();
        for (name, eco_code, source_file) in rows {
            let alias = AliasRecord {
                name: name.to_string(),
                eco_code: eco_code.to_string(),
                source_file: source_file.to_string(),
                ..AliasRecord::default()
            };
            aggregate.record(process_record(&classifier, alias));
        }
        aggregate
    }

    #[test]
    fn repeated_aliases_across_files_count_separately() {
        let aggregate = aggregate(&[
            ("Sicilian Defense", "", "a.csv"),
            ("Sicilian Defense", "", "b.csv"),
            ("", "B03", "b.csv"),
            ("nothing here", "", "b.csv"),
        ]);

        assert_eq!(aggregate.crosswalk.len(), 4);
        assert_eq!(aggregate.family_counts.get("sicilian-defense"), Some(&2));
        // Low-confidence rows still count toward their family.
        assert_eq!(aggregate.family_counts.get("open-games"), Some(&1));
        assert_eq!(aggregate.family_counts.len(), 2);
        assert_eq!(aggregate.reviews.len(), 2);
    }

    #[test]
    fn canonical_families_are_sorted_by_key_with_counts() {
        let aggregate = aggregate(&[
            ("Vienna Game", "", "a.csv"),
            ("Caro-Kann Defense", "", "a.csv"),
            ("Vienna Gambit", "", "a.csv"),
        ]);
        let families = aggregate.canonical_families();
        let keys: Vec<&str> = families.iter().map(|family| family.key.as_str()).collect();
        assert_eq!(keys, vec!["caro-kann-defense", "vienna-game"]);
        assert_eq!(families[1].alias_count, 2);
        assert_eq!(families[0].display_name, "Caro Kann Defense");
    }

    #[test]
    fn counts_summarize_tiers_and_statuses() {
        let aggregate = aggregate(&[
            ("King's Gambit Accepted", "", "a.csv"),
            ("", "C01", "a.csv"),
            ("", "", "a.csv"),
        ]);
        let counts = aggregate.counts(1);
        assert_eq!(counts.row_count, 3);
        assert_eq!(counts.review_count, 1);
        assert_eq!(counts.family_count, 2);
        assert_eq!(counts.rows_by_tier.get("name_pattern"), Some(&1));
        assert_eq!(counts.rows_by_tier.get("eco_band"), Some(&1));
        assert_eq!(counts.rows_by_tier.get("unresolved"), Some(&1));
        assert_eq!(counts.rows_by_acceptance_status.get("accepted"), Some(&1));
        assert_eq!(counts.rows_by_acceptance_status.get("neutral"), Some(&2));
    }
}
