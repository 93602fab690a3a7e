use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::model::{CanonicalFamilyRecord, CrosswalkRecord, ReviewRecord};
use crate::util::ensure_directory;

use super::aggregate::CrosswalkAggregate;

pub const CROSSWALK_FILENAME: &str = "FamilyCrosswalk.csv";
pub const REVIEW_FILENAME: &str = "AliasReview.csv";
pub const CANONICAL_FILENAME: &str = "FamilyCanonical.csv";

const CROSSWALK_HEADER: &[&str] = &[
    "source",
    "alias_name",
    "alias_slug",
    "eco_code",
    "canonical_family_key",
    "acceptance_status",
    "confidence",
    "needs_review",
    "notes",
];
const REVIEW_HEADER: &[&str] = &["alias_name", "alias_slug", "eco_code", "reason"];
const CANONICAL_HEADER: &[&str] = &[
    "canonical_family_key",
    "canonical_family_name",
    "eco_group",
    "notes",
];

#[derive(Debug, Clone)]
pub struct EmittedPaths {
    pub crosswalk: PathBuf,
    pub review: PathBuf,
    pub canonical: PathBuf,
}

impl EmittedPaths {
    pub fn in_directory(out_dir: &Path) -> Self {
        Self {
            crosswalk: out_dir.join(CROSSWALK_FILENAME),
            review: out_dir.join(REVIEW_FILENAME),
            canonical: out_dir.join(CANONICAL_FILENAME),
        }
    }

    pub fn all(&self) -> [&Path; 3] {
        [&self.crosswalk, &self.review, &self.canonical]
    }
}

pub(super) fn emit_tables(out_dir: &Path, aggregate: &CrosswalkAggregate) -> Result<EmittedPaths> {
    ensure_directory(out_dir)?;
    let paths = EmittedPaths::in_directory(out_dir);

    write_table(
        &paths.crosswalk,
        CROSSWALK_HEADER,
        aggregate.crosswalk.iter().map(crosswalk_row),
    )?;
    write_table(
        &paths.review,
        REVIEW_HEADER,
        aggregate.reviews.iter().map(review_row),
    )?;
    write_table(
        &paths.canonical,
        CANONICAL_HEADER,
        aggregate.canonical_families().iter().map(canonical_row),
    )?;

    info!(
        crosswalk_rows = aggregate.crosswalk.len(),
        review_rows = aggregate.reviews.len(),
        families = aggregate.family_counts.len(),
        out_dir = %out_dir.display(),
        "wrote crosswalk tables"
    );

    Ok(paths)
}

fn write_table<I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer
        .write_record(header)
        .with_context(|| format!("failed to write header to {}", path.display()))?;
    for row in rows {
        writer
            .write_record(&row)
            .with_context(|| format!("failed to write row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    Ok(())
}

pub(super) fn crosswalk_row(record: &CrosswalkRecord) -> Vec<String> {
    vec![
        record.alias.source_file.clone(),
        record.alias.name.clone(),
        record.alias.slug.clone(),
        record.alias.eco_code.clone(),
        record.classification.family_key.clone(),
        record.acceptance_status.as_str().to_string(),
        format!("{:.2}", record.classification.confidence),
        if record.needs_review { "TRUE" } else { "FALSE" }.to_string(),
        record.notes.clone(),
    ]
}

fn review_row(record: &ReviewRecord) -> Vec<String> {
    vec![
        record.alias_name.clone(),
        record.alias_slug.clone(),
        record.eco_code.clone(),
        record.reason.to_string(),
    ]
}

fn canonical_row(record: &CanonicalFamilyRecord) -> Vec<String> {
    vec![
        record.key.clone(),
        record.display_name.clone(),
        record.eco_group.clone(),
        record.notes.to_string(),
    ]
}
