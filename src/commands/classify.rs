use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::ClassifyArgs;
use crate::commands::build::process_record;
use crate::family::{FamilyClassifier, ResolutionTier};
use crate::model::{AcceptanceStatus, AliasRecord};

#[derive(Debug, Serialize)]
struct ClassifyResponse {
    name: String,
    eco_code: String,
    family_hint: String,
    canonical_family_key: String,
    confidence: f64,
    tier: ResolutionTier,
    acceptance_status: AcceptanceStatus,
    needs_review: bool,
    notes: String,
}

pub fn run(args: ClassifyArgs) -> Result<()> {
    let classifier = FamilyClassifier::new()?;
    let alias = AliasRecord {
        name: args.name,
        eco_code: args.eco,
        family_hint: args.family_hint.unwrap_or_default(),
        source_file: "cli".to_string(),
        ..AliasRecord::default()
    };

    let crosswalk = process_record(&classifier, alias).crosswalk;
    let response = ClassifyResponse {
        name: crosswalk.alias.name,
        eco_code: crosswalk.alias.eco_code,
        family_hint: crosswalk.alias.family_hint,
        canonical_family_key: crosswalk.classification.family_key,
        confidence: crosswalk.classification.confidence,
        tier: crosswalk.classification.tier,
        acceptance_status: crosswalk.acceptance_status,
        needs_review: crosswalk.needs_review,
        notes: crosswalk.notes,
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &response)
            .context("failed to serialize classify json output")?;
        writeln!(output)?;
    } else {
        write_text_response(&mut output, &response)?;
    }
    output.flush()?;

    Ok(())
}

fn write_text_response(output: &mut impl Write, response: &ClassifyResponse) -> Result<()> {
    let key = if response.canonical_family_key.is_empty() {
        "(unresolved)"
    } else {
        &response.canonical_family_key
    };

    writeln!(output, "Name: {}", response.name)?;
    writeln!(
        output,
        "Family: {key}\tconfidence={:.2}\ttier={}",
        response.confidence,
        response.tier.as_str()
    )?;
    writeln!(
        output,
        "Status: {}\tneeds_review={}",
        response.acceptance_status.as_str(),
        response.needs_review
    )?;
    if !response.notes.is_empty() {
        writeln!(output, "Notes: {}", response.notes)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_response_marks_unresolved_family() {
        let response = ClassifyResponse {
            name: "mystery".to_string(),
            eco_code: "Z99".to_string(),
            family_hint: String::new(),
            canonical_family_key: String::new(),
            confidence: 0.0,
            tier: ResolutionTier::Unresolved,
            acceptance_status: AcceptanceStatus::Neutral,
            needs_review: true,
            notes: String::new(),
        };

        let mut buffer = Vec::new();
        write_text_response(&mut buffer, &response).expect("write");
        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(
            text,
            "Name: mystery\nFamily: (unresolved)\tconfidence=0.00\ttier=unresolved\nStatus: neutral\tneeds_review=true\n"
        );
    }
}
