use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::BuildArgs;
use crate::family::FamilyClassifier;
use crate::model::{CrosswalkCounts, CrosswalkOutputs, CrosswalkRunManifest, SourceFileEntry};
use crate::util::{now_utc_string, write_json_pretty};

use super::aggregate::CrosswalkAggregate;
use super::emit::{EmittedPaths, emit_tables};
use super::process::process_record;
use super::source::{SourceFile, discover_sources, read_source_file, sniff_delimiter};

pub const MANIFEST_FILENAME: &str = "crosswalk_run.json";
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub input_glob: String,
    pub out_dir: PathBuf,
    pub write_manifest: bool,
}

impl From<BuildArgs> for BuildConfig {
    fn from(args: BuildArgs) -> Self {
        Self {
            input_glob: args.input_glob,
            out_dir: args.out_dir,
            write_manifest: !args.no_manifest,
        }
    }
}

#[derive(Debug)]
pub struct BuildSummary {
    pub paths: EmittedPaths,
    pub manifest_path: Option<PathBuf>,
    pub counts: CrosswalkCounts,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let config = BuildConfig::from(args);
    let summary = build_crosswalk(&config)?;

    let mut output = io::BufWriter::new(io::stdout().lock());
    for path in summary.paths.all() {
        writeln!(output, "Wrote: {}", path.display())?;
    }
    output.flush().context("failed to flush stdout")?;

    if let Some(manifest_path) = &summary.manifest_path {
        info!(path = %manifest_path.display(), "wrote crosswalk run manifest");
    }
    if summary.counts.review_count > 0 {
        warn!(
            review = summary.counts.review_count,
            rows = summary.counts.row_count,
            "aliases queued for review"
        );
    }

    Ok(())
}

pub fn build_crosswalk(config: &BuildConfig) -> Result<BuildSummary> {
    info!(
        input_glob = %config.input_glob,
        out_dir = %config.out_dir.display(),
        "starting crosswalk build"
    );

    let classifier = FamilyClassifier::new()?;
    let source_paths = discover_sources(&config.input_glob)?;
    if source_paths.is_empty() {
        warn!(input_glob = %config.input_glob, "no alias sources matched");
    }

    let delimiter = match source_paths.first() {
        Some(first) => sniff_delimiter(first)?,
        None => b',',
    };

    let mut aggregate = CrosswalkAggregate::default();
    let mut sources = Vec::with_capacity(source_paths.len());
    for path in &source_paths {
        let SourceFile {
            filename,
            sha256,
            records,
        } = read_source_file(path, delimiter)?;

        sources.push(SourceFileEntry {
            filename,
            sha256,
            row_count: records.len(),
        });
        for record in records {
            aggregate.record(process_record(&classifier, record));
        }
    }

    let paths = emit_tables(&config.out_dir, &aggregate)?;
    let counts = aggregate.counts(sources.len());

    let manifest_path = if config.write_manifest {
        let manifest_path = config.out_dir.join(MANIFEST_FILENAME);
        let manifest = CrosswalkRunManifest {
            manifest_version: MANIFEST_VERSION,
            generated_at: now_utc_string(),
            input_glob: config.input_glob.clone(),
            delimiter: char::from(delimiter).to_string(),
            sources,
            counts: counts.clone(),
            outputs: CrosswalkOutputs {
                crosswalk_path: display_path(&paths.crosswalk),
                review_path: display_path(&paths.review),
                canonical_path: display_path(&paths.canonical),
            },
            families: aggregate.canonical_families(),
        };
        write_json_pretty(&manifest_path, &manifest)?;
        Some(manifest_path)
    } else {
        None
    };

    info!(
        sources = counts.source_file_count,
        rows = counts.row_count,
        review = counts.review_count,
        families = counts.family_count,
        "crosswalk build completed"
    );

    Ok(BuildSummary {
        paths,
        manifest_path,
        counts,
    })
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
