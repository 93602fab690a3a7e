use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::model::AliasRecord;
use crate::normalize::normalize_text;
use crate::util::{file_name_string, sha256_hex};

const SNIFF_BYTES: usize = 4096;

const NAME_HEADERS: &[&str] = &["name", "opening", "alias_name"];
const ECO_HEADERS: &[&str] = &["eco", "eco_code"];
const SLUG_HEADERS: &[&str] = &["slug", "alias_slug"];
const FAMILY_HEADERS: &[&str] = &["family name", "family_name", "family"];

#[derive(Debug)]
pub(super) struct SourceFile {
    pub(super) filename: String,
    pub(super) sha256: String,
    pub(super) records: Vec<AliasRecord>,
}

pub(super) fn discover_sources(input_glob: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(input_glob)
        .with_context(|| format!("invalid input glob pattern: {input_glob}"))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("failed to read glob match for {input_glob}"))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths)
}

/// The delimiter is taken from the header line of the first file only and
/// then applied to every file in the batch.
pub(super) fn sniff_delimiter(path: &Path) -> Result<u8> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut bytes = Vec::with_capacity(SNIFF_BYTES);
    file.take(SNIFF_BYTES as u64)
        .read_to_end(&mut bytes)
        .with_context(|| format!("failed to read {}", path.display()))?;

    Ok(detect_delimiter(first_line(&decode_lossy(&bytes))))
}

/// Any of `\n`, `\r\n` or a bare `\r` ends the line.
pub(super) fn first_line(head: &str) -> &str {
    head.split(['\r', '\n']).next().unwrap_or("")
}

pub(super) fn detect_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

pub(super) fn decode_lossy(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

pub(super) fn read_source_file(path: &Path, delimiter: u8) -> Result<SourceFile> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = file_name_string(path);
    let content = decode_lossy(&bytes);
    let records = parse_alias_records(&content, delimiter, &filename)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    debug!(file = %filename, rows = records.len(), "read alias source");

    Ok(SourceFile {
        filename,
        sha256: sha256_hex(&bytes),
        records,
    })
}

/// Parses delimited text into raw alias records. Field values are passed
/// through untouched; normalization happens in the row processor.
pub(super) fn parse_alias_records(
    content: &str,
    delimiter: u8,
    source_file: &str,
) -> Result<Vec<AliasRecord>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = HeaderIndex::new(reader.headers().context("failed to read header row")?);

    let mut records = Vec::new();
    for (row_index, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("failed to read row {}", row_index + 1))?;
        records.push(AliasRecord {
            name: headers.lookup(&row, NAME_HEADERS),
            eco_code: headers.lookup(&row, ECO_HEADERS),
            slug: headers.lookup(&row, SLUG_HEADERS),
            family_hint: headers.lookup(&row, FAMILY_HEADERS),
            source_file: source_file.to_string(),
        });
    }

    Ok(records)
}

struct HeaderIndex {
    columns: HashMap<String, Vec<usize>>,
}

impl HeaderIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        let mut columns: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            let key = normalize_text(Some(header)).to_lowercase();
            columns.entry(key).or_default().push(index);
        }
        Self { columns }
    }

    /// First non-blank value across the synonyms, in synonym order.
    fn lookup(&self, row: &csv::StringRecord, synonyms: &[&str]) -> String {
        synonyms
            .iter()
            .filter_map(|synonym| self.columns.get(*synonym))
            .flatten()
            .filter_map(|index| row.get(*index))
            .find(|value| !value.trim().is_empty())
            .unwrap_or("")
            .to_string()
    }
}
