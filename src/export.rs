//! CSV encoding of reshaped frames.
//!
//! Output is UTF-8, comma-delimited by default, minimally quoted, and writes
//! missing cells as empty fields. The row index column is left out unless
//! [`ExportOptions::include_row_index`] is set, in which case a leading
//! unnamed column numbers data rows from zero.
//!
//! [`EncodedCsvCache`] remembers the bytes of the last encoded frame keyed by
//! a SHA-256 fingerprint of its contents, so rendering the same result twice
//! in one session encodes it once.

use std::{fmt::Write as _, sync::Arc};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use log::debug;
use sha2::{Digest, Sha256};

use crate::frame::Frame;

pub const DEFAULT_OUTPUT_FILE: &str = "new_df.csv";
pub const OUTPUT_MIME: &str = "text/csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub delimiter: u8,
    pub include_row_index: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            include_row_index: false,
        }
    }
}

pub fn encode_csv(frame: &Frame, options: ExportOptions) -> Result<Vec<u8>> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(options.delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    let mut writer = builder.from_writer(Vec::new());

    let mut header = Vec::with_capacity(frame.column_count() + 1);
    if options.include_row_index {
        header.push("");
    }
    header.extend(frame.headers().iter().map(String::as_str));
    writer.write_record(&header).context("Writing output headers")?;

    for (idx, row) in frame.rows().iter().enumerate() {
        let position = idx.to_string();
        let mut record = Vec::with_capacity(row.len() + 1);
        if options.include_row_index {
            record.push(position.as_str());
        }
        record.extend(row.iter().map(|cell| cell.as_deref().unwrap_or("")));
        writer
            .write_record(&record)
            .with_context(|| format!("Writing output row {}", idx + 1))?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV buffer: {}", err.error()))
}

/// Hex SHA-256 over headers and cells, distinguishing missing from empty.
pub fn fingerprint(frame: &Frame) -> String {
    let mut hasher = Sha256::new();
    hasher.update((frame.column_count() as u64).to_le_bytes());
    for header in frame.headers() {
        hash_field(&mut hasher, Some(header.as_str()));
    }
    for row in frame.rows() {
        hasher.update([0x1e_u8]);
        for cell in row {
            hash_field(&mut hasher, cell.as_deref());
        }
    }
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
}

fn hash_field(hasher: &mut Sha256, field: Option<&str>) {
    match field {
        Some(text) => {
            hasher.update([0x01_u8]);
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }
        None => hasher.update([0x00_u8]),
    }
}

#[derive(Debug, Clone)]
pub struct EncodedCsv {
    pub fingerprint: String,
    pub options: ExportOptions,
    pub bytes: Arc<[u8]>,
}

/// Keeps the most recent encoding so a caller holding one session can export
/// the same long frame repeatedly (preview then save, or several
/// destinations) without re-encoding. The `melt` command encodes once per
/// process, so it always misses; the fingerprint it computes is still logged
/// and returned with the bytes.
#[derive(Debug, Default)]
pub struct EncodedCsvCache {
    last: Option<EncodedCsv>,
    hits: usize,
    misses: usize,
}

impl EncodedCsvCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, frame: &Frame, options: ExportOptions) -> Result<EncodedCsv> {
        let fingerprint = fingerprint(frame);
        if let Some(cached) = &self.last
            && cached.fingerprint == fingerprint
            && cached.options == options
        {
            self.hits += 1;
            debug!("Reusing encoded CSV {}", &fingerprint[..12]);
            return Ok(cached.clone());
        }
        self.misses += 1;
        let bytes = encode_csv(frame, options)?;
        debug!(
            "Encoded CSV {} ({} byte(s))",
            &fingerprint[..12],
            bytes.len()
        );
        let encoded = EncodedCsv {
            fingerprint,
            options,
            bytes: Arc::from(bytes),
        };
        self.last = Some(encoded.clone());
        Ok(encoded)
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
