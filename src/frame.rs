//! In-memory table of named columns and optional string cells.
//!
//! A [`Frame`] holds the whole input. Cells whose text is one of the common
//! missing-value tokens (`""`, `NA`, `NaN`, `null`, ...) are stored as `None`
//! and written back out as empty fields.

use std::{collections::HashMap, io::Read, path::Path};

use anyhow::{Context, Result, anyhow};
use encoding_rs::Encoding;
use itertools::Itertools;
use log::debug;

use crate::{
    error::{ReshapeError, ReshapeResult},
    io_utils,
};

pub type Cell = Option<String>;

/// Tokens read as a missing value, matching common data-table CSV readers.
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing_token(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

pub fn parse_cell(value: String) -> Cell {
    if is_missing_token(&value) {
        None
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    /// Builds a frame, padding short rows with missing cells and ignoring
    /// surplus fields.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Builds a frame from raw text records, mapping missing tokens to `None`.
    pub fn from_text_rows(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| record.into_iter().map(parse_cell).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn load(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let input = io_utils::open_input(path)?;
        Self::read_from(input, delimiter, encoding)
            .with_context(|| format!("Reading CSV from {path:?}"))
    }

    pub fn read_from<R: Read>(
        reader: R,
        delimiter: u8,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader(reader, delimiter);
        let header_record = reader.byte_headers().context("Reading header row")?.clone();
        if header_record.is_empty() {
            return Err(anyhow!("Input has no header row"));
        }
        let headers = io_utils::decode_record(&header_record, encoding)?;

        let mut rows = Vec::new();
        for (idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {}", idx + 2))?;
            rows.push(decoded.into_iter().map(parse_cell).collect());
        }
        debug!(
            "Loaded {} row(s) across {} column(s)",
            rows.len(),
            headers.len()
        );
        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).and_then(|cell| cell.as_deref()))
    }

    /// Fails with a duplicate-axis error naming the first repeated header.
    pub fn ensure_unique_headers(&self) -> ReshapeResult<()> {
        match self.headers.iter().duplicates().next() {
            Some(column) => Err(ReshapeError::duplicate_axis(column.clone())),
            None => Ok(()),
        }
    }

    /// Renames headers through a raw -> new mapping. Headers missing from the
    /// mapping keep their name. Two resulting headers with the same name are a
    /// duplicate-axis failure.
    pub fn rename(self, mapping: &[(String, String)]) -> ReshapeResult<Self> {
        let lookup = mapping
            .iter()
            .map(|(raw, renamed)| (raw.as_str(), renamed.as_str()))
            .collect::<HashMap<_, _>>();
        let headers = self
            .headers
            .iter()
            .map(|header| match lookup.get(header.as_str()) {
                Some(renamed) => (*renamed).to_string(),
                None => header.clone(),
            })
            .collect();
        let renamed = Self {
            headers,
            rows: self.rows,
        };
        renamed.ensure_unique_headers()?;
        Ok(renamed)
    }

    /// Rows rendered as text with missing cells left empty.
    pub fn text_rows(&self, limit: Option<usize>) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|row| {
                row.iter()
                    .map(|cell| cell.clone().unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}
