//! Request-scoped state for one input file.
//!
//! A [`MeltSession`] owns the raw frame and everything derived from it
//! (normalized headers, diagnostics, encoded output). Commands build one per
//! invocation and pass it around explicitly.

use anyhow::Result;
use log::{debug, warn};

use crate::{
    diagnostics::{self, Diagnostics},
    error::ReshapeResult,
    export::{EncodedCsv, EncodedCsvCache, ExportOptions},
    frame::Frame,
    normalize::{self, NormalizedColumn, NormalizerRules},
    reshape::{self, ReshapeRequest},
};

#[derive(Debug)]
pub struct MeltSession {
    raw: Frame,
    columns: Vec<NormalizedColumn>,
    renames: Vec<(String, String)>,
    cache: EncodedCsvCache,
}

impl MeltSession {
    pub fn new(raw: Frame, rules: &NormalizerRules) -> Self {
        let columns = normalize::normalize_columns(raw.headers(), rules);
        for column in columns.iter().filter(|column| column.multiple_digit_runs) {
            warn!(
                "Header '{}' holds more than one number; normalized to '{}'",
                column.raw, column.normalized
            );
        }
        let renames = normalize::rename_map(raw.headers(), rules);
        Self {
            raw,
            columns,
            renames,
            cache: EncodedCsvCache::new(),
        }
    }

    pub fn raw(&self) -> &Frame {
        &self.raw
    }

    pub fn columns(&self) -> &[NormalizedColumn] {
        &self.columns
    }

    pub fn normalized_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.normalized.clone())
            .collect()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        diagnostics::inspect(&self.raw)
    }

    pub fn collisions(&self) -> Vec<String> {
        normalize::find_collisions(&self.normalized_names())
    }

    pub fn candidate_stems(&self, identifiers: &[String]) -> Vec<String> {
        normalize::candidate_stems(&self.normalized_names(), identifiers)
    }

    /// Maps each requested identifier to its normalized name. Names that
    /// already match a normalized header are kept; raw headers are
    /// translated; anything else passes through for the reshape to reject.
    pub fn resolve_identifiers(&self, requested: &[String]) -> Vec<String> {
        requested
            .iter()
            .map(|name| {
                if self.columns.iter().any(|column| column.normalized == *name) {
                    return name.clone();
                }
                match self.columns.iter().find(|column| column.raw == *name) {
                    Some(column) => {
                        debug!("Identifier '{name}' resolved to '{}'", column.normalized);
                        column.normalized.clone()
                    }
                    None => name.clone(),
                }
            })
            .collect()
    }

    /// Renames the raw frame to its normalized headers and reshapes it.
    pub fn melt(&self, request: &ReshapeRequest) -> ReshapeResult<Frame> {
        let renamed = self.raw.clone().rename(&self.renames)?;
        reshape::reshape(&renamed, request)
    }

    pub fn encode(&mut self, frame: &Frame, options: ExportOptions) -> Result<EncodedCsv> {
        self.cache.encode(frame, options)
    }

    pub fn cache(&self) -> &EncodedCsvCache {
        &self.cache
    }
}
