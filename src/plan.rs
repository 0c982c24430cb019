//! Melt plans: the selections of one melt saved as YAML.
//!
//! A plan records everything needed to repeat a melt on the next export of
//! the same shape: identifiers, stems, row filtering, matching rule, output
//! layout, and the header rewriting rules.
//!
//! ```yaml
//! identifiers: [Company_name]
//! stems: [Turnover_]
//! drop_empty_rows: true
//! stem_match: exact
//! ```

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    export::ExportOptions,
    normalize::NormalizerRules,
    reshape::{DEFAULT_SEQUENCE_COLUMN, ReshapeRequest, StemMatch},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeltPlan {
    pub identifiers: Vec<String>,
    pub stems: Vec<String>,
    pub drop_empty_rows: bool,
    pub stem_match: StemMatch,
    pub allow_duplicate_ids: bool,
    pub include_row_index: bool,
    pub sequence_column: String,
    pub rules: NormalizerRules,
}

impl Default for MeltPlan {
    fn default() -> Self {
        Self {
            identifiers: Vec::new(),
            stems: Vec::new(),
            drop_empty_rows: false,
            stem_match: StemMatch::default(),
            allow_duplicate_ids: false,
            include_row_index: false,
            sequence_column: DEFAULT_SEQUENCE_COLUMN.to_string(),
            rules: NormalizerRules::default(),
        }
    }
}

impl MeltPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening plan file {path:?}"))?;
        let reader = BufReader::new(file);
        let plan: MeltPlan = serde_yaml::from_reader(reader).context("Parsing plan YAML")?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating plan file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing plan YAML")
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.sequence_column.trim().is_empty(),
            "Plan sequence_column cannot be empty"
        );
        for substitution in &self.rules.phrase_substitutions {
            ensure!(
                !substitution.phrase.is_empty(),
                "Plan phrase substitutions need a non-empty phrase"
            );
        }
        Ok(())
    }

    pub fn request(&self) -> ReshapeRequest {
        ReshapeRequest {
            identifiers: self.identifiers.clone(),
            stems: self.stems.clone(),
            drop_empty_rows: self.drop_empty_rows,
            stem_match: self.stem_match,
            allow_duplicate_ids: self.allow_duplicate_ids,
            sequence_column: self.sequence_column.clone(),
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            include_row_index: self.include_row_index,
            ..ExportOptions::default()
        }
    }
}
