//! Wide-to-long reshape of sequence-numbered columns.
//!
//! The reshape runs in three passes over a frame whose headers are already
//! normalized:
//!
//! 1. **Match**: every selected stem claims the columns it matches under the
//!    configured [`StemMatch`] rule. Each claimed column is split into its
//!    stem and trailing sequence number.
//! 2. **Unpivot**: each input row is keyed by its identifier values; every
//!    claimed cell lands in the slot `(identifiers, sequence, stem)`. The
//!    first non-missing value in input row order wins a slot.
//! 3. **Pivot**: one output row per identifier tuple and sequence number,
//!    optionally dropping rows whose selected-stem columns are all missing.
//!
//! Identifier tuples keep their first-appearance order; sequence numbers are
//! ordered numerically.

use std::{
    cmp::Ordering,
    collections::{HashMap, hash_map::Entry},
};

use clap::ValueEnum;
use itertools::Itertools;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ReshapeError, ReshapeResult},
    frame::{Cell, Frame},
    normalize::split_sequence,
};

pub const DEFAULT_SEQUENCE_COLUMN: &str = "Number";

/// How a selected stem finds its sequence-numbered columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum StemMatch {
    /// Any column whose name starts with the stem. `Turnover` also claims
    /// `Turnover_Region1`.
    #[default]
    Prefix,
    /// Only columns named exactly stem + trailing number.
    Exact,
}

impl StemMatch {
    pub fn matches(self, stem: &str, column: &str) -> bool {
        match self {
            StemMatch::Prefix => column.starts_with(stem),
            StemMatch::Exact => split_sequence(column).is_some_and(|(prefix, _)| prefix == stem),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshapeRequest {
    pub identifiers: Vec<String>,
    pub stems: Vec<String>,
    pub drop_empty_rows: bool,
    pub stem_match: StemMatch,
    /// Collapse repeated identifier tuples instead of failing.
    pub allow_duplicate_ids: bool,
    pub sequence_column: String,
}

impl ReshapeRequest {
    pub fn new(identifiers: Vec<String>, stems: Vec<String>) -> Self {
        Self {
            identifiers,
            stems,
            drop_empty_rows: false,
            stem_match: StemMatch::default(),
            allow_duplicate_ids: false,
            sequence_column: DEFAULT_SEQUENCE_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct ValueColumn {
    index: usize,
    variable: usize,
    sequence: usize,
}

#[derive(Debug, Default)]
struct ColumnPlan {
    columns: Vec<ValueColumn>,
    variables: Vec<String>,
    sequences: Vec<String>,
    /// Variables that stand for a selected stem; only these decide whether a
    /// long row is empty.
    selected: Vec<usize>,
}

pub fn reshape(frame: &Frame, request: &ReshapeRequest) -> ReshapeResult<Frame> {
    frame.ensure_unique_headers()?;
    if request.stems.is_empty() {
        return Err(ReshapeError::unexpected("no variable stems were selected"));
    }
    if let Some(repeated) = request.identifiers.iter().duplicates().next() {
        return Err(ReshapeError::duplicate_axis(repeated.clone()));
    }
    let id_indices = request
        .identifiers
        .iter()
        .map(|name| {
            frame.column_index(name).ok_or_else(|| {
                ReshapeError::unexpected(format!("identifier column '{name}' not found"))
            })
        })
        .collect::<ReshapeResult<Vec<_>>>()?;

    let plan = plan_columns(frame, request, &id_indices)?;
    check_output_headers(request, &plan)?;
    debug!(
        "Melting {} column(s) into {} variable(s) over {} sequence number(s)",
        plan.columns.len(),
        plan.variables.len(),
        plan.sequences.len()
    );

    let (keys, slots) = unpivot(frame, request, &id_indices, &plan)?;

    let mut headers = request.identifiers.clone();
    headers.push(request.sequence_column.clone());
    headers.extend(plan.variables.iter().cloned());

    let mut rows = Vec::with_capacity(keys.len() * plan.sequences.len());
    for (key, group) in keys.into_iter().zip(slots) {
        for (sequence, values) in plan.sequences.iter().zip(group) {
            if request.drop_empty_rows
                && plan.selected.iter().all(|&variable| values[variable].is_none())
            {
                continue;
            }
            let mut row = key.clone();
            row.push(Some(sequence.clone()));
            row.extend(values);
            rows.push(row);
        }
    }
    Ok(Frame::new(headers, rows))
}

fn plan_columns(
    frame: &Frame,
    request: &ReshapeRequest,
    id_indices: &[usize],
) -> ReshapeResult<ColumnPlan> {
    let mut plan = ColumnPlan::default();
    let mut claimed = vec![false; frame.column_count()];
    for &idx in id_indices {
        claimed[idx] = true;
    }

    for stem in &request.stems {
        let mut numbered = 0usize;
        let mut claimed_variables = Vec::new();
        for (idx, name) in frame.headers().iter().enumerate() {
            if !request.stem_match.matches(stem, name) {
                continue;
            }
            if claimed[idx] {
                if !id_indices.contains(&idx) {
                    numbered += 1;
                }
                continue;
            }
            let Some((variable, sequence)) = split_sequence(name) else {
                warn!("Column '{name}' matches stem '{stem}' but has no trailing number; skipping");
                continue;
            };
            claimed[idx] = true;
            numbered += 1;
            let variable = position_or_push(&mut plan.variables, variable);
            claimed_variables.push(variable);
            let sequence = position_or_push(&mut plan.sequences, sequence);
            plan.columns.push(ValueColumn {
                index: idx,
                variable,
                sequence,
            });
        }
        if numbered == 0 {
            return Err(ReshapeError::shape_mismatch(format!(
                "stem '{stem}' does not match any sequence-numbered column"
            )));
        }
        match plan.variables.iter().position(|variable| variable == stem) {
            Some(exact) => plan.selected.push(exact),
            None => plan.selected.extend(claimed_variables),
        }
    }

    let mut order = (0..plan.sequences.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| compare_sequence(&plan.sequences[*a], &plan.sequences[*b]));
    let mut rank = vec![0usize; order.len()];
    for (position, original) in order.iter().enumerate() {
        rank[*original] = position;
    }
    for column in &mut plan.columns {
        column.sequence = rank[column.sequence];
    }
    plan.selected = plan.selected.into_iter().unique().collect();
    plan.sequences = order
        .into_iter()
        .map(|original| plan.sequences[original].clone())
        .collect();
    Ok(plan)
}

fn check_output_headers(request: &ReshapeRequest, plan: &ColumnPlan) -> ReshapeResult<()> {
    let mut names = request.identifiers.iter().collect::<Vec<_>>();
    names.push(&request.sequence_column);
    names.extend(plan.variables.iter());
    match names.into_iter().duplicates().next() {
        Some(column) => Err(ReshapeError::duplicate_axis(column.clone())),
        None => Ok(()),
    }
}

type Slots = Vec<Vec<Vec<Cell>>>;

fn unpivot(
    frame: &Frame,
    request: &ReshapeRequest,
    id_indices: &[usize],
    plan: &ColumnPlan,
) -> ReshapeResult<(Vec<Vec<Cell>>, Slots)> {
    let mut keys: Vec<Vec<Cell>> = Vec::new();
    let mut first_row: Vec<usize> = Vec::new();
    let mut slots: Slots = Vec::new();
    let mut lookup: HashMap<Vec<Cell>, usize> = HashMap::new();

    for (row_idx, row) in frame.rows().iter().enumerate() {
        let key = id_indices.iter().map(|&idx| row[idx].clone()).collect_vec();
        let group = match lookup.entry(key) {
            Entry::Occupied(entry) => {
                let group = *entry.get();
                if !request.allow_duplicate_ids {
                    return Err(ReshapeError::shape_mismatch(duplicate_detail(
                        request,
                        entry.key(),
                        first_row[group],
                        row_idx,
                    )));
                }
                group
            }
            Entry::Vacant(entry) => {
                let group = keys.len();
                keys.push(entry.key().clone());
                entry.insert(group);
                first_row.push(row_idx);
                slots.push(vec![
                    vec![None; plan.variables.len()];
                    plan.sequences.len()
                ]);
                group
            }
        };
        for column in &plan.columns {
            let slot = &mut slots[group][column.sequence][column.variable];
            if slot.is_none() {
                slot.clone_from(&row[column.index]);
            }
        }
    }
    Ok((keys, slots))
}

fn duplicate_detail(
    request: &ReshapeRequest,
    key: &[Cell],
    first: usize,
    repeat: usize,
) -> String {
    if request.identifiers.is_empty() {
        return "no identifier columns were selected, so every row shares the same key".to_string();
    }
    let values = request
        .identifiers
        .iter()
        .zip(key)
        .map(|(name, value)| format!("{name}={}", value.as_deref().unwrap_or("")))
        .join(", ");
    format!("identifier values ({values}) repeat on data rows {first} and {repeat}")
}

fn position_or_push(values: &mut Vec<String>, value: &str) -> usize {
    match values.iter().position(|existing| existing == value) {
        Some(position) => position,
        None => {
            values.push(value.to_string());
            values.len() - 1
        }
    }
}

/// Orders digit strings by numeric value without parsing, so arbitrarily long
/// runs compare correctly; `01` sorts before `1`.
pub fn compare_sequence(a: &str, b: &str) -> Ordering {
    let trimmed_a = a.trim_start_matches('0');
    let trimmed_b = b.trim_start_matches('0');
    trimmed_a
        .len()
        .cmp(&trimmed_b.len())
        .then_with(|| trimmed_a.cmp(trimmed_b))
        .then_with(|| b.len().cmp(&a.len()))
}
