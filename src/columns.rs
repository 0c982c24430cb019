//! Normalized column listing.
//!
//! Shows how every raw header will be renamed before a melt, flags headers
//! that collide or carry more than one number, and lists the variable stems
//! still available once the identifiers are set aside.

use std::io::Write;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use crate::{
    cli::ColumnsArgs,
    diagnostics::Diagnostics,
    normalize::{NormalizedColumn, NormalizerRules},
    plan::MeltPlan,
    session::MeltSession,
    table,
};

#[derive(Debug, Serialize)]
pub struct ColumnsReport<'a> {
    pub columns: &'a [NormalizedColumn],
    pub identifiers: Vec<String>,
    pub candidate_stems: Vec<String>,
    pub collisions: Vec<String>,
    pub diagnostics: Diagnostics,
}

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let plan = match &args.plan {
        Some(path) => {
            MeltPlan::load(path).with_context(|| format!("Loading plan from {path:?}"))?
        }
        None => MeltPlan::default(),
    };
    let rules: &NormalizerRules = &plan.rules;
    let requested = if args.identifiers.is_empty() {
        plan.identifiers.clone()
    } else {
        crate::clean_list(&args.identifiers)
    };

    let frame = crate::load_input(&args.source)?;
    let session = MeltSession::new(frame, rules);
    let identifiers = session.resolve_identifiers(&requested);
    let report = ColumnsReport {
        columns: session.columns(),
        candidate_stems: session.candidate_stems(&identifiers),
        identifiers,
        collisions: session.collisions(),
        diagnostics: session.diagnostics(),
    };

    if args.json {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &report).context("Writing columns JSON")?;
        writeln!(stdout).context("Writing columns JSON")?;
    } else {
        print_report(&report);
    }

    for collision in &report.collisions {
        warn!("Several headers normalize to '{collision}'; melting will fail until one is renamed");
    }
    for warning in report.diagnostics.warnings() {
        warn!("{warning}");
    }
    info!(
        "Listed {} column(s) and {} candidate stem(s) from {:?}",
        report.columns.len(),
        report.candidate_stems.len(),
        args.source.input
    );
    Ok(())
}

fn print_report(report: &ColumnsReport<'_>) {
    let headers = vec![
        "#".to_string(),
        "raw".to_string(),
        "normalized".to_string(),
        "stem".to_string(),
        "note".to_string(),
    ];
    let rows = report
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.raw.clone(),
                column.normalized.clone(),
                column.stem.clone(),
                column_note(report, column),
            ]
        })
        .collect::<Vec<_>>();
    print!("{}", table::render_table(&headers, &rows));

    println!();
    if report.candidate_stems.is_empty() {
        println!("No candidate stems.");
    } else {
        println!("Candidate stems:");
        for stem in &report.candidate_stems {
            println!("  {stem}");
        }
    }
}

fn column_note(report: &ColumnsReport<'_>, column: &NormalizedColumn) -> String {
    let mut notes = Vec::new();
    if report.identifiers.contains(&column.normalized) {
        notes.push("identifier");
    }
    if report.collisions.contains(&column.normalized) {
        notes.push("duplicate");
    }
    if column.multiple_digit_runs {
        notes.push("multiple numbers");
    }
    notes.join(", ")
}
