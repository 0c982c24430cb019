use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};

use crate::{
    cli::MeltArgs,
    export::OUTPUT_MIME,
    io_utils,
    plan::MeltPlan,
    session::MeltSession,
    table,
};

pub fn execute(args: &MeltArgs) -> Result<()> {
    let mut plan = match &args.plan {
        Some(path) => {
            MeltPlan::load(path).with_context(|| format!("Loading plan from {path:?}"))?
        }
        None => MeltPlan::default(),
    };
    apply_overrides(&mut plan, args);
    plan.validate()?;

    let frame = crate::load_input(&args.source)?;
    info!(
        "Melting '{}' ({} row(s), {} column(s), delimiter '{}')",
        args.source.input.display(),
        frame.row_count(),
        frame.column_count(),
        crate::printable_delimiter(io_utils::resolve_input_delimiter(
            &args.source.input,
            args.source.delimiter
        ))
    );
    let mut session = MeltSession::new(frame, &plan.rules);
    for warning in session.diagnostics().warnings() {
        warn!("{warning}");
    }

    plan.identifiers = session.resolve_identifiers(&plan.identifiers);
    debug!("Identifiers: {:?}", plan.identifiers);
    debug!("Stems: {:?} ({:?} match)", plan.stems, plan.stem_match);

    let output = session.melt(&plan.request()).map_err(|err| {
        warn!("Melt failed ({:?}): {err}", err.kind());
        anyhow!(err.user_message())
    })?;

    if let Some(path) = &args.save_plan {
        plan.save(path)
            .with_context(|| format!("Writing plan to {path:?}"))?;
        info!("Saved melt plan to {path:?}");
    }

    if args.table {
        table::print_frame(&output, None);
        info!(
            "Rendered {} long row(s) across {} column(s)",
            output.row_count(),
            output.column_count()
        );
        return Ok(());
    }

    let encoded = session.encode(&output, plan.export_options())?;
    io_utils::write_output(&args.output, &encoded.bytes)?;
    info!(
        "Wrote {} long row(s) across {} column(s) -> {} ({OUTPUT_MIME}, {} byte(s))",
        output.row_count(),
        output.column_count(),
        io_utils::describe_destination(&args.output),
        encoded.bytes.len()
    );
    Ok(())
}

fn apply_overrides(plan: &mut MeltPlan, args: &MeltArgs) {
    let identifiers = crate::clean_list(&args.identifiers);
    if !identifiers.is_empty() {
        plan.identifiers = identifiers;
    }
    let stems = crate::clean_list(&args.stems);
    if !stems.is_empty() {
        plan.stems = stems;
    }
    if args.drop_empty_rows {
        plan.drop_empty_rows = true;
    }
    if let Some(stem_match) = args.stem_match {
        plan.stem_match = stem_match;
    }
    if args.allow_duplicate_ids {
        plan.allow_duplicate_ids = true;
    }
    if args.row_index {
        plan.include_row_index = true;
    }
    if let Some(name) = &args.sequence_column {
        plan.sequence_column = name.clone();
    }
}
