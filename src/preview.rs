use anyhow::Result;
use log::{info, warn};

use crate::{cli::PreviewArgs, diagnostics, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let frame = crate::load_input(&args.source)?;
    table::print_frame(&frame, Some(args.rows));
    info!(
        "Displayed {} of {} row(s) from {:?}",
        frame.row_count().min(args.rows),
        frame.row_count(),
        args.source.input
    );

    let report = diagnostics::inspect(&frame);
    for warning in report.warnings() {
        warn!("{warning}");
    }
    Ok(())
}
