//! Plain-text table rendering for previews and `--table` output.
//!
//! Wide exports often carry long free-text cells, so cells are cut at
//! [`MAX_CELL_WIDTH`] characters with a trailing `…`. Control characters
//! are flattened to spaces and missing cells are shown as `NaN`.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::frame::Frame;

pub const MAX_CELL_WIDTH: usize = 32;
pub const MISSING_MARKER: &str = "NaN";

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let cell_headers = headers.iter().map(|h| clip(h)).collect::<Vec<_>>();
    let cell_rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = cell_headers
        .iter()
        .map(|h| h.chars().count().max(1))
        .collect::<Vec<_>>();
    for row in &cell_rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(&cell_headers, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths));
    for row in &cell_rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Renders up to `limit` rows, led by a zero-based row position column.
pub fn render_frame(frame: &Frame, limit: Option<usize>) -> String {
    let mut headers = Vec::with_capacity(frame.column_count() + 1);
    headers.push(String::new());
    headers.extend(frame.headers().iter().cloned());
    let rows = frame
        .rows()
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(idx, row)| {
            let mut cells = Vec::with_capacity(row.len() + 1);
            cells.push(idx.to_string());
            cells.extend(
                row.iter()
                    .map(|cell| cell.as_deref().unwrap_or(MISSING_MARKER).to_string()),
            );
            cells
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

pub fn print_frame(frame: &Frame, limit: Option<usize>) {
    print!("{}", render_frame(frame, limit));
}

fn format_row<S: AsRef<str>>(values: &[S], widths: &[usize]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", value.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn clip(value: &str) -> Cow<'_, str> {
    let flattened: Cow<'_, str> = if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    };
    if flattened.chars().count() <= MAX_CELL_WIDTH {
        return flattened;
    }
    let mut clipped = flattened
        .chars()
        .take(MAX_CELL_WIDTH - 1)
        .collect::<String>();
    clipped.push('…');
    Cow::Owned(clipped)
}
