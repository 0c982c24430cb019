//! Pre-melt checks for fully blank columns and rows.

use itertools::Itertools;
use serde::Serialize;

use crate::frame::Frame;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub blank_columns: Vec<String>,
    /// Zero-based positions of data rows (the header is not counted).
    pub blank_rows: Vec<usize>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.blank_columns.is_empty() && self.blank_rows.is_empty()
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.blank_columns.is_empty() {
            warnings.push(format!(
                "The following columns are completely blank and should be removed: {}",
                self.blank_columns.join(", ")
            ));
        }
        if !self.blank_rows.is_empty() {
            warnings.push(format!(
                "The following rows are completely blank and should be removed: {}",
                self.blank_rows.iter().join(", ")
            ));
        }
        warnings
    }
}

/// A frame without data rows reports nothing.
pub fn inspect(frame: &Frame) -> Diagnostics {
    if frame.is_empty() {
        return Diagnostics::default();
    }
    let blank_columns = frame
        .headers()
        .iter()
        .enumerate()
        .filter(|(idx, _)| frame.column(*idx).all(|cell| cell.is_none()))
        .map(|(_, name)| name.clone())
        .collect();
    let blank_rows = frame
        .rows()
        .iter()
        .positions(|row| row.iter().all(Option::is_none))
        .collect();
    Diagnostics {
        blank_columns,
        blank_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(headers: &[&str], rows: &[&[&str]]) -> Frame {
        Frame::from_text_rows(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn reports_blank_columns_and_rows() {
        let frame = frame(
            &["id", "empty", "value"],
            &[&["1", "", "10"], &["", "", ""], &["3", "NA", ""]],
        );
        let diagnostics = inspect(&frame);
        assert_eq!(diagnostics.blank_columns, vec!["empty"]);
        assert_eq!(diagnostics.blank_rows, vec![1]);
        let warnings = diagnostics.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].ends_with("removed: empty"));
        assert!(warnings[1].ends_with("removed: 1"));
    }

    #[test]
    fn clean_frame_has_no_warnings() {
        let frame = frame(&["id"], &[&["1"]]);
        assert!(inspect(&frame).is_clean());
        assert!(inspect(&frame).warnings().is_empty());
    }

    #[test]
    fn header_only_frame_is_clean() {
        let frame = frame(&["id", "value"], &[]);
        assert!(inspect(&frame).is_clean());
    }
}
