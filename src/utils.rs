use std::fmt::Write as _;

use crate::frame::FrameSummary;
use crate::tools::Preview;

/// `(rows, cols)` rendered the way the summaries print it.
pub fn format_shape(rows: usize, cols: usize) -> String {
    format!("({rows}, {cols})")
}

/// Bracketed, quoted list of column names.
pub fn format_columns<S: AsRef<str>>(columns: &[S]) -> String {
    let quoted: Vec<String> = columns
        .iter()
        .map(|c| format!("'{}'", c.as_ref()))
        .collect();
    format!("[{}]", quoted.join(", "))
}

pub fn render_summary(summary: &FrameSummary) -> String {
    format!(
        "Loaded DataFrame with shape: {}\nColumn names: {}",
        format_shape(summary.rows, summary.cols),
        format_columns(&summary.columns)
    )
}

pub fn print_summary(summary: &FrameSummary) {
    println!("{}", render_summary(summary));
}

pub fn render_preview(preview: &Preview) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "shape {}",
        format_shape(preview.summary.rows, preview.summary.cols)
    );
    let _ = writeln!(out, "columns: {}", format_columns(&preview.columns));
    let _ = write!(out, "{}", preview.head);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DType;

    #[test]
    fn summary_lists_shape_and_columns() {
        let summary = FrameSummary {
            rows: 2,
            cols: 2,
            columns: vec!["a".into(), "b".into()],
            dtypes: vec![DType::Int64, DType::Int64],
        };
        assert_eq!(
            render_summary(&summary),
            "Loaded DataFrame with shape: (2, 2)\nColumn names: ['a', 'b']"
        );
    }

    #[test]
    fn empty_column_list() {
        assert_eq!(format_columns::<&str>(&[]), "[]");
    }
}
