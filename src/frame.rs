//! In-memory, column-typed table produced by every ingestor.
//!
//! Columns carry a single inferred [`DType`]; a missing value is [`Cell::Null`]
//! regardless of dtype. Row labels are always the implicit `0..n` range.

use std::fmt;

use serde::Serialize;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Object,
}

impl DType {
    /// Dtype of a column built by stacking a column of `self` on one of `other`.
    pub fn unify(self, other: DType) -> DType {
        match (self, other) {
            (a, b) if a == b => a,
            (DType::Int64, DType::Float64) | (DType::Float64, DType::Int64) => DType::Float64,
            _ => DType::Object,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell; bools map to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Cell::Null | Cell::Str(_) => None,
        }
    }

    fn cast(self, dtype: DType) -> Cell {
        match (self, dtype) {
            (Cell::Int(v), DType::Float64) => Cell::Float(v as f64),
            (cell, _) => cell,
        }
    }

    /// Text written to a CSV field; nulls become empty fields.
    pub fn csv_field(&self) -> String {
        match self {
            Cell::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("NaN"),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) if v.is_nan() => f.write_str("NaN"),
            // Integral floats keep a trailing ".0" so they read back as floats.
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                write!(f, "{v:.1}")
            }
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DType, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|c| c.is_null()).count()
    }
}

/// Shape and schema of a frame, suitable for printing or JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub rows: usize,
    pub cols: usize,
    pub columns: Vec<String>,
    pub dtypes: Vec<DType>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first()
            && let Some(bad) = columns.iter().find(|c| c.len() != first.len())
        {
            return Err(IngestError::ShapeMismatch(format!(
                "{:?} has {} rows, {:?} has {}",
                first.name,
                first.len(),
                bad.name,
                bad.len()
            )));
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = c.values.iter().take(n).cloned().collect();
                Column::new(c.name.clone(), c.dtype, values)
            })
            .collect();
        Frame { columns }
    }

    /// Stack frames row-wise with a fresh `0..n` index.
    ///
    /// Columns are the union of all inputs in order of first appearance. A
    /// frame that lacks a column contributes nulls, which count as `float64`
    /// when unifying dtypes.
    pub fn concat(frames: impl IntoIterator<Item = Frame>) -> Result<Frame> {
        let frames: Vec<Frame> = frames.into_iter().collect();
        if frames.is_empty() {
            return Err(IngestError::EmptyConcat);
        }

        let mut names: Vec<String> = Vec::new();
        for frame in &frames {
            for column in &frame.columns {
                if !names.contains(&column.name) {
                    names.push(column.name.clone());
                }
            }
        }

        let total_rows = frames.iter().map(Frame::n_rows).sum();
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let mut dtype: Option<DType> = None;
            for frame in &frames {
                let part = match frame.column(&name) {
                    Some(column) => column.dtype,
                    None if frame.is_empty() => continue,
                    None => DType::Float64,
                };
                dtype = Some(dtype.map_or(part, |d| d.unify(part)));
            }
            let dtype = dtype.unwrap_or(DType::Object);

            let mut values = Vec::with_capacity(total_rows);
            for frame in &frames {
                match frame.column(&name) {
                    Some(column) => {
                        values.extend(column.values.iter().cloned().map(|c| c.cast(dtype)))
                    }
                    None => values.extend(std::iter::repeat_n(Cell::Null, frame.n_rows())),
                }
            }
            columns.push(Column::new(name, dtype, values));
        }

        Frame::new(columns)
    }

    pub fn summary(&self) -> FrameSummary {
        FrameSummary {
            rows: self.n_rows(),
            cols: self.columns.len(),
            columns: self.columns.iter().map(|c| c.name.clone()).collect(),
            dtypes: self.columns.iter().map(|c| c.dtype).collect(),
        }
    }

    /// Dense `f64` matrix of an all-numeric frame, nulls as NaN.
    #[cfg(feature = "ndarray")]
    pub fn to_array2(&self) -> Result<ndarray::Array2<f64>> {
        let (rows, cols) = self.shape();
        let mut out = ndarray::Array2::<f64>::from_elem((rows, cols), f64::NAN);
        for (j, column) in self.columns.iter().enumerate() {
            if column.dtype == DType::Object {
                return Err(IngestError::NonNumericColumn(column.name.clone()));
            }
            for (i, cell) in column.values.iter().enumerate() {
                out[[i, j]] = cell.as_f64().unwrap_or(f64::NAN);
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.n_rows();
        if rows == 0 {
            return write!(
                f,
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.column_names().join(", ")
            );
        }

        let index_width = (rows - 1).to_string().len();
        let rendered: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|c| c.values.iter().map(Cell::to_string).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&rendered)
            .map(|(c, cells)| {
                cells
                    .iter()
                    .map(|s| s.chars().count())
                    .chain(std::iter::once(c.name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:>index_width$}", "")?;
        for (column, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", column.name)?;
        }
        for row in 0..rows {
            write!(f, "\n{row:>index_width$}")?;
            for (cells, width) in rendered.iter().zip(&widths) {
                write!(f, "  {:>width$}", cells[row])?;
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
