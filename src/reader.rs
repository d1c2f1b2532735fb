//! Delimited text (CSV/TSV) to [`Frame`] and back.
//!
//! Column dtypes are inferred from the whole column: bool, then int64, then
//! float64, falling back to object. Missing values follow the usual NA tokens.

use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{IngestError, Result};
use crate::frame::{Cell, Column, DType, Frame};

/// Tokens read as a missing value.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
    Other(u8),
}

impl Delimiter {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b',' => Delimiter::Comma,
            b'\t' => Delimiter::Tab,
            other => Delimiter::Other(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
            Delimiter::Other(b) => b,
        }
    }

    /// Tab for `.tsv` files, comma for everything else.
    pub fn for_path(path: &Path) -> Self {
        match lowercase_extension(path).as_deref() {
            Some("tsv") => Delimiter::Tab,
            _ => Delimiter::Comma,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_byte() as char)
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// True for `*.csv` / `*.tsv`, case-insensitive.
pub fn is_delimited_file(path: &Path) -> bool {
    matches!(lowercase_extension(path).as_deref(), Some("csv" | "tsv"))
}

pub fn read_delimited(path: &Path, delimiter: Delimiter) -> Result<Frame> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IngestError::NotFound(path.to_path_buf()),
        _ => IngestError::io(path, e),
    })?;
    let frame = parse(BufReader::new(file), delimiter, path)?;
    debug!(path = %path.display(), shape = ?frame.shape(), %delimiter, "read delimited file");
    Ok(frame)
}

pub fn read_delimited_str(text: &str, delimiter: Delimiter) -> Result<Frame> {
    parse(text.as_bytes(), delimiter, Path::new("<memory>"))
}

fn parse<R: Read>(reader: R, delimiter: Delimiter, origin: &Path) -> Result<Frame> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = rdr.records();

    let header = match records.next() {
        Some(record) => record.map_err(|e| IngestError::csv(origin, e))?,
        None => return Err(IngestError::EmptyData(origin.to_path_buf())),
    };
    let names = header_names(&header);
    let width = names.len();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for (row, record) in records.enumerate() {
        let record = record.map_err(|e| IngestError::csv(origin, e))?;
        if record.len() > width {
            let line = record
                .position()
                .map_or(row as u64 + 2, |p| p.line());
            return Err(IngestError::Malformed {
                path: origin.to_path_buf(),
                line,
                expected: width,
                found: record.len(),
            });
        }
        for (i, column) in raw.iter_mut().enumerate() {
            column.push(record.get(i).map(str::to_owned));
        }
    }

    let columns = names
        .into_iter()
        .zip(raw)
        .map(|(name, values)| infer_column(name, values))
        .collect();
    Frame::new(columns)
}

/// Header names with a stripped BOM, placeholders for blanks and `.N`
/// suffixes on duplicates.
fn header_names(header: &csv::StringRecord) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(header.len());
    let mut suffixes: HashMap<String, usize> = HashMap::new();

    for (i, name) in header.iter().enumerate() {
        let name = if i == 0 {
            name.trim_start_matches('\u{feff}')
        } else {
            name
        };
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        if out.contains(&candidate) {
            let mut n = suffixes.get(&base).copied().unwrap_or(0);
            loop {
                n += 1;
                candidate = format!("{base}.{n}");
                if !out.contains(&candidate) {
                    break;
                }
            }
            suffixes.insert(base, n);
        }
        out.push(candidate);
    }
    out
}

fn is_na(value: &str) -> bool {
    NA_VALUES.contains(&value)
}

fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

fn infer_column(name: String, raw: Vec<Option<String>>) -> Column {
    let values: Vec<Option<String>> = raw
        .into_iter()
        .map(|v| v.filter(|s| !is_na(s)))
        .collect();
    if values.is_empty() {
        return Column::new(name, DType::Object, Vec::new());
    }

    let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    let complete = present.len() == values.len();

    let dtype = if complete && present.iter().all(|v| parse_bool(v).is_some()) {
        DType::Bool
    } else if complete && present.iter().all(|v| parse_int(v).is_some()) {
        DType::Int64
    } else if present.iter().all(|v| parse_float(v).is_some()) {
        DType::Float64
    } else {
        DType::Object
    };

    let cells = values
        .into_iter()
        .map(|v| match v {
            None => Cell::Null,
            Some(s) => convert(s, dtype),
        })
        .collect();
    Column::new(name, dtype, cells)
}

fn convert(value: String, dtype: DType) -> Cell {
    let parsed = match dtype {
        DType::Bool => parse_bool(&value).map(Cell::Bool),
        DType::Int64 => parse_int(&value).map(Cell::Int),
        DType::Float64 => parse_float(&value).map(Cell::Float),
        DType::Object => None,
    };
    parsed.unwrap_or(Cell::Str(value))
}

/// Write `frame` as comma-separated text with a header row and no index.
///
/// The file is written next to `path` and renamed into place.
pub fn write_csv(frame: &Frame, path: &Path) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|e| IngestError::io(dir, e))?;

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| IngestError::io(dir, e))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        writer
            .write_record(frame.column_names())
            .map_err(|e| IngestError::csv(path, e))?;
        for row in 0..frame.n_rows() {
            writer
                .write_record(frame.columns().iter().map(|c| c.values[row].csv_field()))
                .map_err(|e| IngestError::csv(path, e))?;
        }
        writer.flush().map_err(|e| IngestError::io(path, e))?;
    }
    tmp.persist(path)
        .map_err(|e| IngestError::io(path, e.error))?;

    debug!(path = %path.display(), shape = ?frame.shape(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn infers_int_float_and_object_columns() {
        let frame = read_delimited_str("a,b,c\n1,2.5,x\n3,4,y\n", Delimiter::Comma).unwrap();
        let dtypes: Vec<DType> = frame.columns().iter().map(|c| c.dtype).collect();
        assert_eq!(dtypes, vec![DType::Int64, DType::Float64, DType::Object]);
        assert_eq!(frame.value(0, "a"), Some(&Cell::Int(1)));
        assert_eq!(frame.value(1, "b"), Some(&Cell::Float(4.0)));
        assert_eq!(frame.value(1, "c"), Some(&Cell::Str("y".into())));
    }

    #[test]
    fn missing_values_turn_int_columns_into_floats() {
        let frame = read_delimited_str("lot,alley\n10,NA\n,Pave\n", Delimiter::Comma).unwrap();
        let lot = frame.column("lot").unwrap();
        assert_eq!(lot.dtype, DType::Float64);
        assert_eq!(lot.values, vec![Cell::Float(10.0), Cell::Null]);

        let alley = frame.column("alley").unwrap();
        assert_eq!(alley.dtype, DType::Object);
        assert_eq!(alley.null_count(), 1);
    }

    #[test]
    fn all_missing_column_is_float() {
        let frame = read_delimited_str("a,b\n1,\n2,NaN\n", Delimiter::Comma).unwrap();
        assert_eq!(frame.column("b").unwrap().dtype, DType::Float64);
    }

    #[test]
    fn bool_columns() {
        let frame = read_delimited_str("flag\nTrue\nfalse\n", Delimiter::Comma).unwrap();
        let flag = frame.column("flag").unwrap();
        assert_eq!(flag.dtype, DType::Bool);
        assert_eq!(flag.values, vec![Cell::Bool(true), Cell::Bool(false)]);
    }

    #[test]
    fn bool_columns_ignore_case() {
        let frame = read_delimited_str("flag\ntRuE\nFalse\nFALSE\n", Delimiter::Comma).unwrap();
        let flag = frame.column("flag").unwrap();
        assert_eq!(flag.dtype, DType::Bool);
        assert_eq!(
            flag.values,
            vec![Cell::Bool(true), Cell::Bool(false), Cell::Bool(false)]
        );
    }

    #[test]
    fn na_tokens_and_padded_numbers() {
        let cases = [
            ("#N/A", Cell::Null),
            ("#N/A N/A", Cell::Null),
            ("#NA", Cell::Null),
            ("-1.#IND", Cell::Null),
            ("-1.#QNAN", Cell::Null),
            ("-NaN", Cell::Null),
            ("-nan", Cell::Null),
            ("1.#IND", Cell::Null),
            ("1.#QNAN", Cell::Null),
            ("<NA>", Cell::Null),
            ("N/A", Cell::Null),
            ("NULL", Cell::Null),
            ("None", Cell::Null),
            ("n/a", Cell::Null),
            ("nan", Cell::Null),
            ("null", Cell::Null),
            (" 42 ", Cell::Float(42.0)),
            ("\t7.5", Cell::Float(7.5)),
        ];
        for (token, expected) in cases {
            // Quoted so tabs and spaces reach the parser untouched.
            let text = format!("v\n1.5\n\"{token}\"\n");
            let frame = read_delimited_str(&text, Delimiter::Comma).unwrap();
            let v = frame.column("v").unwrap();
            assert_eq!(v.dtype, DType::Float64, "token {token:?}");
            assert_eq!(v.values[1], expected, "token {token:?}");
        }

        let frame = read_delimited_str("n\n 1\n2 \n", Delimiter::Comma).unwrap();
        let n = frame.column("n").unwrap();
        assert_eq!(n.dtype, DType::Int64);
        assert_eq!(n.values, vec![Cell::Int(1), Cell::Int(2)]);
    }

    #[test]
    fn tab_delimited_text() {
        let frame = read_delimited_str("Order\tSalePrice\n1\t215000\n", Delimiter::Tab).unwrap();
        assert_eq!(frame.column_names(), vec!["Order", "SalePrice"]);
        assert_eq!(frame.value(0, "SalePrice"), Some(&Cell::Int(215000)));
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let frame = read_delimited_str("a,a,,a\n1,2,3,4\n", Delimiter::Comma).unwrap();
        assert_eq!(frame.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let frame = read_delimited_str("\u{feff}id,v\n1,2\n", Delimiter::Comma).unwrap();
        assert_eq!(frame.column_names(), vec!["id", "v"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let frame = read_delimited_str("a,b,c\n1,2\n", Delimiter::Comma).unwrap();
        assert_eq!(frame.value(0, "c"), Some(&Cell::Null));
    }

    #[test]
    fn long_rows_are_rejected() {
        let err = read_delimited_str("a,b\n1,2\n1,2,3\n", Delimiter::Comma).unwrap_err();
        match err {
            IngestError::Malformed {
                line,
                expected,
                found,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_has_no_columns() {
        assert!(matches!(
            read_delimited_str("", Delimiter::Comma),
            Err(IngestError::EmptyData(_))
        ));
    }

    #[test]
    fn header_only_gives_empty_object_columns() {
        let frame = read_delimited_str("a,b\n", Delimiter::Comma).unwrap();
        assert_eq!(frame.shape(), (0, 2));
        assert!(frame.columns().iter().all(|c| c.dtype == DType::Object));
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempdir().expect("tempdir");
        let err = read_delimited(&tmp.path().join("nope.csv"), Delimiter::Comma).unwrap_err();
        assert!(matches!(err, IngestError::NotFound(_)));
    }

    #[test]
    fn delimiter_for_path() {
        assert_eq!(Delimiter::for_path(Path::new("x/Ames.TSV")), Delimiter::Tab);
        assert_eq!(Delimiter::for_path(Path::new("x/Ames.csv")), Delimiter::Comma);
        assert_eq!(Delimiter::for_path(Path::new("noext")), Delimiter::Comma);
        assert_eq!(Delimiter::Tab.to_string(), "'\\t'");
    }

    #[test]
    fn write_csv_keeps_large_integral_floats_as_floats() {
        let tmp = tempdir().expect("tempdir");
        let frame = Frame::new(vec![Column::new(
            "price",
            DType::Float64,
            vec![Cell::Float(1e16), Cell::Float(2e17)],
        )])
        .unwrap();
        let out = tmp.path().join("big.csv");
        write_csv(&frame, &out).expect("write csv");

        let text = fs::read_to_string(&out).expect("read back");
        assert_eq!(text, "price\n10000000000000000.0\n200000000000000000.0\n");
        let back = read_delimited(&out, Delimiter::Comma).expect("reread");
        assert_eq!(back.column("price").unwrap().dtype, DType::Float64);
    }

    #[test]
    fn write_csv_renders_nulls_and_floats() {
        let tmp = tempdir().expect("tempdir");
        let frame = read_delimited_str("a\tb\tc\n1\t2.0\tx\n2\t\t\n", Delimiter::Tab).unwrap();
        let out = tmp.path().join("nested/out.csv");
        write_csv(&frame, &out).expect("write csv");

        let text = fs::read_to_string(&out).expect("read back");
        assert_eq!(text, "a,b,c\n1,2.0,x\n2,,\n");
    }
}
