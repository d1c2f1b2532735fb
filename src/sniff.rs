//! Delimiter detection and a raw look at the head of a delimited file.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::reader::Delimiter;

/// Tie-break order when several characters split the sample consistently.
const PREFERRED: &[u8] = b",\t; :";

const RAW_LINE_LIMIT: usize = 200;
const PARSED_ROW_LIMIT: usize = 6;
const PARSED_FIELD_LIMIT: usize = 6;

fn is_candidate(byte: u8) -> bool {
    (byte.is_ascii_punctuation() || byte == b' ' || byte == b'\t') && byte != b'"' && byte != b'\''
}

#[derive(Debug, Clone, Copy)]
struct Mode {
    byte: u8,
    count: usize,
    score: i64,
}

/// Guess the field delimiter of `sample` from how consistently each candidate
/// character repeats across its non-empty lines.
///
/// For each candidate the modal per-line count is taken; its score is the
/// number of lines at the mode minus the lines that disagree. Candidates must
/// reach a score ratio of 1.0, relaxed in steps of 0.01 down to 0.9.
pub fn sniff_delimiter(sample: &str) -> Result<u8> {
    let lines: Vec<&str> = sample.lines().filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return Err(IngestError::SniffFailed);
    }
    let total = lines.len();

    let modes: Vec<Mode> = (0u8..128)
        .filter(|b| is_candidate(*b))
        .map(|byte| {
            let mut freq: Vec<(usize, usize)> = Vec::new();
            for line in &lines {
                let n = line.bytes().filter(|b| *b == byte).count();
                match freq.iter_mut().find(|(count, _)| *count == n) {
                    Some((_, seen)) => *seen += 1,
                    None => freq.push((n, 1)),
                }
            }
            let (count, at_mode) = freq
                .iter()
                .copied()
                .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });
            Mode {
                byte,
                count,
                score: at_mode as i64 - (total - at_mode) as i64,
            }
        })
        .collect();

    let survivors: Vec<Mode> = (90..=100usize)
        .rev()
        .map(|percent| {
            modes
                .iter()
                .copied()
                .filter(|m| m.count > 0 && m.score > 0 && m.score as usize * 100 >= total * percent)
                .collect::<Vec<_>>()
        })
        .find(|kept| !kept.is_empty())
        .unwrap_or_default();
    debug!(survivors = survivors.len(), "delimiter candidates");

    match survivors.as_slice() {
        [] => Err(IngestError::SniffFailed),
        [only] => Ok(only.byte),
        many => {
            if let Some(byte) = PREFERRED
                .iter()
                .copied()
                .find(|p| many.iter().any(|m| m.byte == *p))
            {
                return Ok(byte);
            }
            many.iter()
                .max_by_key(|m| (m.count, m.score))
                .map(|m| m.byte)
                .ok_or(IngestError::SniffFailed)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub field_count: usize,
    pub fields: Vec<String>,
}

/// What [`inspect`] saw at the head of a file.
#[derive(Debug, Clone)]
pub struct DelimiterReport {
    pub path: PathBuf,
    pub size: u64,
    pub raw_lines: Vec<String>,
    /// `None` when sniffing failed.
    pub sniffed: Option<Delimiter>,
    /// Sniffed delimiter, or comma.
    pub delimiter: Delimiter,
    pub rows: Vec<ParsedRow>,
}

/// Read up to `max_lines` lines of `path`, sniff the delimiter and parse the
/// first rows with it.
pub fn inspect(path: &Path, max_lines: usize) -> Result<DelimiterReport> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IngestError::NotFound(path.to_path_buf()),
        _ => IngestError::io(path, e),
    })?;
    let size = file.metadata().map_err(|e| IngestError::io(path, e))?.len();

    let mut reader = BufReader::new(file);
    let mut lines = Vec::with_capacity(max_lines);
    let mut buf = Vec::new();
    while lines.len() < max_lines {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| IngestError::io(path, e))?;
        if read == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        lines.push(line.trim_end_matches(['\r', '\n']).to_string());
    }

    let raw_lines = lines
        .iter()
        .map(|l| l.trim().chars().take(RAW_LINE_LIMIT).collect())
        .collect();

    let sample = lines.join("\n");
    let sniffed = match sniff_delimiter(&sample) {
        Ok(byte) => Some(Delimiter::from_byte(byte)),
        Err(e) => {
            warn!(path = %path.display(), err = %e, "sniffer failed; falling back to comma");
            None
        }
    };
    let delimiter = sniffed.unwrap_or(Delimiter::Comma);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes());
    let mut rows = Vec::new();
    for record in rdr.records().take(PARSED_ROW_LIMIT) {
        let record = record.map_err(|e| IngestError::csv(path, e))?;
        rows.push(ParsedRow {
            field_count: record.len(),
            fields: record
                .iter()
                .take(PARSED_FIELD_LIMIT)
                .map(str::to_owned)
                .collect(),
        });
    }

    Ok(DelimiterReport {
        path: path.to_path_buf(),
        size,
        raw_lines,
        sniffed,
        delimiter,
        rows,
    })
}

impl fmt::Display for DelimiterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "file {} size {}", self.path.display(), self.size)?;
        writeln!(f, "--- RAW LINES ---")?;
        for (i, line) in self.raw_lines.iter().enumerate() {
            writeln!(f, "{} {}", i + 1, line)?;
        }
        match self.sniffed {
            Some(d) => writeln!(f, "detected delimiter: {d}")?,
            None => writeln!(f, "sniffer failed: {}", IngestError::SniffFailed)?,
        }
        write!(f, "Parsing with delimiter: {}", self.delimiter)?;
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "\nrow {} {} {:?}", i + 1, row.field_count, row.fields)?;
        }
        Ok(())
    }
}
