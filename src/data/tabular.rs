//! Delimited-table reading and writing.
//!
//! Two dialects are understood on input, picked from the header line:
//!
//! | Dialect   | Field separator | Decimal separator | Produced by            |
//! |-----------|-----------------|-------------------|------------------------|
//! | Semicolon | `;`             | `,`               | source spreadsheets    |
//! | Comma     | `,`             | `.`               | [`write_tabular`]      |
//!
//! Output is always the comma dialect with a header row, so anything this
//! module writes can be loaded back unchanged.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{StringRecord, Trim};
use serde::Serialize;

use crate::error::{Error, Result, Stage};
use crate::types::{LaneRecord, QuoteRecord};

const ORIGIN_COLUMN: &str = "id_city_origin";
const DESTINATION_COLUMN: &str = "id_city_destination";
const DISTANCE_COLUMN: &str = "distance";
const FREIGHT_COST_COLUMN: &str = "freight_cost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Semicolon,
    Comma,
}

impl Dialect {
    fn sniff(header_line: &str) -> Self {
        if header_line.contains(';') {
            Dialect::Semicolon
        } else {
            Dialect::Comma
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            Dialect::Semicolon => b';',
            Dialect::Comma => b',',
        }
    }

    fn parse_float(self, raw: &str) -> Option<f64> {
        match self {
            Dialect::Semicolon => raw.replace(',', ".").parse().ok(),
            Dialect::Comma => raw.parse().ok(),
        }
    }
}

/// Column positions resolved from the header.
#[derive(Debug)]
struct Columns {
    origin: usize,
    destination: usize,
    distance: Option<usize>,
    freight_cost: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> std::result::Result<Self, String> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
        };
        let required = |name: &str| {
            position(name).ok_or_else(|| format!("missing required column '{}'", name))
        };

        Ok(Self {
            origin: required(ORIGIN_COLUMN)?,
            destination: required(DESTINATION_COLUMN)?,
            distance: position(DISTANCE_COLUMN),
            freight_cost: position(FREIGHT_COST_COLUMN),
        })
    }

    fn parse(&self, row: &StringRecord, dialect: Dialect) -> std::result::Result<LaneRecord, String> {
        Ok(LaneRecord {
            origin_id: parse_id(cell(row, self.origin)?, ORIGIN_COLUMN, dialect)?,
            destination_id: parse_id(cell(row, self.destination)?, DESTINATION_COLUMN, dialect)?,
            distance: self
                .distance
                .map(|i| parse_optional_float(cell(row, i)?, DISTANCE_COLUMN, dialect))
                .transpose()?
                .flatten(),
            freight_cost: self
                .freight_cost
                .map(|i| parse_optional_float(cell(row, i)?, FREIGHT_COST_COLUMN, dialect))
                .transpose()?
                .flatten(),
        })
    }
}

fn cell(row: &StringRecord, index: usize) -> std::result::Result<&str, String> {
    row.get(index)
        .ok_or_else(|| format!("row has {} fields, expected at least {}", row.len(), index + 1))
}

/// Integer id; integral floats such as `1501303.0` (or `1501303,0` in the
/// semicolon dialect) are accepted.
fn parse_id(raw: &str, column: &str, dialect: Dialect) -> std::result::Result<i64, String> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    match dialect.parse_float(raw) {
        Some(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        _ => Err(format!("column '{}': '{}' is not an integer id", column, raw)),
    }
}

/// Empty cells and NaN are "missing", never zero.
fn parse_optional_float(
    raw: &str,
    column: &str,
    dialect: Dialect,
) -> std::result::Result<Option<f64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    match dialect.parse_float(raw) {
        Some(value) if value.is_nan() => Ok(None),
        Some(value) => Ok(Some(value)),
        None => Err(format!("column '{}': '{}' is not a number", column, raw)),
    }
}

fn malformed(path: &Path, line: u64, reason: impl Into<String>) -> Error {
    Error::MalformedInput {
        stage: Stage::Load,
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn io_error(stage: Stage, path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        stage,
        path: path.to_path_buf(),
        source,
    }
}

/// Load a lane table.
///
/// `id_city_origin` and `id_city_destination` are required and coerced to
/// integers; `distance` and `freight_cost` are optional columns coerced to
/// floats. An empty file yields an empty table.
pub fn load_tabular(path: impl AsRef<Path>) -> Result<Vec<LaneRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(io_error(Stage::Load, path))?;

    let Some(header_line) = content.lines().find(|l| !l.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    let dialect = Dialect::sniff(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter())
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| malformed(path, 1, e.to_string()))?
        .clone();
    let columns = Columns::locate(&headers).map_err(|reason| malformed(path, 1, reason))?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            malformed(path, line, e.to_string())
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let record = columns
            .parse(&row, dialect)
            .map_err(|reason| malformed(path, line, reason))?;
        records.push(record);
    }

    tracing::debug!(
        stage = Stage::Load.as_str(),
        path = %path.display(),
        rows = records.len(),
        dialect = ?dialect,
        "loaded table"
    );
    Ok(records)
}

/// A record type with a fixed column layout.
///
/// `HEADER` must list the serialized field names in declaration order.
pub trait TableRow: Serialize {
    const HEADER: &'static [&'static str];
}

impl TableRow for LaneRecord {
    const HEADER: &'static [&'static str] = &[
        ORIGIN_COLUMN,
        DESTINATION_COLUMN,
        DISTANCE_COLUMN,
        FREIGHT_COST_COLUMN,
    ];
}

impl TableRow for QuoteRecord {
    const HEADER: &'static [&'static str] =
        &[ORIGIN_COLUMN, DESTINATION_COLUMN, FREIGHT_COST_COLUMN];
}

/// Write rows as a comma-separated table with a header row.
///
/// The parent directory must already exist. The header is written even
/// when `rows` is empty.
pub fn write_tabular<T: TableRow>(rows: &[T], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(io_error(Stage::Write, path))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    writer
        .write_record(T::HEADER)
        .map_err(|e| csv_write_error(path.to_path_buf(), e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| csv_write_error(path.to_path_buf(), e))?;
    }
    writer.flush().map_err(io_error(Stage::Write, path))?;

    tracing::debug!(stage = Stage::Write.as_str(), path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

fn csv_write_error(path: PathBuf, err: csv::Error) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::Io {
            stage: Stage::Write,
            path,
            source,
        },
        other => Error::Io {
            stage: Stage::Write,
            path,
            source: std::io::Error::other(format!("{:?}", other)),
        },
    }
}
