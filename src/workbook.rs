//! Workbook reader: spreadsheet file → exhibits.
//!
//! The workbook is the only data source. Every call to [`read_exhibits`]
//! opens the file, reads it top to bottom and closes it again; nothing is
//! cached between calls.
//!
//! ## Expected layout
//!
//! Row 1 of the active sheet holds the headers. The [`REQUIRED_COLUMNS`] must
//! all be present (exact match, any order, extra columns ignored). Data starts
//! at row 2:
//!
//! - a row with no values at all is skipped
//! - a row whose identifier cell is blank is skipped (trailing rows, notes)
//! - a row whose identifier is not an integer aborts the whole read
//!
//! ## Errors
//!
//! Everything that goes wrong here is an infrastructure problem for the
//! caller: [`WorkbookError`] always carries a human-readable message, and the
//! underlying cause stays reachable through `source()` for the logs.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

use crate::decode::{self, Cell, ColumnIndex, DateEpoch, DecodeError, RowOutcome};
use crate::exhibit::Exhibit;

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("В XLSX отсутствуют колонки: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Некорректный ID_Экспоната в строке {row}")]
    InvalidIdentifier {
        row: usize,
        #[source]
        source: DecodeError,
    },
    #[error("В XLSX нет ни одного листа")]
    NoWorksheet,
    #[error("Ошибка чтения XLSX")]
    Open(#[source] calamine::Error),
}

/// Header names that must appear in row 1, in [`ColumnIndex`] field order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "ID_Экспоната",
    "Название_экспоната",
    "Название_музея",
    "Описание",
    "Эпоха/Период",
    "Категория",
    "Дата_поступления",
    "Фото_файл",
    "История_связанная_с_Воронежем",
];

/// Read every exhibit from the workbook at `path`, in sheet row order.
pub fn read_exhibits(path: &Path) -> Result<Vec<Exhibit>, WorkbookError> {
    let result = load(path);
    match &result {
        Err(err @ (WorkbookError::Open(_) | WorkbookError::NoWorksheet)) => {
            tracing::error!(
                path = %path.display(),
                error = %err,
                cause = ?std::error::Error::source(err),
                "Failed to read workbook"
            );
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Workbook rejected");
        }
        Ok(exhibits) => {
            tracing::debug!(path = %path.display(), count = exhibits.len(), "Workbook read");
        }
    }
    result
}

fn load(path: &Path) -> Result<Vec<Exhibit>, WorkbookError> {
    // The handle is dropped (and the file closed) on every return path.
    let mut workbook = open_workbook_auto(path).map_err(WorkbookError::Open)?;
    let props = read_workbook_props(path);

    let sheet_count = workbook.sheet_names().len();
    if sheet_count == 0 {
        return Err(WorkbookError::NoWorksheet);
    }
    let sheet = if props.active_sheet < sheet_count {
        props.active_sheet
    } else {
        0
    };
    let range = workbook
        .worksheet_range_at(sheet)
        .ok_or(WorkbookError::NoWorksheet)?
        .map_err(WorkbookError::Open)?;

    exhibits_from_rows(sheet_rows(&range), props.epoch)
}

/// Assemble exhibits from raw rows; the first row is the header.
pub fn exhibits_from_rows<I>(mut rows: I, epoch: DateEpoch) -> Result<Vec<Exhibit>, WorkbookError>
where
    I: Iterator<Item = Vec<Cell>>,
{
    let headers: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .iter()
        .map(decode::decode_string)
        .collect();
    let columns = column_index(&headers)?;

    let mut exhibits = Vec::new();
    for (offset, row) in rows.enumerate() {
        if row.iter().all(|cell| matches!(cell, Cell::Empty)) {
            continue;
        }
        match decode::decode_row(&row, &columns, epoch) {
            Ok(RowOutcome::Exhibit(exhibit)) => exhibits.push(exhibit),
            Ok(RowOutcome::Skipped) => {}
            Err(source) => {
                return Err(WorkbookError::InvalidIdentifier {
                    row: offset + 2,
                    source,
                });
            }
        }
    }
    Ok(exhibits)
}

/// Map each required column to its position in `headers`.
///
/// Fails with every missing name, in [`REQUIRED_COLUMNS`] order.
pub fn column_index(headers: &[String]) -> Result<ColumnIndex, WorkbookError> {
    let mut positions = [0usize; REQUIRED_COLUMNS.len()];
    let mut missing = Vec::new();
    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        match headers.iter().position(|header| header == name) {
            Some(idx) => *slot = idx,
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(WorkbookError::MissingColumns(missing));
    }

    let [
        exhibit_id,
        name,
        museum,
        description,
        period,
        category,
        received_date,
        photo_file,
        voronezh_story,
    ] = positions;
    Ok(ColumnIndex {
        exhibit_id,
        name,
        museum,
        description,
        period,
        category,
        received_date,
        photo_file,
        voronezh_story,
    })
}

/// Rows of the sheet by absolute position, starting at row 1 / column A,
/// so the header is always the first physical row.
fn sheet_rows(range: &Range<Data>) -> impl Iterator<Item = Vec<Cell>> + '_ {
    let (height, width) = range.end().map_or((0, 0), |(row, col)| (row + 1, col + 1));
    (0..height).map(move |row| {
        (0..width)
            .map(|col| range.get_value((row, col)).map_or(Cell::Empty, Cell::from))
            .collect()
    })
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            // The raw serial keeps the workbook epoch and the time-only rule in one place.
            Data::DateTime(dt) => Cell::Float(dt.as_f64()),
            Data::DateTimeIso(s) => parse_iso_datetime(s).map_or(Cell::Text(s.clone()), Cell::DateTime),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(e.to_string()),
        }
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

// =============================================================================
// Workbook properties
// =============================================================================

/// Properties from `xl/workbook.xml` that calamine does not expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkbookProps {
    pub epoch: DateEpoch,
    pub active_sheet: usize,
}

/// Best effort: non-xlsx files and unreadable parts fall back to defaults
/// (1900 epoch, first sheet).
fn read_workbook_props(path: &Path) -> WorkbookProps {
    match workbook_xml(path) {
        Ok(xml) => parse_workbook_xml(&xml),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "No workbook.xml, using defaults");
            WorkbookProps::default()
        }
    }
}

fn workbook_xml(path: &Path) -> zip::result::ZipResult<String> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut xml = String::new();
    archive.by_name("xl/workbook.xml")?.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Read `workbookPr@date1904` and `workbookView@activeTab`, matching
/// elements by local name so prefixed (strict OOXML) markup is handled too.
/// Malformed XML keeps whatever was read before the error.
pub fn parse_workbook_xml(xml: &str) -> WorkbookProps {
    let mut props = WorkbookProps::default();
    let mut reader = XmlReader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element)) => {
                match element.local_name().as_ref() {
                    b"workbookPr" => {
                        if let Some("1" | "true") = attribute(&element, b"date1904").as_deref() {
                            props.epoch = DateEpoch::Excel1904;
                        }
                    }
                    b"workbookView" => {
                        if let Some(tab) =
                            attribute(&element, b"activeTab").and_then(|v| v.parse().ok())
                        {
                            props.active_sheet = tab;
                        }
                        // Only the first view counts.
                        break;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(error = %err, "Malformed workbook.xml, keeping defaults");
                break;
            }
        }
    }
    props
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == name)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}
