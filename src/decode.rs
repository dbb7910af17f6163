//! Record decoding: raw spreadsheet cells → typed exhibit fields.
//!
//! All "messy input" handling lives here, free of any I/O, so the coercion
//! rules can be tested cell by cell. The workbook reader converts calamine
//! values into [`Cell`]s and hands whole rows to [`decode_row`].
//!
//! ## Coercion rules
//!
//! | Target | Empty cell | Failure |
//! |--------|-----------|---------|
//! | string ([`decode_string`]) | `""` | never fails |
//! | identifier ([`decode_integer`]) | error | [`DecodeError::InvalidIdentifier`], aborts the load |
//! | date ([`decode_date`]) | `None` | degrades to `None`, never an error |
//!
//! ## Date resolution
//!
//! Dates arrive in every shape people type into a spreadsheet. Resolution is
//! an ordered chain; the first step that yields a date wins:
//!
//! ```text
//! 1. empty / blank text          → None
//! 2. number or all-digit text    → serial date relative to the workbook epoch
//! 3. text                        → strip "год" / "г." / "г" / "Г." suffix,
//!                                  then DATE_FORMATS in order
//! 4. date-time cell              → its date portion
//! 5. nothing matched             → None
//! ```

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use thiserror::Error;

use crate::exhibit::Exhibit;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid exhibit identifier: {value:?}")]
    InvalidIdentifier { value: String },
}

/// A single spreadsheet cell value, independent of the parsing library.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Textual form of the cell, before trimming.
    ///
    /// Whole floats print without a fractional part so that an identifier
    /// stored as `12.0` reads back as `"12"`.
    fn stringify(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.to_string(),
        }
    }
}

/// Which day a workbook counts its serial dates from.
///
/// Spreadsheets created on old Macs count from 1904; everything else counts
/// from 1900, including the historical phantom 29 February 1900.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateEpoch {
    #[default]
    Excel1900,
    Excel1904,
}

impl DateEpoch {
    fn base(self) -> Option<NaiveDate> {
        match self {
            DateEpoch::Excel1900 => NaiveDate::from_ymd_opt(1899, 12, 30),
            DateEpoch::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1),
        }
    }
}

/// Trimmed string form of a cell; empty cells become `""`.
pub fn decode_string(cell: &Cell) -> String {
    cell.stringify().trim().to_string()
}

/// Parse an identifier cell as an integer.
pub fn decode_integer(cell: &Cell) -> Result<i64, DecodeError> {
    let text = decode_string(cell);
    text.parse::<i64>()
        .map_err(|_| DecodeError::InvalidIdentifier { value: text })
}

/// Best-effort date from a cell. Never fails; unknown shapes give `None`.
pub fn decode_date(cell: &Cell, epoch: DateEpoch) -> Option<NaiveDate> {
    if decode_string(cell).is_empty() {
        return None;
    }
    DATE_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(cell, epoch))
}

type DateStrategy = fn(&Cell, DateEpoch) -> Option<NaiveDate>;

/// Resolution order for [`decode_date`]. See the module docs.
const DATE_STRATEGIES: &[DateStrategy] = &[date_from_serial, date_from_text, date_from_datetime];

fn date_from_serial(cell: &Cell, epoch: DateEpoch) -> Option<NaiveDate> {
    let serial = match cell {
        Cell::Int(i) => *i as f64,
        Cell::Float(f) => *f,
        Cell::Text(s) if is_all_digits(s.trim()) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    serial_to_date(serial, epoch)
}

fn date_from_text(cell: &Cell, _epoch: DateEpoch) -> Option<NaiveDate> {
    let Cell::Text(raw) = cell else {
        return None;
    };
    let cleaned = strip_year_suffix(raw);
    DATE_FORMATS.iter().find_map(|format| format.parse(cleaned))
}

fn date_from_datetime(cell: &Cell, _epoch: DateEpoch) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        _ => None,
    }
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Convert a spreadsheet serial number to a calendar date.
///
/// Values in `[0, 1)` are pure times of day and carry no date. In the 1900
/// system serials below 60 are shifted by one day to skip the phantom leap day.
/// A fractional part that rounds to a full day rolls over to the next date.
pub fn serial_to_date(serial: f64, epoch: DateEpoch) -> Option<NaiveDate> {
    if !serial.is_finite() || (0.0..1.0).contains(&serial) {
        return None;
    }
    let whole = serial.floor();
    if whole.abs() > 3_000_000.0 {
        return None;
    }
    let mut days = whole as i64;
    if ((serial - whole) * MILLIS_PER_DAY).round() >= MILLIS_PER_DAY {
        days += 1;
    }
    if epoch == DateEpoch::Excel1900 && serial > 0.0 && serial < 60.0 {
        days += 1;
    }
    epoch.base()?.checked_add_signed(TimeDelta::try_days(days)?)
}

/// Year markers people append to dates, longest first.
const YEAR_SUFFIXES: &[&str] = &["год", "г.", "Г.", "г"];

fn strip_year_suffix(raw: &str) -> &str {
    let trimmed = raw.trim();
    YEAR_SUFFIXES
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
        .unwrap_or(trimmed)
        .trim()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrder {
    YearMonthDay,
    DayMonthYear,
}

/// One accepted textual date layout.
///
/// Day and month take one or two digits. The year must have exactly
/// `year_digits` digits; two-digit years pivot at 69 (`00..=68` → 2000s,
/// `69..=99` → 1900s).
#[derive(Debug, Clone, Copy)]
pub struct DateFormat {
    pub label: &'static str,
    separator: char,
    order: FieldOrder,
    year_digits: usize,
}

/// Accepted textual layouts, tried in order; the first match wins.
pub const DATE_FORMATS: &[DateFormat] = &[
    DateFormat {
        label: "YYYY-MM-DD",
        separator: '-',
        order: FieldOrder::YearMonthDay,
        year_digits: 4,
    },
    DateFormat {
        label: "DD.MM.YYYY",
        separator: '.',
        order: FieldOrder::DayMonthYear,
        year_digits: 4,
    },
    DateFormat {
        label: "DD/MM/YYYY",
        separator: '/',
        order: FieldOrder::DayMonthYear,
        year_digits: 4,
    },
    DateFormat {
        label: "DD.MM.YY",
        separator: '.',
        order: FieldOrder::DayMonthYear,
        year_digits: 2,
    },
    DateFormat {
        label: "YYYY/MM/DD",
        separator: '/',
        order: FieldOrder::YearMonthDay,
        year_digits: 4,
    },
];

impl DateFormat {
    /// Parse `text` in this layout, or `None` if it does not fit exactly.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = text.split(self.separator).collect();
        let [a, b, c] = parts.as_slice() else {
            return None;
        };
        let (year, month, day) = match self.order {
            FieldOrder::YearMonthDay => (*a, *b, *c),
            FieldOrder::DayMonthYear => (*c, *b, *a),
        };
        if year.len() != self.year_digits || !is_all_digits(year) {
            return None;
        }
        if !is_day_or_month(month) || !is_day_or_month(day) {
            return None;
        }
        let mut year: i32 = year.parse().ok()?;
        if self.year_digits == 2 {
            year += if year < 69 { 2000 } else { 1900 };
        }
        NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
    }
}

fn is_day_or_month(s: &str) -> bool {
    (1..=2).contains(&s.len()) && is_all_digits(s)
}

/// Positions of the required columns within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub exhibit_id: usize,
    pub name: usize,
    pub museum: usize,
    pub description: usize,
    pub period: usize,
    pub category: usize,
    pub received_date: usize,
    pub photo_file: usize,
    pub voronezh_story: usize,
}

/// Outcome of decoding a single data row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Exhibit(Exhibit),
    /// Row without an identifier: a blank or trailing row, not an error.
    Skipped,
}

/// Decode one data row into an exhibit.
///
/// Cells past the end of `row` are treated as empty.
pub fn decode_row(
    row: &[Cell],
    columns: &ColumnIndex,
    epoch: DateEpoch,
) -> Result<RowOutcome, DecodeError> {
    let cell = |idx: usize| row.get(idx).unwrap_or(&Cell::Empty);

    let raw_id = cell(columns.exhibit_id);
    if decode_string(raw_id).is_empty() {
        return Ok(RowOutcome::Skipped);
    }

    Ok(RowOutcome::Exhibit(Exhibit {
        exhibit_id: decode_integer(raw_id)?,
        name: decode_string(cell(columns.name)),
        museum: decode_string(cell(columns.museum)),
        description: decode_string(cell(columns.description)),
        period: decode_string(cell(columns.period)),
        category: decode_string(cell(columns.category)),
        received_date: decode_date(cell(columns.received_date), epoch),
        photo_file: decode_string(cell(columns.photo_file)),
        voronezh_story: decode_string(cell(columns.voronezh_story)),
    }))
}
