//! Course offerings parsed from the remote workbook.

pub mod filter;

use std::io::Cursor;

use calamine::{Data, DataType as _, Reader as _, Xlsx, XlsxError};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive as _;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::offerings::filter::{FilterInput, FilterParseError, FilterWarning, OfferingFilter};

/// Workbook header labels, matched case-insensitively.
const WEEK_COLUMN: &str = "Week";
const FACILITY_COLUMN: &str = "Facility";
const LOCATION_COLUMN: &str = "Location";
const INSTRUCTOR_COLUMN: &str = "Instructor";
const PRICE_COLUMN: &str = "Price";

static EMPTY_CELL: Data = Data::Empty;

/// One schedulable course instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseOffering {
    /// Calendar week the course runs in.
    pub week: u32,

    /// Facility hosting the course.
    pub facility: String,

    /// Town or area of the facility.
    pub location: String,

    /// Name of the instructor.
    pub instructor: String,

    /// Price of the course.
    pub price: Decimal,
}

impl CourseOffering {
    /// Key the working set is deduplicated on.
    fn dedup_key(&self) -> (Decimal, String, String) {
        (
            self.price.normalize(),
            self.facility.clone(),
            self.instructor.clone(),
        )
    }
}

/// Errors raised while turning workbook bytes into offerings.
///
/// Parsing is all-or-nothing: a single malformed row fails the load.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The bytes were not a readable workbook.
    #[error("workbook could not be read: {0}")]
    Workbook(#[from] XlsxError),

    /// The workbook contains no worksheets.
    #[error("workbook has no worksheets")]
    NoWorksheet,

    /// The first worksheet has no header row.
    #[error("worksheet has no header row")]
    NoHeader,

    /// A required column label is missing from the header row.
    #[error("missing column {0:?} in header row")]
    MissingColumn(&'static str),

    /// A cell could not be converted to the expected offering field.
    #[error("row {row}: invalid value in column {column:?}")]
    InvalidCell {
        /// 1-based worksheet row number.
        row: usize,
        /// Header label of the offending column.
        column: &'static str,
    },
}

/// Errors raised by [`load_and_filter`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The workbook could not be parsed into offerings.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The week filter expression was malformed.
    #[error(transparent)]
    Filter(#[from] FilterParseError),
}

/// Result of one load-and-filter pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredOfferings {
    /// Offerings that passed every active filter, in source row order.
    pub offerings: Vec<CourseOffering>,

    /// Non-fatal degradations encountered while compiling the filter.
    pub warnings: Vec<FilterWarning>,
}

/// Parse workbook bytes into offerings, deduplicate, and filter.
///
/// When no filter field is set the result is empty: the interactive form
/// never shows the unbounded, unfiltered sheet.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] when the workbook is unreadable or a row is
/// malformed, and [`LoadError::Filter`] for a malformed week expression.
/// A non-numeric max price is not an error; it is reported as a warning and
/// the price filter is skipped.
pub fn load_and_filter(
    bytes: &[u8],
    input: &FilterInput,
) -> Result<FilteredOfferings, LoadError> {
    let rows = dedup_offerings(parse_workbook(bytes)?);

    if input.is_empty() {
        tracing::debug!("no filter fields set; returning empty working set");

        return Ok(FilteredOfferings {
            offerings: Vec::new(),
            warnings: Vec::new(),
        });
    }

    let (filter, warnings) = OfferingFilter::compile(input)?;

    let offerings: Vec<CourseOffering> = rows
        .into_iter()
        .filter(|offering| filter.matches(offering))
        .collect();

    tracing::debug!(matched = offerings.len(), "filter applied");

    Ok(FilteredOfferings {
        offerings,
        warnings,
    })
}

/// Parse workbook bytes into offerings, preserving source row order.
///
/// The first worksheet is used. The header row maps column labels to
/// positions; labels are matched case-insensitively.
///
/// # Errors
///
/// Returns a [`ParseError`] when the workbook is unreadable, a required
/// column is missing, or any row fails to convert.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<CourseOffering>, ParseError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)??;

    let mut rows = range.rows();
    let header = rows.next().ok_or(ParseError::NoHeader)?;
    let columns = ColumnIndex::from_header(header)?;

    let mut offerings = Vec::new();

    for (idx, row) in rows.enumerate() {
        // Worksheet row numbers are 1-based and the header occupies row 1.
        offerings.push(offering_from_row(row, &columns, idx + 2)?);
    }

    Ok(offerings)
}

/// Collapse offerings sharing (price, facility, instructor), keeping the
/// first occurrence. Idempotent; order is otherwise preserved.
#[must_use]
pub fn dedup_offerings(rows: Vec<CourseOffering>) -> Vec<CourseOffering> {
    let mut seen = FxHashSet::default();

    rows.into_iter()
        .filter(|offering| seen.insert(offering.dedup_key()))
        .collect()
}

struct ColumnIndex {
    week: usize,
    facility: usize,
    location: usize,
    instructor: usize,
    price: usize,
}

impl ColumnIndex {
    fn from_header(header: &[Data]) -> Result<Self, ParseError> {
        Ok(Self {
            week: find_column(header, WEEK_COLUMN)?,
            facility: find_column(header, FACILITY_COLUMN)?,
            location: find_column(header, LOCATION_COLUMN)?,
            instructor: find_column(header, INSTRUCTOR_COLUMN)?,
            price: find_column(header, PRICE_COLUMN)?,
        })
    }
}

fn find_column(header: &[Data], label: &'static str) -> Result<usize, ParseError> {
    header
        .iter()
        .position(|cell| {
            cell.get_string()
                .is_some_and(|s| s.trim().eq_ignore_ascii_case(label))
        })
        .ok_or(ParseError::MissingColumn(label))
}

fn cell(row: &[Data], idx: usize) -> &Data {
    row.get(idx).unwrap_or(&EMPTY_CELL)
}

fn offering_from_row(
    row: &[Data],
    columns: &ColumnIndex,
    row_number: usize,
) -> Result<CourseOffering, ParseError> {
    let week = cell(row, columns.week)
        .as_i64()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or(ParseError::InvalidCell {
            row: row_number,
            column: WEEK_COLUMN,
        })?;

    let facility = string_cell(row, columns.facility, row_number, FACILITY_COLUMN)?;
    let location = string_cell(row, columns.location, row_number, LOCATION_COLUMN)?;
    let instructor = string_cell(row, columns.instructor, row_number, INSTRUCTOR_COLUMN)?;

    let price = cell(row, columns.price)
        .as_f64()
        .and_then(Decimal::from_f64)
        .ok_or(ParseError::InvalidCell {
            row: row_number,
            column: PRICE_COLUMN,
        })?;

    Ok(CourseOffering {
        week,
        facility,
        location,
        instructor,
        price,
    })
}

/// Coerce any non-empty cell to its string rendering.
fn string_cell(
    row: &[Data],
    idx: usize,
    row_number: usize,
    column: &'static str,
) -> Result<String, ParseError> {
    cell(row, idx)
        .as_string()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::InvalidCell {
            row: row_number,
            column,
        })
}

#[cfg(test)]
mod tests {
    use rust_xlsxwriter::Workbook;
    use testresult::TestResult;

    use super::*;

    fn offering(week: u32, facility: &str, instructor: &str, price: i64) -> CourseOffering {
        CourseOffering {
            week,
            facility: facility.to_string(),
            location: "Townsville".to_string(),
            instructor: instructor.to_string(),
            price: Decimal::from(price),
        }
    }

    fn workbook_bytes(rows: &[(f64, &str, &str, &str, f64)]) -> TestResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        sheet.write(0, 0, "Week")?;
        sheet.write(0, 1, "Facility")?;
        sheet.write(0, 2, "Location")?;
        sheet.write(0, 3, "Instructor")?;
        sheet.write(0, 4, "Price")?;

        for (idx, (week, facility, location, instructor, price)) in rows.iter().enumerate() {
            let row = u32::try_from(idx)? + 1;

            sheet.write(row, 0, *week)?;
            sheet.write(row, 1, *facility)?;
            sheet.write(row, 2, *location)?;
            sheet.write(row, 3, *instructor)?;
            sheet.write(row, 4, *price)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    #[test]
    fn parse_workbook_maps_rows_to_offerings() -> TestResult {
        let bytes = workbook_bytes(&[
            (31.0, "Aqua Hall", "Umeå", "Ivar", 1000.0),
            (32.0, "Grand Pool", "Luleå", "Johanna", 2000.0),
        ])?;

        let offerings = parse_workbook(&bytes)?;

        assert_eq!(offerings.len(), 2);

        let first = offerings.first().ok_or("expected a first row")?;

        assert_eq!(first.week, 31);
        assert_eq!(first.facility, "Aqua Hall");
        assert_eq!(first.location, "Umeå");
        assert_eq!(first.instructor, "Ivar");
        assert_eq!(first.price, Decimal::from(1000));

        Ok(())
    }

    #[test]
    fn parse_workbook_accepts_case_insensitive_headers() -> TestResult {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        sheet.write(0, 0, "WEEK")?;
        sheet.write(0, 1, "facility")?;
        sheet.write(0, 2, "Location")?;
        sheet.write(0, 3, "instructor")?;
        sheet.write(0, 4, "PRICE")?;
        sheet.write(1, 0, 5.0)?;
        sheet.write(1, 1, "Hall")?;
        sheet.write(1, 2, "Town")?;
        sheet.write(1, 3, "Kim")?;
        sheet.write(1, 4, 100.0)?;

        let offerings = parse_workbook(&workbook.save_to_buffer()?)?;

        assert_eq!(offerings.len(), 1);

        Ok(())
    }

    #[test]
    fn parse_workbook_fails_on_missing_column() -> TestResult {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        sheet.write(0, 0, "Week")?;
        sheet.write(0, 1, "Facility")?;
        sheet.write(0, 2, "Location")?;
        sheet.write(0, 3, "Instructor")?;
        // Price column deliberately absent.

        let result = parse_workbook(&workbook.save_to_buffer()?);

        assert!(matches!(result, Err(ParseError::MissingColumn("Price"))));

        Ok(())
    }

    #[test]
    fn parse_workbook_fails_on_malformed_row() -> TestResult {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        sheet.write(0, 0, "Week")?;
        sheet.write(0, 1, "Facility")?;
        sheet.write(0, 2, "Location")?;
        sheet.write(0, 3, "Instructor")?;
        sheet.write(0, 4, "Price")?;
        sheet.write(1, 0, "not-a-week")?;
        sheet.write(1, 1, "Hall")?;
        sheet.write(1, 2, "Town")?;
        sheet.write(1, 3, "Kim")?;
        sheet.write(1, 4, 100.0)?;

        let result = parse_workbook(&workbook.save_to_buffer()?);

        assert!(matches!(
            result,
            Err(ParseError::InvalidCell { row: 2, column: "Week" })
        ));

        Ok(())
    }

    #[test]
    fn parse_workbook_coerces_numeric_location_to_string() -> TestResult {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        sheet.write(0, 0, "Week")?;
        sheet.write(0, 1, "Facility")?;
        sheet.write(0, 2, "Location")?;
        sheet.write(0, 3, "Instructor")?;
        sheet.write(0, 4, "Price")?;
        sheet.write(1, 0, 31.0)?;
        sheet.write(1, 1, "Hall")?;
        sheet.write(1, 2, 90210.0)?;
        sheet.write(1, 3, "Kim")?;
        sheet.write(1, 4, 100.0)?;

        let offerings = parse_workbook(&workbook.save_to_buffer()?)?;
        let first = offerings.first().ok_or("expected a row")?;

        assert!(first.location.contains("90210"));

        Ok(())
    }

    #[test]
    fn dedup_keeps_first_of_identical_price_facility_instructor() {
        let rows = vec![
            offering(31, "Hall", "Ivar", 1000),
            offering(32, "Hall", "Ivar", 1000), // same key, different week
            offering(33, "Hall", "Ivar", 1200),
        ];

        let deduped = dedup_offerings(rows);

        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped.first().map(|o| o.week), Some(31));
    }

    #[test]
    fn dedup_is_idempotent() {
        let rows = vec![
            offering(31, "Hall", "Ivar", 1000),
            offering(32, "Hall", "Ivar", 1000),
        ];

        let once = dedup_offerings(rows);
        let twice = dedup_offerings(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn load_and_filter_returns_empty_for_empty_filter() -> TestResult {
        let bytes = workbook_bytes(&[(31.0, "Hall", "Town", "Ivar", 1000.0)])?;

        let result = load_and_filter(&bytes, &FilterInput::default())?;

        assert!(result.offerings.is_empty());
        assert!(result.warnings.is_empty());

        Ok(())
    }

    #[test]
    fn load_and_filter_applies_max_price() -> TestResult {
        let bytes = workbook_bytes(&[
            (31.0, "A", "X", "I", 1000.0),
            (32.0, "B", "Y", "J", 2000.0),
        ])?;

        let input = FilterInput {
            max_price: "1500".to_string(),
            ..FilterInput::default()
        };

        let result = load_and_filter(&bytes, &input)?;

        assert_eq!(result.offerings.len(), 1);
        assert_eq!(result.offerings.first().map(|o| o.week), Some(31));

        Ok(())
    }

    #[test]
    fn load_and_filter_skips_price_filter_on_non_numeric_input() -> TestResult {
        let bytes = workbook_bytes(&[
            (31.0, "A", "X", "I", 1000.0),
            (32.0, "B", "Y", "J", 2000.0),
        ])?;

        let input = FilterInput {
            max_price: "cheap".to_string(),
            ..FilterInput::default()
        };

        let result = load_and_filter(&bytes, &input)?;

        assert_eq!(result.offerings.len(), 2);
        assert_eq!(
            result.warnings,
            vec![FilterWarning::InvalidMaxPrice("cheap".to_string())]
        );

        Ok(())
    }

    #[test]
    fn load_and_filter_rejects_malformed_week_expression() -> TestResult {
        let bytes = workbook_bytes(&[(31.0, "A", "X", "I", 1000.0)])?;

        let input = FilterInput {
            weeks: "31,next".to_string(),
            ..FilterInput::default()
        };

        let result = load_and_filter(&bytes, &input);

        assert!(matches!(result, Err(LoadError::Filter(_))));

        Ok(())
    }
}
