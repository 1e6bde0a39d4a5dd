//! User-supplied offering filters.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::offerings::CourseOffering;

/// Raw filter fields as entered in the form. Empty means "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInput {
    /// Week expression: comma-separated integers and inclusive `a-b` ranges.
    pub weeks: String,

    /// Price ceiling as entered by the user.
    pub max_price: String,

    /// Location substring, matched case-insensitively.
    pub location: String,
}

impl FilterInput {
    /// Returns true when no filter field carries a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weeks.trim().is_empty()
            && self.max_price.trim().is_empty()
            && self.location.trim().is_empty()
    }
}

/// Errors raised while parsing a week expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParseError {
    /// A token was neither an integer nor an `a-b` integer range.
    #[error("invalid week token {0:?}")]
    InvalidWeekToken(String),
}

/// Non-fatal degradations encountered while compiling a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterWarning {
    /// The max-price input was not numeric; the price filter was skipped.
    InvalidMaxPrice(String),
}

/// A set of calendar weeks parsed from a week expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSelection {
    weeks: BTreeSet<u32>,
}

impl WeekSelection {
    /// Parse a comma-separated expression of weeks and inclusive ranges,
    /// e.g. `"31,32-34"`.
    ///
    /// An inverted range (`"5-3"`) produces an empty contribution.
    ///
    /// # Errors
    ///
    /// Returns [`FilterParseError::InvalidWeekToken`] for any token that is
    /// not an integer or an integer range.
    pub fn parse(expression: &str) -> Result<Self, FilterParseError> {
        let mut weeks = BTreeSet::new();

        for token in expression.split(',') {
            match token.split_once('-') {
                Some((lo, hi)) => {
                    let lo = parse_week(lo)?;
                    let hi = parse_week(hi)?;

                    weeks.extend(lo..=hi);
                }
                None => {
                    weeks.insert(parse_week(token)?);
                }
            }
        }

        Ok(Self { weeks })
    }

    /// Returns true when the selection contains the given week.
    #[must_use]
    pub fn contains(&self, week: u32) -> bool {
        self.weeks.contains(&week)
    }

    /// Returns true when no week matched the expression.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// The matched weeks in ascending order.
    #[must_use]
    pub fn weeks(&self) -> &BTreeSet<u32> {
        &self.weeks
    }
}

fn parse_week(token: &str) -> Result<u32, FilterParseError> {
    let token = token.trim();

    token
        .parse()
        .map_err(|_| FilterParseError::InvalidWeekToken(token.to_string()))
}

/// Compiled filter, applied conjunctively to each offering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferingFilter {
    weeks: Option<WeekSelection>,
    max_price: Option<Decimal>,
    location: Option<String>,
}

impl OfferingFilter {
    /// Compile raw input into an applicable filter.
    ///
    /// A non-numeric max price does not fail compilation; it is dropped with
    /// a [`FilterWarning::InvalidMaxPrice`] and a warning log.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterParseError`] for a malformed week expression.
    pub fn compile(input: &FilterInput) -> Result<(Self, Vec<FilterWarning>), FilterParseError> {
        let mut warnings = Vec::new();

        let weeks = match input.weeks.trim() {
            "" => None,
            expression => Some(WeekSelection::parse(expression)?),
        };

        let max_price = match input.max_price.trim() {
            "" => None,
            raw => match raw.parse::<Decimal>() {
                Ok(price) => Some(price),
                Err(_) => {
                    tracing::warn!(input = raw, "max price is not numeric; skipping price filter");
                    warnings.push(FilterWarning::InvalidMaxPrice(raw.to_string()));

                    None
                }
            },
        };

        let location = match input.location.trim() {
            "" => None,
            raw => Some(raw.to_lowercase()),
        };

        Ok((
            Self {
                weeks,
                max_price,
                location,
            },
            warnings,
        ))
    }

    /// Returns true when the offering passes every active filter field.
    #[must_use]
    pub fn matches(&self, offering: &CourseOffering) -> bool {
        if let Some(weeks) = &self.weeks {
            if !weeks.contains(offering.week) {
                return false;
            }
        }

        if let Some(max_price) = self.max_price {
            if offering.price > max_price {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !offering.location.to_lowercase().contains(location) {
                return false;
            }
        }

        true
    }
}
