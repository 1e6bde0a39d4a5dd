//! Selected offerings for one booking session.

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::offerings::CourseOffering;

/// Ordered set of offerings the user chose during one session.
///
/// The interactive layer guarantees distinct rows, so no deduplication
/// happens here; this type only aggregates and projects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    rows: Vec<CourseOffering>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an offering in selection order.
    pub fn add(&mut self, offering: CourseOffering) {
        self.rows.push(offering);
    }

    /// The selected offerings in selection order.
    #[must_use]
    pub fn rows(&self) -> &[CourseOffering] {
        &self.rows
    }

    /// Number of selected offerings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when nothing has been selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the selection as a display table with columns
    /// week, facility, location, instructor, price.
    #[must_use]
    pub fn to_table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["Week", "Facility", "Location", "Instructor", "Price"]);

        for row in &self.rows {
            builder.push_record([
                row.week.to_string(),
                row.facility.clone(),
                row.location.clone(),
                row.instructor.clone(),
                row.price.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::one(4), Alignment::right());

        table.to_string()
    }
}
