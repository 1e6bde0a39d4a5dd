//! Booking record submission.

use jiff::{Zoned, civil::Date};
use rust_decimal::prelude::ToPrimitive as _;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{
    contact::ContactInfo,
    graph::{BearerToken, GraphApi, RequestError, SiteId},
    offerings::CourseOffering,
    reference::BookingReference,
    selection::Selection,
};

/// Failure while writing the selection's records to the remote list.
///
/// Submission stops at the first rejected write; records written before the
/// failure point remain persisted remotely. `written` lets callers tell a
/// partial write apart from nothing written at all.
#[derive(Debug, Error)]
#[error("booking record {index} of {total} was not written; {written} records persisted")]
pub struct SubmissionError {
    /// Records confirmed written before the failure.
    pub written: usize,

    /// Zero-based index of the record that failed.
    pub index: usize,

    /// Total records in the selection.
    pub total: usize,

    /// The underlying request failure.
    #[source]
    pub source: RequestError,
}

impl SubmissionError {
    /// Returns true when at least one record was persisted before the
    /// failure.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.written > 0
    }
}

/// Build the `fields` payload for one booking record.
///
/// The mapping is fixed by the remote list schema: `IDnr` carries the
/// booking reference, `field_1..field_9` carry contact, date, and offering
/// values, with week as an integer and price as a float.
#[must_use]
pub fn record_fields(
    reference: &BookingReference,
    contact: &ContactInfo,
    offering: &CourseOffering,
    date: Date,
) -> Value {
    json!({
        "IDnr": reference.as_str(),
        "field_1": contact.name,
        "field_2": contact.phone,
        "field_3": contact.email,
        "field_4": date.to_string(),
        "field_5": offering.week,
        "field_6": offering.facility,
        "field_7": offering.location,
        "field_8": offering.instructor,
        "field_9": offering.price.to_f64().unwrap_or_default(),
    })
}

/// Write one record per selected offering, in selection order, dated today.
///
/// Intent is all-or-nothing but the write is not transactional: iteration
/// stops at the first failure and there is no compensating rollback.
///
/// # Errors
///
/// Returns a [`SubmissionError`] carrying the number of records persisted
/// before the failing write.
pub async fn submit<C: GraphApi + ?Sized>(
    api: &C,
    token: &BearerToken,
    site_id: &SiteId,
    list_name: &str,
    reference: &BookingReference,
    contact: &ContactInfo,
    selection: &Selection,
) -> Result<usize, SubmissionError> {
    let today = Zoned::now().date();
    let total = selection.len();

    for (index, offering) in selection.rows().iter().enumerate() {
        let fields = record_fields(reference, contact, offering, today);

        if let Err(source) = api.create_list_item(token, site_id, list_name, &fields).await {
            tracing::error!(index, written = index, total, "booking record write failed");

            return Err(SubmissionError {
                written: index,
                index,
                total,
                source,
            });
        }
    }

    tracing::info!(total, reference = %reference, "all booking records written");

    Ok(total)
}
