//! Booking configuration supplied by the embedding application.

/// Remote locations the booking workflow operates on.
///
/// All fields are opaque to this crate; the embedding application is
/// responsible for sourcing them (environment, secrets store, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfig {
    /// Hostname of the tenant, e.g. `"contoso.sharepoint.com"`.
    pub domain: String,

    /// Name of the site holding the course data.
    pub site_name: String,

    /// Mailbox used as the sender of confirmation mail.
    pub sender: String,

    /// Logical name of the list receiving booking records.
    pub list_name: String,

    /// File name of the course workbook under the site's drive root.
    pub workbook_file: String,
}

impl BookingConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        site_name: impl Into<String>,
        sender: impl Into<String>,
        list_name: impl Into<String>,
        workbook_file: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            site_name: site_name.into(),
            sender: sender.into(),
            list_name: list_name.into(),
            workbook_file: workbook_file.into(),
        }
    }
}
