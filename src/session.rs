//! One interactive booking session.
//!
//! A [`Session`] owns everything a single synchronous workflow run needs:
//! credential, configuration, booking reference, token, site identifier,
//! and the selection. Nothing outlives the session except what the remote
//! service persists.

use std::fmt;

use thiserror::Error;

use crate::{
    booking::{self, SubmissionError},
    config::BookingConfig,
    contact::ContactInfo,
    graph::{
        AuthError, BearerToken, Credential, FetchError, GraphApi, ListColumn, RequestError,
        SiteId, SiteNotFoundError,
    },
    mail::{self, MailError},
    offerings::{
        self, CourseOffering, FilteredOfferings, LoadError, ParseError, filter::FilterInput,
        filter::FilterParseError,
    },
    reference::BookingReference,
    selection::Selection,
};

/// Where a session is in its workflow.
///
/// Failures move the session to `Failed`; there is no retry or backward
/// transition. Re-filtering is allowed until the first selection is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has happened yet.
    Idle,
    /// A bearer token is held.
    Authenticated,
    /// The site identifier is resolved.
    SiteResolved,
    /// The workbook has been downloaded.
    DataLoaded,
    /// A filter pass has produced a working set.
    Filtered,
    /// The user is choosing offerings.
    Selecting,
    /// Confirmation mail and record writes are in flight.
    Submitting,
    /// Mail accepted and all records written.
    Done,
    /// A step failed; the session is over.
    Failed,
}

/// Errors raised by session steps.
///
/// Each variant maps to a distinct user-facing message; mail and record
/// failures are never collapsed into one (see [`ConfirmationOutcome`]).
#[derive(Debug, Error)]
pub enum SessionError {
    /// A step was invoked out of workflow order.
    #[error("{operation} is not allowed while the session is {state:?}")]
    OutOfOrder {
        /// The step that was attempted.
        operation: &'static str,
        /// The state the session was in.
        state: SessionState,
    },

    /// Could not authenticate.
    #[error("could not authenticate")]
    Auth(#[from] AuthError),

    /// Could not resolve the booking site.
    #[error("could not resolve the booking site")]
    Site(#[from] SiteNotFoundError),

    /// Could not download the course data.
    #[error("could not load the course data")]
    Fetch(#[from] FetchError),

    /// The downloaded workbook was unreadable.
    #[error("could not read the course workbook")]
    Workbook(#[from] ParseError),

    /// The user's filter input was malformed.
    #[error("could not parse the filter input")]
    Filter(#[from] FilterParseError),

    /// The booking list schema could not be read.
    #[error("could not read the booking list schema")]
    Columns(#[from] RequestError),

    /// Contact details were blank at confirmation time.
    #[error("contact details must be complete")]
    IncompleteContact,

    /// Confirmation was attempted with nothing selected.
    #[error("nothing is selected to book")]
    EmptySelection,

    /// The confirmation mail could not be sent.
    #[error("the confirmation mail could not be sent")]
    Mail(#[from] MailError),
}

impl From<LoadError> for SessionError {
    fn from(error: LoadError) -> Self {
        match error {
            LoadError::Parse(parse) => Self::Workbook(parse),
            LoadError::Filter(filter) => Self::Filter(filter),
        }
    }
}

/// Outcome of a confirmed booking.
///
/// Mail is dispatched before records are written, so a record failure
/// always means the confirmation mail is already out; callers must surface
/// the two outcomes separately.
#[derive(Debug)]
pub enum ConfirmationOutcome {
    /// Mail accepted and every record written.
    Completed {
        /// Number of records written.
        records_written: usize,
    },

    /// The mail service did not accept the message; no records were written.
    MailRejected,

    /// Mail was accepted but record writing stopped at the first failure.
    RecordsFailed {
        /// The submission failure, including how many records persisted.
        error: SubmissionError,
    },
}

/// One booking workflow run against a [`GraphApi`] implementation.
pub struct Session<C> {
    api: C,
    config: BookingConfig,
    credential: Credential,
    reference: BookingReference,
    state: SessionState,
    token: Option<BearerToken>,
    site_id: Option<SiteId>,
    selection: Selection,
}

impl<C> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("reference", &self.reference)
            .field("selected", &self.selection.len())
            .finish_non_exhaustive()
    }
}

impl<C: GraphApi> Session<C> {
    /// Start a session with a freshly generated booking reference.
    #[must_use]
    pub fn new(api: C, config: BookingConfig, credential: Credential) -> Self {
        Self::with_reference(api, config, credential, BookingReference::generate())
    }

    /// Start a session with a caller-provided booking reference.
    #[must_use]
    pub fn with_reference(
        api: C,
        config: BookingConfig,
        credential: Credential,
        reference: BookingReference,
    ) -> Self {
        Self {
            api,
            config,
            credential,
            reference,
            state: SessionState::Idle,
            token: None,
            site_id: None,
            selection: Selection::new(),
        }
    }

    /// Current workflow state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The session's booking reference.
    #[must_use]
    pub fn reference(&self) -> &BookingReference {
        &self.reference
    }

    /// The offerings selected so far.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Exchange the credential for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Auth`] and fails the session when the
    /// exchange is rejected.
    pub async fn authenticate(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionState::Idle], "authenticate")?;

        match self.api.acquire_token(&self.credential).await {
            Ok(token) => {
                self.token = Some(token);
                self.state = SessionState::Authenticated;

                Ok(())
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// Resolve the configured (domain, site name) pair to a site identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Site`] and fails the session when the lookup
    /// does not succeed.
    pub async fn resolve_site(&mut self) -> Result<(), SessionError> {
        self.require(&[SessionState::Authenticated], "resolve_site")?;

        let token = self.token()?;

        match self
            .api
            .resolve_site(&token, &self.config.domain, &self.config.site_name)
            .await
        {
            Ok(site_id) => {
                tracing::info!(site_id = %site_id, "site resolved");

                self.site_id = Some(site_id);
                self.state = SessionState::SiteResolved;

                Ok(())
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// Download the course workbook and apply the user's filter.
    ///
    /// May be called again with a refined filter until the first selection
    /// is made.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Fetch`], [`SessionError::Workbook`], or
    /// [`SessionError::Filter`]; all fail the session.
    pub async fn load_offerings(
        &mut self,
        filter: &FilterInput,
    ) -> Result<FilteredOfferings, SessionError> {
        self.require(
            &[
                SessionState::SiteResolved,
                SessionState::DataLoaded,
                SessionState::Filtered,
            ],
            "load_offerings",
        )?;

        let token = self.token()?;
        let site_id = self.site_id()?;

        let bytes = match self
            .api
            .fetch_spreadsheet(&token, &site_id, &self.config.workbook_file)
            .await
        {
            Ok(bytes) => bytes,
            Err(error) => return Err(self.fail(error.into())),
        };

        self.state = SessionState::DataLoaded;

        match offerings::load_and_filter(&bytes, filter) {
            Ok(result) => {
                self.state = SessionState::Filtered;

                Ok(result)
            }
            Err(error) => Err(self.fail(error.into())),
        }
    }

    /// Read the column definitions of the booking list.
    ///
    /// Lets an embedder check the fixed record field mapping against the
    /// live list before submitting.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Columns`] on failure; the session is not
    /// failed by an introspection error.
    pub async fn list_columns(&self) -> Result<Vec<ListColumn>, SessionError> {
        self.require(
            &[
                SessionState::SiteResolved,
                SessionState::DataLoaded,
                SessionState::Filtered,
                SessionState::Selecting,
            ],
            "list_columns",
        )?;

        let token = self.token()?;
        let site_id = self.site_id()?;

        Ok(self
            .api
            .list_columns(&token, &site_id, &self.config.list_name)
            .await?)
    }

    /// Add an offering to the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::OutOfOrder`] before the first filter pass or
    /// after confirmation.
    pub fn select(&mut self, offering: CourseOffering) -> Result<(), SessionError> {
        self.require(
            &[SessionState::Filtered, SessionState::Selecting],
            "select",
        )?;

        self.selection.add(offering);
        self.state = SessionState::Selecting;

        Ok(())
    }

    /// Send the confirmation mail and write one record per selected
    /// offering.
    ///
    /// Mail goes first: a rejected mail ends the run with nothing written.
    /// A record failure after an accepted mail is reported as
    /// [`ConfirmationOutcome::RecordsFailed`] — the mail is already out and
    /// some records may be persisted.
    ///
    /// # Errors
    ///
    /// Blank contact details, an empty selection, and an empty recipient
    /// set are rejected up front without failing the session. Transport
    /// failures fail the session.
    pub async fn confirm(
        &mut self,
        contact: &ContactInfo,
        recipients: &[String],
        message: Option<&str>,
    ) -> Result<ConfirmationOutcome, SessionError> {
        self.require(&[SessionState::Selecting], "confirm")?;

        if self.selection.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        if !contact.is_complete() {
            return Err(SessionError::IncompleteContact);
        }

        if recipients.is_empty() {
            return Err(SessionError::Mail(MailError::NoRecipients));
        }

        let token = self.token()?;
        let site_id = self.site_id()?;

        self.state = SessionState::Submitting;

        let accepted = match mail::send_confirmation(
            &self.api,
            &token,
            &self.config.sender,
            recipients,
            contact,
            &self.reference,
            &self.selection,
            message,
        )
        .await
        {
            Ok(accepted) => accepted,
            Err(error) => return Err(self.fail(error.into())),
        };

        if !accepted {
            self.state = SessionState::Failed;

            return Ok(ConfirmationOutcome::MailRejected);
        }

        match booking::submit(
            &self.api,
            &token,
            &site_id,
            &self.config.list_name,
            &self.reference,
            contact,
            &self.selection,
        )
        .await
        {
            Ok(records_written) => {
                self.state = SessionState::Done;

                Ok(ConfirmationOutcome::Completed { records_written })
            }
            Err(error) => {
                self.state = SessionState::Failed;

                Ok(ConfirmationOutcome::RecordsFailed { error })
            }
        }
    }

    fn require(
        &self,
        allowed: &[SessionState],
        operation: &'static str,
    ) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::OutOfOrder {
                operation,
                state: self.state,
            })
        }
    }

    fn token(&self) -> Result<BearerToken, SessionError> {
        self.token.clone().ok_or(SessionError::OutOfOrder {
            operation: "token use",
            state: self.state,
        })
    }

    fn site_id(&self) -> Result<SiteId, SessionError> {
        self.site_id.clone().ok_or(SessionError::OutOfOrder {
            operation: "site use",
            state: self.state,
        })
    }

    fn fail(&mut self, error: SessionError) -> SessionError {
        self.state = SessionState::Failed;

        error
    }
}
