//! Confirmation mail composition and dispatch.

use serde_json::{Value, json};
use thiserror::Error;

use crate::{
    contact::ContactInfo,
    graph::{BearerToken, GraphApi, RequestError},
    reference::BookingReference,
    selection::Selection,
};

/// Status with which the mail service acknowledges acceptance.
const ACCEPTED_STATUS: u16 = 202;

const SUBJECT: &str = "Booking confirmation";

/// Errors raised by confirmation dispatch.
#[derive(Debug, Error)]
pub enum MailError {
    /// At least one recipient is required; checked before any network call.
    #[error("at least one recipient is required")]
    NoRecipients,

    /// Low-level request failure while contacting the mail endpoint.
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Compose and send the HTML confirmation mail.
///
/// Acceptance is judged strictly on the service's accepted status (202);
/// any other status yields `Ok(false)` and a warning log — it is delivery
/// acceptance, not delivery confirmation. The caller decides whether to
/// proceed to record submission.
///
/// # Errors
///
/// Returns [`MailError::NoRecipients`] for an empty recipient set and
/// [`MailError::Request`] on transport failure.
pub async fn send_confirmation<C: GraphApi + ?Sized>(
    api: &C,
    token: &BearerToken,
    sender: &str,
    recipients: &[String],
    contact: &ContactInfo,
    reference: &BookingReference,
    selection: &Selection,
    message: Option<&str>,
) -> Result<bool, MailError> {
    if recipients.is_empty() {
        return Err(MailError::NoRecipients);
    }

    let body = confirmation_body(contact, reference, selection, message);
    let mail = mail_message(recipients, SUBJECT, &body);

    let status = api.send_mail(token, sender, &mail).await?;

    if status == ACCEPTED_STATUS {
        tracing::info!(recipients = recipients.len(), "confirmation mail accepted");

        Ok(true)
    } else {
        tracing::warn!(status, "confirmation mail was not accepted");

        Ok(false)
    }
}

/// Build the HTML body: greeting, booking reference, the selection as a
/// table, and the free-text message with newlines as `<br>`.
#[must_use]
pub fn confirmation_body(
    contact: &ContactInfo,
    reference: &BookingReference,
    selection: &Selection,
    message: Option<&str>,
) -> String {
    let mut body = String::new();

    body.push_str(&format!("<p>Hi {},</p>", escape_html(&contact.name)));
    body.push_str(&format!(
        "<p>Your booking reference is <strong>{reference}</strong>.</p>"
    ));

    body.push_str("<table border=\"1\"><tr><th>Week</th><th>Facility</th><th>Location</th><th>Instructor</th><th>Price</th></tr>");

    for row in selection.rows() {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.week,
            escape_html(&row.facility),
            escape_html(&row.location),
            escape_html(&row.instructor),
            row.price,
        ));
    }

    body.push_str("</table>");

    if let Some(message) = message {
        let message = escape_html(message).replace('\n', "<br>");

        body.push_str(&format!("<p>{message}</p>"));
    }

    body
}

/// Build the message payload for the send-mail endpoint.
#[must_use]
pub fn mail_message(recipients: &[String], subject: &str, html_body: &str) -> Value {
    let to_recipients: Vec<Value> = recipients
        .iter()
        .map(|address| json!({ "emailAddress": { "address": address } }))
        .collect();

    json!({
        "subject": subject,
        "body": {
            "contentType": "HTML",
            "content": html_body,
        },
        "toRecipients": to_recipients,
    })
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());

    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::graph::MockGraphApi;
    use crate::offerings::CourseOffering;

    use super::*;

    fn selection() -> Selection {
        let mut selection = Selection::new();

        selection.add(CourseOffering {
            week: 31,
            facility: "Aqua Hall".to_string(),
            location: "Umeå".to_string(),
            instructor: "Ivar".to_string(),
            price: Decimal::from(1000),
        });

        selection
    }

    fn contact() -> ContactInfo {
        ContactInfo::new("Siri", "0701234567", "siri@example.com")
    }

    fn reference() -> BookingReference {
        BookingReference::from_str("abc12345").expect("reference should parse")
    }

    #[tokio::test]
    async fn empty_recipients_fail_before_any_network_call() {
        // No expectations registered: any call to the mock would panic.
        let api = MockGraphApi::new();

        let result = send_confirmation(
            &api,
            &BearerToken::new("tok"),
            "noreply@example.com",
            &[],
            &contact(),
            &reference(),
            &selection(),
            None,
        )
        .await;

        assert!(matches!(result, Err(MailError::NoRecipients)));
    }

    #[tokio::test]
    async fn accepted_status_reports_true() -> TestResult {
        let mut api = MockGraphApi::new();

        api.expect_send_mail()
            .times(1)
            .withf(|_, sender, message| {
                sender == "noreply@example.com"
                    && message["body"]["content"]
                        .as_str()
                        .is_some_and(|c| c.contains("abc12345"))
            })
            .returning(|_, _, _| Ok(202));

        let accepted = send_confirmation(
            &api,
            &BearerToken::new("tok"),
            "noreply@example.com",
            &["siri@example.com".to_string()],
            &contact(),
            &reference(),
            &selection(),
            None,
        )
        .await?;

        assert!(accepted);

        Ok(())
    }

    #[tokio::test]
    async fn any_other_status_reports_false() -> TestResult {
        let mut api = MockGraphApi::new();

        api.expect_send_mail().times(1).returning(|_, _, _| Ok(200));

        let accepted = send_confirmation(
            &api,
            &BearerToken::new("tok"),
            "noreply@example.com",
            &["siri@example.com".to_string()],
            &contact(),
            &reference(),
            &selection(),
            None,
        )
        .await?;

        assert!(!accepted);

        Ok(())
    }

    #[test]
    fn body_embeds_reference_table_and_message() {
        let body = confirmation_body(
            &contact(),
            &reference(),
            &selection(),
            Some("See you soon!\nBring towels."),
        );

        assert!(body.contains("abc12345"));
        assert!(body.contains("<td>Aqua Hall</td>"));
        assert!(body.contains("See you soon!<br>Bring towels."));
    }

    #[test]
    fn body_escapes_html_in_user_content() {
        let contact = ContactInfo::new("<script>", "1", "a@b.c");
        let body = confirmation_body(&contact, &reference(), &selection(), Some("a & b"));

        assert!(body.contains("&lt;script&gt;"));
        assert!(body.contains("a &amp; b"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn message_payload_lists_every_recipient() {
        let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        let message = mail_message(&recipients, "Subject", "<p>body</p>");

        assert_eq!(
            message["toRecipients"]
                .as_array()
                .map(std::vec::Vec::len),
            Some(2)
        );
        assert_eq!(
            message["toRecipients"][0]["emailAddress"]["address"],
            "a@example.com"
        );
        assert_eq!(message["body"]["contentType"], "HTML");
    }
}
