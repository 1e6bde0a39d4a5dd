//! Booking contact details.

/// Contact details supplied by the user for a booking.
///
/// Not validated beyond non-blankness, and only at the point of use
/// (session confirmation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInfo {
    /// Full name of the person booking.
    pub name: String,

    /// Phone number, kept as entered.
    pub phone: String,

    /// Email address, kept as entered.
    pub email: String,
}

impl ContactInfo {
    /// Create contact details.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// Returns true when every field carries a non-blank value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.email.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_contact_passes() {
        assert!(ContactInfo::new("Siri", "0701234567", "siri@example.com").is_complete());
    }

    #[test]
    fn blank_field_fails_completeness() {
        assert!(!ContactInfo::new("", "0701234567", "siri@example.com").is_complete());
        assert!(!ContactInfo::new("Siri", "  ", "siri@example.com").is_complete());
        assert!(!ContactInfo::new("Siri", "0701234567", "").is_complete());
    }
}
