//! Customer details collected at checkout.

use crate::error::{CommerceError, FieldError};
use crate::ids::LocationId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 8;

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern")
    })
}

/// Contact and delivery details for an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Free-text delivery address.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomerDetails {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_location(mut self, location_id: impl Into<LocationId>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    /// Check every field and report all failures together.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "is required"));
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.push(FieldError::new("phone", "is required"));
        } else if !phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
        {
            errors.push(FieldError::new("phone", "must contain digits only"));
        } else if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
            errors.push(FieldError::new(
                "phone",
                format!("must have at least {} digits", MIN_PHONE_DIGITS),
            ));
        }

        if let Some(email) = self.email.as_deref().map(str::trim) {
            if !email.is_empty() && !email_pattern().is_match(email) {
                errors.push(FieldError::new("email", "is not a valid address"));
            }
        }

        if self.address.trim().is_empty() {
            errors.push(FieldError::new("address", "is required"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::Validation(errors))
        }
    }

    /// Copy with surrounding whitespace removed and blank optionals cleared.
    pub fn normalized(&self) -> Self {
        fn opt(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: opt(&self.email),
            address: self.address.trim().to_string(),
            location_id: self.location_id.clone(),
            notes: opt(&self.notes),
        }
    }
}
