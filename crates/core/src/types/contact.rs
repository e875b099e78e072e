//! Contact form input.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::WebsiteId;

/// Errors that can occur when parsing an [`Email`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input is not `local@domain`.
    #[error("email must look like name@domain")]
    Malformed,
}

/// An email address with minimal structural validation.
///
/// Surrounding whitespace is trimmed; exactly one `@` with a non-empty local
/// part and domain is required.
///
/// ```
/// use inktrix_core::Email;
///
/// assert!(Email::parse(" buyer@example.com ").is_ok());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 254
    /// characters, or not of the form `local@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// Why a contact form was not accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactFormError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

/// A message for the store's support team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub website_id: WebsiteId,
}

impl ContactForm {
    /// Validate raw form fields.
    ///
    /// # Errors
    ///
    /// Returns [`ContactFormError`] when `name` or `message` is blank or the
    /// email is not valid. `phone` and `subject` are optional.
    pub fn new(
        website_id: WebsiteId,
        name: &str,
        email: &str,
        phone: &str,
        subject: &str,
        message: &str,
    ) -> Result<Self, ContactFormError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactFormError::MissingField("name"));
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(ContactFormError::MissingField("message"));
        }

        Ok(Self {
            name: name.to_string(),
            email: Email::parse(email)?,
            phone: phone.trim().to_string(),
            subject: subject.trim().to_string(),
            message: message.to_string(),
            website_id,
        })
    }
}
