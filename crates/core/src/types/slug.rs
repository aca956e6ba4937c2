//! URL slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The input (or the name it was derived from) produced no slug characters.
    #[error("slug cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that slugs never contain.
    #[error("slug contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A URL path segment identifying a service class or service.
///
/// Slugs are derived from the entity name once, when the entity is created,
/// and are never rewritten afterwards.
///
/// ## Constraints
///
/// - Length: 1-150 characters
/// - Only lowercase ASCII letters, digits, `-` and `_`
///
/// ## Examples
///
/// ```
/// use servicecart_core::Slug;
///
/// let slug = Slug::from_name("AI Strategy & Consulting").unwrap();
/// assert_eq!(slug.as_str(), "ai-strategy-consulting");
///
/// assert!(Slug::parse("consulting").is_ok());
/// assert!(Slug::parse("Not A Slug").is_err());
/// assert!(Slug::from_name("!!!").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug (matches the widest slug column).
    pub const MAX_LENGTH: usize = 150;

    /// Parse an existing slug, e.g. a path segment or a database value.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or contains a
    /// character outside `[a-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
        {
            return Err(SlugError::InvalidCharacter(c));
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a display name.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the name contains no slug characters,
    /// or [`SlugError::TooLong`] if the derived slug is too long.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        Self::parse(&slugify(name))
    }

    /// Get the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convert a display name to a slug.
///
/// Lowercases the input, drops non-ASCII characters and anything that is
/// not alphanumeric, `_`, `-` or whitespace, collapses runs of whitespace
/// and hyphens into a single `-`, then trims `-` and `_` from both ends.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().filter(char::is_ascii) {
        if c.is_ascii_whitespace() || c == '-' {
            pending_separator = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(c.to_ascii_lowercase());
        }
    }

    out.trim_matches(|c| c == '-' || c == '_').to_owned()
}
