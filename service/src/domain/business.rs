//! Business-related definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display};
use serde::Serialize;

/// ID of a business registered by a [`User`].
///
/// Used as a URL path segment, so only ASCII alphanumerics, `-` and `_` are
/// allowed.
///
/// [`User`]: crate::domain::User
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str)]
pub struct Id(String);

impl Id {
    /// Maximum length of an [`Id`].
    const MAX_LEN: usize = 64;

    /// Creates a new [`Id`] if the given value is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        (!id.is_empty()
            && id.len() <= Self::MAX_LEN
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .then_some(Self(id))
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid business `Id`")
    }
}

/// Editable details of a business.
///
/// Only the provided fields are sent, so the rest stay untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Info {
    /// Registered name of the business.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,

    /// Official registration number of the business.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,

    /// Legal type of the business.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,

    /// Postal address of the business.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Website of the business.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}
