//! DisplayText value object for attribute-group display fields.
//!
//! A group's display header and description are either literal text or a
//! reference to a localization key, written `${key}` on the wire. Modelling the
//! two cases as variants means a translation key only ever comes from a real
//! reference; a literal value can never be mistaken for a key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Literal text or a reference to a per-locale translation.
///
/// ## Examples
///
/// ```rust
/// use realm_profile_admin::profile::DisplayText;
///
/// let header = DisplayText::parse("${profile.attribute-group.contact}");
/// assert_eq!(header.translation_key(), Some("profile.attribute-group.contact"));
///
/// let literal = DisplayText::parse("Contact details");
/// assert_eq!(literal.translation_key(), None);
/// assert_eq!(literal.to_string(), "Contact details");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayText {
    /// Text shown as-is
    Literal(String),
    /// Key of a localization entry
    Reference(String),
}

impl DisplayText {
    /// Parse the wire form.
    ///
    /// A value is a reference only when the whole string is `${key}` with a
    /// non-empty key containing no `}`. Anything else is literal.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            Some(key) if !key.is_empty() && !key.contains('}') => {
                DisplayText::Reference(key.to_string())
            }
            _ => DisplayText::Literal(raw.to_string()),
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        DisplayText::Literal(text.into())
    }

    pub fn reference(key: impl Into<String>) -> Self {
        DisplayText::Reference(key.into())
    }

    /// The translation key, if this is a reference.
    pub fn translation_key(&self) -> Option<&str> {
        match self {
            DisplayText::Reference(key) => Some(key),
            DisplayText::Literal(_) => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, DisplayText::Reference(_))
    }
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayText::Literal(text) => write!(f, "{}", text),
            DisplayText::Reference(key) => write!(f, "${{{}}}", key),
        }
    }
}

impl Serialize for DisplayText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DisplayText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(DisplayText::parse(&raw))
    }
}
