//! Attribute groups of a realm's user profile.

use crate::error::GroupError;
use crate::profile::DisplayText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key prefix of generated display-header references.
pub const HEADER_KEY_PREFIX: &str = "profile.attribute-group.";

/// Key prefix of generated display-description references.
pub const DESCRIPTION_KEY_PREFIX: &str = "profile.attribute-group-description.";

/// A named group of user-profile attributes, shown as a section in profile forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_header: Option<DisplayText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_description: Option<DisplayText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Map<String, Value>>,
}

impl AttributeGroup {
    /// Create a group with no display fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_header: None,
            display_description: None,
            annotations: None,
        }
    }

    /// Create a group whose header and description reference the generated
    /// translation keys for `name`.
    pub fn localized(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_header: Some(DisplayText::Reference(header_key(&name))),
            display_description: Some(DisplayText::Reference(description_key(&name))),
            ..Self::new(name)
        }
    }

    pub fn with_display_header(mut self, header: DisplayText) -> Self {
        self.display_header = Some(header);
        self
    }

    pub fn with_display_description(mut self, description: DisplayText) -> Self {
        self.display_description = Some(description);
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: Value) -> Self {
        self.annotations
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Translation key of the display header, if it is a reference.
    pub fn header_key(&self) -> Option<&str> {
        self.display_header
            .as_ref()
            .and_then(DisplayText::translation_key)
    }

    /// Translation key of the display description, if it is a reference.
    pub fn description_key(&self) -> Option<&str> {
        self.display_description
            .as_ref()
            .and_then(DisplayText::translation_key)
    }

    /// Distinct translation keys owned by this group, header first.
    pub fn translation_keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(2);
        for key in [self.header_key(), self.description_key()].into_iter().flatten() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Check the group name.
    pub fn validate(&self) -> Result<(), GroupError> {
        if self.name.trim().is_empty() {
            return Err(GroupError::EmptyName);
        }
        Ok(())
    }
}

/// Generated header translation key for a group name.
pub fn header_key(name: &str) -> String {
    format!("{}{}", HEADER_KEY_PREFIX, name)
}

/// Generated description translation key for a group name.
pub fn description_key(name: &str) -> String {
    format!("{}{}", DESCRIPTION_KEY_PREFIX, name)
}
