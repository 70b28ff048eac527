//! The user-profile configuration of a realm.

use crate::error::GroupError;
use crate::profile::AttributeGroup;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A realm's user-profile configuration.
///
/// Only `groups` is interpreted. Attributes and any other top-level fields are
/// kept verbatim so that saving writes back the full configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileConfig {
    #[serde(default)]
    pub attributes: Vec<Value>,
    #[serde(default)]
    pub groups: Vec<AttributeGroup>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfileConfig {
    pub fn with_groups(groups: Vec<AttributeGroup>) -> Self {
        Self {
            groups,
            ..Default::default()
        }
    }

    /// Find a group by name.
    pub fn group(&self, name: &str) -> Option<&AttributeGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Position of the first group equal to `group`.
    pub fn position_of(&self, group: &AttributeGroup) -> Option<usize> {
        self.groups.iter().position(|candidate| candidate == group)
    }

    /// A copy of this configuration with exactly one group removed: the first
    /// one equal to `group`.
    ///
    /// Fails with [`GroupError::InUse`] when attributes are still assigned to
    /// the group and no other group of that name remains.
    pub fn without_group(&self, group: &AttributeGroup) -> Result<Self, GroupError> {
        let index = self.position_of(group).ok_or_else(|| GroupError::NotFound {
            name: group.name.clone(),
        })?;
        let mut updated = self.clone();
        updated.groups.remove(index);

        if updated.group(&group.name).is_none() {
            let attributes = self.attributes_in_group(&group.name);
            if !attributes.is_empty() {
                return Err(GroupError::InUse {
                    name: group.name.clone(),
                    attributes: attributes.into_iter().map(str::to_owned).collect(),
                });
            }
        }
        Ok(updated)
    }

    /// A copy of this configuration with `group` appended.
    pub fn with_group(&self, group: AttributeGroup) -> Result<Self, GroupError> {
        group.validate()?;
        if self.group(&group.name).is_some() {
            return Err(GroupError::DuplicateName { name: group.name });
        }
        let mut updated = self.clone();
        updated.groups.push(group);
        Ok(updated)
    }

    /// A copy of this configuration with the group named `original_name`
    /// replaced in place by `group`.
    pub fn with_replaced_group(
        &self,
        original_name: &str,
        group: AttributeGroup,
    ) -> Result<Self, GroupError> {
        group.validate()?;
        let index = self
            .groups
            .iter()
            .position(|candidate| candidate.name == original_name)
            .ok_or_else(|| GroupError::NotFound {
                name: original_name.to_string(),
            })?;
        if group.name != original_name && self.group(&group.name).is_some() {
            return Err(GroupError::DuplicateName { name: group.name });
        }
        let mut updated = self.clone();
        updated.groups[index] = group;
        Ok(updated)
    }

    /// Names used by more than one group, in first-duplicate order.
    pub fn duplicate_group_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for group in &self.groups {
            let name = group.name.as_str();
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }

    /// Names of attributes assigned to the group named `group_name`.
    pub fn attributes_in_group(&self, group_name: &str) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|attribute| attribute.get("group").and_then(Value::as_str) == Some(group_name))
            .filter_map(|attribute| attribute.get("name").and_then(Value::as_str))
            .collect()
    }

    /// Attributes assigned to a group this configuration does not define, as
    /// `(attribute, group)` pairs.
    pub fn undefined_group_references(&self) -> Vec<(&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|attribute| {
                let group = attribute.get("group").and_then(Value::as_str)?;
                let name = attribute
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Some((name, group))
            })
            .filter(|(_, group)| self.group(group).is_none())
            .collect()
    }
}
