//! Configuration of the attribute-groups screen.
//!
//! Configuration can be built in code with [`AdminConsoleConfig::builder`] or
//! read from JSON:
//!
//! ```rust
//! use realm_profile_admin::config::{AdminConsoleConfig, DeletionOrdering};
//!
//! let config = AdminConsoleConfig::from_json_str(
//!     r#"{"realm": "photoz", "deletion": {"ordering": "configFirst"}}"#,
//! ).unwrap();
//!
//! assert_eq!(config.fallback_locale, "en");
//! assert_eq!(config.deletion.ordering, DeletionOrdering::ConfigFirst);
//! ```

use crate::error::ConfigError;
use crate::realm::DEFAULT_LOCALE;
use serde::{Deserialize, Serialize};

/// Order in which a group deletion touches the two external resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeletionOrdering {
    /// Remove translations, then save the configuration. A failed save leaves
    /// the translations removed unless restoration is enabled.
    #[default]
    TranslationsFirst,
    /// Save the configuration, then remove translations as cleanup. A failed
    /// save leaves translations untouched; failed cleanup leaves orphaned texts.
    ConfigFirst,
}

/// How group deletions are carried out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeletionSettings {
    pub ordering: DeletionOrdering,
    /// Write removed translations back when the save fails. Only meaningful
    /// with [`DeletionOrdering::TranslationsFirst`]: under `ConfigFirst` a
    /// failed save happens before any translation is touched, and
    /// [`AdminConsoleConfig::validate`] rejects the combination.
    pub restore_translations_on_save_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConsoleConfig {
    /// Realm whose user profile is administered.
    pub realm: String,

    /// Locale used when the realm lists no supported locales.
    #[serde(default = "default_fallback_locale")]
    pub fallback_locale: String,

    #[serde(default)]
    pub deletion: DeletionSettings,
}

fn default_fallback_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl AdminConsoleConfig {
    /// Configuration for `realm` with all defaults.
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            fallback_locale: default_fallback_locale(),
            deletion: DeletionSettings::default(),
        }
    }

    pub fn builder() -> AdminConsoleConfigBuilder {
        AdminConsoleConfigBuilder::default()
    }

    /// Parse and validate JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.realm.trim().is_empty() {
            return Err(ConfigError::EmptyRealm);
        }
        if self.fallback_locale.trim().is_empty() {
            return Err(ConfigError::EmptyFallbackLocale);
        }
        if self.deletion.restore_translations_on_save_failure
            && self.deletion.ordering != DeletionOrdering::TranslationsFirst
        {
            return Err(ConfigError::RestoreWithoutTranslationsFirst);
        }
        Ok(())
    }
}

/// Builder for [`AdminConsoleConfig`].
#[derive(Debug, Default)]
pub struct AdminConsoleConfigBuilder {
    realm: Option<String>,
    fallback_locale: Option<String>,
    deletion: DeletionSettings,
}

impl AdminConsoleConfigBuilder {
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    pub fn fallback_locale(mut self, locale: impl Into<String>) -> Self {
        self.fallback_locale = Some(locale.into());
        self
    }

    pub fn deletion_ordering(mut self, ordering: DeletionOrdering) -> Self {
        self.deletion.ordering = ordering;
        self
    }

    pub fn restore_translations_on_save_failure(mut self, enabled: bool) -> Self {
        self.deletion.restore_translations_on_save_failure = enabled;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<AdminConsoleConfig, ConfigError> {
        let config = AdminConsoleConfig {
            realm: self.realm.unwrap_or_default(),
            fallback_locale: self.fallback_locale.unwrap_or_else(default_fallback_locale),
            deletion: self.deletion,
        };
        config.validate()?;
        Ok(config)
    }
}
