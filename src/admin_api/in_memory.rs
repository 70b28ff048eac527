//! In-memory implementation of the administration API.
//!
//! This module provides a thread-safe in-memory implementation of the [`AdminApi`]
//! trait using HashMap and RwLock for concurrent access. It's designed for testing,
//! demos and benchmarks where no identity server is available.
//!
//! # Features
//!
//! * Thread-safe concurrent access with async RwLock
//! * Realm isolation through per-realm state
//! * User-profile configuration stored as raw JSON, so every save goes through serde
//! * Fault injection: failing locales, failing deletes of single keys, rejected
//!   saves and slow localization reads
//! * Saves validated like the server does: unique group names, no attribute
//!   assigned to an undefined group
//! * Call statistics for asserting which requests were made
//!
//! # Example Usage
//!
//! ```rust
//! use realm_profile_admin::admin_api::{AdminApi, InMemoryAdminApi};
//! use realm_profile_admin::realm::RealmRepresentation;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = InMemoryAdminApi::new();
//! api.add_realm(RealmRepresentation::new("photoz")).await;
//!
//! // Every localization call for "fr" now fails
//! api.fail_locale("photoz", "fr").await;
//! assert!(api.get_localization_texts("photoz", "fr").await.is_err());
//!
//! let stats = api.stats().await;
//! assert_eq!(stats.localization_reads, 1);
//! # Ok(())
//! # }
//! ```

use crate::admin_api::{AdminApi, AdminApiError, LocalizationTexts};
use crate::profile::UserProfileConfig;
use crate::realm::RealmRepresentation;
use log::{debug, trace};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Thread-safe in-memory administration API.
///
/// Cloning shares the underlying state, so a test can keep a handle for
/// inspection while the workflow owns another.
#[derive(Clone, Default)]
pub struct InMemoryAdminApi {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    realms: HashMap<String, RealmState>,
    // (realm, locale) pairs whose localization calls fail
    failing_locales: HashSet<(String, String)>,
    // (realm, locale, key) triples whose deletes fail
    failing_deletes: HashSet<(String, String, String)>,
    localization_latency: Option<Duration>,
    // realm -> rejection message for config saves
    rejected_saves: HashMap<String, String>,
    stats: InMemoryAdminApiStats,
}

struct RealmState {
    representation: RealmRepresentation,
    profile: Value,
    localization: HashMap<String, LocalizationTexts>,
}

impl InMemoryAdminApi {
    /// Create a new empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a realm, replacing any realm with the same name.
    pub async fn add_realm(&self, realm: RealmRepresentation) {
        let mut guard = self.inner.write().await;
        guard.realms.insert(
            realm.realm.clone(),
            RealmState {
                representation: realm,
                profile: Value::Null,
                localization: HashMap::new(),
            },
        );
    }

    /// Seed the stored user-profile configuration without counting it as a write.
    pub async fn set_user_profile_config(
        &self,
        realm: &str,
        config: &UserProfileConfig,
    ) -> Result<(), AdminApiError> {
        let profile = serde_json::to_value(config)?;
        let mut guard = self.inner.write().await;
        let state = guard
            .realms
            .get_mut(realm)
            .ok_or_else(|| AdminApiError::realm_not_found(realm))?;
        state.profile = profile;
        Ok(())
    }

    /// Seed localization texts for a locale, creating the table if needed.
    pub async fn seed_localization_texts<I, K, V>(
        &self,
        realm: &str,
        locale: &str,
        texts: I,
    ) -> Result<(), AdminApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut guard = self.inner.write().await;
        let state = guard
            .realms
            .get_mut(realm)
            .ok_or_else(|| AdminApiError::realm_not_found(realm))?;
        let table = state.localization.entry(locale.to_string()).or_default();
        for (key, value) in texts {
            table.insert(key.into(), value.into());
        }
        Ok(())
    }

    /// Make every localization call for `locale` in `realm` fail as unavailable.
    pub async fn fail_locale(&self, realm: &str, locale: &str) {
        let mut guard = self.inner.write().await;
        guard
            .failing_locales
            .insert((realm.to_string(), locale.to_string()));
    }

    /// Undo [`fail_locale`](Self::fail_locale).
    pub async fn heal_locale(&self, realm: &str, locale: &str) {
        let mut guard = self.inner.write().await;
        guard
            .failing_locales
            .remove(&(realm.to_string(), locale.to_string()));
    }

    /// Make deletes of `key` in `locale` of `realm` fail as unavailable. Other
    /// calls for the locale keep working.
    pub async fn fail_delete(&self, realm: &str, locale: &str, key: &str) {
        let mut guard = self.inner.write().await;
        guard
            .failing_deletes
            .insert((realm.to_string(), locale.to_string(), key.to_string()));
    }

    /// Delay every localization table read by `latency`, or remove the delay.
    pub async fn set_localization_latency(&self, latency: Option<Duration>) {
        self.inner.write().await.localization_latency = latency;
    }

    /// Make user-profile saves for `realm` fail with a 400 rejection.
    pub async fn reject_saves(&self, realm: &str, message: impl Into<String>) {
        let mut guard = self.inner.write().await;
        guard
            .rejected_saves
            .insert(realm.to_string(), message.into());
    }

    /// Undo [`reject_saves`](Self::reject_saves).
    pub async fn accept_saves(&self, realm: &str) {
        let mut guard = self.inner.write().await;
        guard.rejected_saves.remove(realm);
    }

    /// Get call statistics for assertions and debugging.
    pub async fn stats(&self) -> InMemoryAdminApiStats {
        self.inner.read().await.stats.clone()
    }

    /// Get all realm names currently registered.
    pub async fn list_realms(&self) -> Vec<String> {
        let guard = self.inner.read().await;
        let mut realms: Vec<String> = guard.realms.keys().cloned().collect();
        realms.sort();
        realms
    }

    /// Get the locales that have a text table in a realm.
    pub async fn list_locales(&self, realm: &str) -> Vec<String> {
        let guard = self.inner.read().await;
        let mut locales: Vec<String> = guard
            .realms
            .get(realm)
            .map(|state| state.localization.keys().cloned().collect())
            .unwrap_or_default();
        locales.sort();
        locales
    }

    fn check_locale(inner: &Inner, realm: &str, locale: &str) -> Result<(), AdminApiError> {
        if inner
            .failing_locales
            .contains(&(realm.to_string(), locale.to_string()))
        {
            return Err(AdminApiError::unavailable_at(
                "localization endpoint failed",
                format!("/admin/realms/{}/localization/{}", realm, locale),
            ));
        }
        Ok(())
    }

    fn duplicate_group_name(config: &UserProfileConfig) -> Option<&str> {
        let mut seen = HashSet::new();
        config
            .groups
            .iter()
            .map(|group| group.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}

impl AdminApi for InMemoryAdminApi {
    async fn find_realm(&self, realm: &str) -> Result<Option<RealmRepresentation>, AdminApiError> {
        let mut guard = self.inner.write().await;
        guard.stats.realm_lookups += 1;
        Ok(guard
            .realms
            .get(realm)
            .map(|state| state.representation.clone()))
    }

    async fn get_user_profile_config(&self, realm: &str) -> Result<UserProfileConfig, AdminApiError> {
        let mut guard = self.inner.write().await;
        guard.stats.config_reads += 1;

        let state = guard
            .realms
            .get(realm)
            .ok_or_else(|| AdminApiError::realm_not_found(realm))?;

        if state.profile.is_null() {
            return Ok(UserProfileConfig::default());
        }
        Ok(serde_json::from_value(state.profile.clone())?)
    }

    async fn save_user_profile_config(
        &self,
        realm: &str,
        config: &UserProfileConfig,
    ) -> Result<(), AdminApiError> {
        let mut guard = self.inner.write().await;
        guard.stats.config_writes += 1;

        if let Some(message) = guard.rejected_saves.get(realm) {
            return Err(AdminApiError::bad_request(message.clone()));
        }
        if let Some(name) = Self::duplicate_group_name(config) {
            return Err(AdminApiError::bad_request(format!(
                "Duplicate attribute group name '{}'",
                name
            )));
        }
        if let Some((attribute, group)) = config.undefined_group_references().first() {
            return Err(AdminApiError::bad_request(format!(
                "Attribute '{}' references undefined group '{}'",
                attribute, group
            )));
        }

        let profile = serde_json::to_value(config)?;
        let state = guard
            .realms
            .get_mut(realm)
            .ok_or_else(|| AdminApiError::realm_not_found(realm))?;
        state.profile = profile;

        debug!(
            "Stored user profile for realm '{}' with {} groups",
            realm,
            config.groups.len()
        );
        Ok(())
    }

    async fn get_localization_texts(
        &self,
        realm: &str,
        locale: &str,
    ) -> Result<Option<LocalizationTexts>, AdminApiError> {
        let latency = self.inner.read().await.localization_latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut guard = self.inner.write().await;
        guard.stats.localization_reads += 1;
        Self::check_locale(&guard, realm, locale)?;

        let state = guard
            .realms
            .get(realm)
            .ok_or_else(|| AdminApiError::realm_not_found(realm))?;
        Ok(state.localization.get(locale).cloned())
    }

    async fn put_localization_text(
        &self,
        realm: &str,
        locale: &str,
        key: &str,
        text: &str,
    ) -> Result<(), AdminApiError> {
        let mut guard = self.inner.write().await;
        guard.stats.localization_writes += 1;
        Self::check_locale(&guard, realm, locale)?;

        let state = guard
            .realms
            .get_mut(realm)
            .ok_or_else(|| AdminApiError::realm_not_found(realm))?;
        state
            .localization
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());

        trace!("Stored text {}/{}/{}", realm, locale, key);
        Ok(())
    }

    async fn delete_localization_text(
        &self,
        realm: &str,
        locale: &str,
        key: &str,
    ) -> Result<(), AdminApiError> {
        let mut guard = self.inner.write().await;
        guard.stats.localization_deletes += 1;
        Self::check_locale(&guard, realm, locale)?;
        if guard
            .failing_deletes
            .contains(&(realm.to_string(), locale.to_string(), key.to_string()))
        {
            return Err(AdminApiError::unavailable_at(
                "localization delete failed",
                format!("/admin/realms/{}/localization/{}/{}", realm, locale, key),
            ));
        }

        let state = guard
            .realms
            .get_mut(realm)
            .ok_or_else(|| AdminApiError::realm_not_found(realm))?;
        let removed = state
            .localization
            .get_mut(locale)
            .and_then(|table| table.remove(key))
            .is_some();

        trace!(
            "Deleted text {}/{}/{} (existed: {})",
            realm, locale, key, removed
        );
        Ok(())
    }
}

/// Counters of the requests an [`InMemoryAdminApi`] has served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryAdminApiStats {
    /// Number of realm lookups
    pub realm_lookups: usize,
    /// Number of user-profile reads
    pub config_reads: usize,
    /// Number of user-profile writes, including rejected ones
    pub config_writes: usize,
    /// Number of localization table reads
    pub localization_reads: usize,
    /// Number of localization text writes
    pub localization_writes: usize,
    /// Number of localization text deletes
    pub localization_deletes: usize,
}
