//! Cached user-profile configuration with persistence through the admin API.
//!
//! The store owns the in-memory copy of a realm's user-profile configuration
//! that the attribute-groups table renders. Every change is written as the full
//! configuration (last writer wins) and the cached copy is only replaced once
//! the write succeeded.

use crate::admin_api::{AdminApi, AdminApiError};
use crate::error::{SaveError, StoreError};
use crate::notification::{LogNotifier, Notification, Notifier, SaveMessages};
use crate::profile::{AttributeGroup, UserProfileConfig};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// User-profile configuration of one realm.
pub struct AttributeGroupStore<A: AdminApi> {
    api: Arc<A>,
    realm: String,
    config: RwLock<Option<UserProfileConfig>>,
    revision: AtomicU64,
    notifier: Arc<dyn Notifier>,
}

impl<A: AdminApi> AttributeGroupStore<A> {
    /// Create a store that reports save results to the log.
    pub fn new(api: Arc<A>, realm: impl Into<String>) -> Self {
        Self {
            api,
            realm: realm.into(),
            config: RwLock::new(None),
            revision: AtomicU64::new(0),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Counter bumped whenever the cached configuration changes.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Fetch the configuration from the API and cache it.
    pub async fn load(&self) -> Result<UserProfileConfig, AdminApiError> {
        let config = self.api.get_user_profile_config(&self.realm).await?;
        debug!(
            "Loaded user profile of realm '{}' with {} groups",
            self.realm,
            config.groups.len()
        );
        self.replace_cached(config.clone()).await;
        Ok(config)
    }

    /// The cached configuration, if loaded.
    pub async fn current(&self) -> Option<UserProfileConfig> {
        self.config.read().await.clone()
    }

    /// The cached configuration, loading it first if needed.
    pub async fn current_or_load(&self) -> Result<UserProfileConfig, AdminApiError> {
        match self.current().await {
            Some(config) => Ok(config),
            None => self.load().await,
        }
    }

    /// Table data source: the cached groups, or nothing before the first load.
    pub async fn loader(&self) -> Vec<AttributeGroup> {
        self.config
            .read()
            .await
            .as_ref()
            .map(|config| config.groups.clone())
            .unwrap_or_default()
    }

    /// Persist the full configuration.
    ///
    /// On success the cache is replaced and a success notification is sent; on
    /// failure the cache is left alone and an error notification is sent. The
    /// write is attempted once.
    pub async fn save(
        &self,
        config: UserProfileConfig,
        messages: &SaveMessages,
    ) -> Result<(), SaveError> {
        info!(
            "Saving user profile of realm '{}' with {} groups",
            self.realm,
            config.groups.len()
        );

        match self
            .api
            .save_user_profile_config(&self.realm, &config)
            .await
        {
            Ok(()) => {
                self.replace_cached(config).await;
                self.notifier
                    .notify(Notification::success(&messages.success_message_key));
                Ok(())
            }
            Err(source) => {
                error!(
                    "Failed to save user profile of realm '{}': {}",
                    self.realm, source
                );
                self.notifier.notify(Notification::error(
                    &messages.error_message_key,
                    source.to_string(),
                ));
                Err(SaveError {
                    realm: self.realm.clone(),
                    message_key: messages.error_message_key.clone(),
                    source,
                })
            }
        }
    }

    /// Append a new group and persist.
    pub async fn create_group(&self, group: AttributeGroup) -> Result<UserProfileConfig, StoreError> {
        let current = self.current_or_load().await.map_err(StoreError::Load)?;
        let updated = current.with_group(group)?;
        self.save(updated.clone(), &SaveMessages::group_created())
            .await?;
        Ok(updated)
    }

    /// Replace the group named `original_name` and persist.
    pub async fn update_group(
        &self,
        original_name: &str,
        group: AttributeGroup,
    ) -> Result<UserProfileConfig, StoreError> {
        let current = self.current_or_load().await.map_err(StoreError::Load)?;
        let updated = current.with_replaced_group(original_name, group)?;
        self.save(updated.clone(), &SaveMessages::group_updated())
            .await?;
        Ok(updated)
    }

    async fn replace_cached(&self, config: UserProfileConfig) {
        *self.config.write().await = Some(config);
        self.revision.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_api::InMemoryAdminApi;
    use crate::error::GroupError;
    use crate::notification::{NotificationKind, RecordingNotifier};
    use crate::realm::RealmRepresentation;

    async fn setup() -> (
        Arc<InMemoryAdminApi>,
        AttributeGroupStore<InMemoryAdminApi>,
        RecordingNotifier,
    ) {
        let api = Arc::new(InMemoryAdminApi::new());
        api.add_realm(RealmRepresentation::new("photoz")).await;
        api.set_user_profile_config(
            "photoz",
            &UserProfileConfig::with_groups(vec![
                AttributeGroup::new("user-metadata"),
                AttributeGroup::localized("contact"),
            ]),
        )
        .await
        .unwrap();
        let notifier = RecordingNotifier::new();
        let store =
            AttributeGroupStore::new(api.clone(), "photoz").with_notifier(Arc::new(notifier.clone()));
        (api, store, notifier)
    }

    #[tokio::test]
    async fn test_loader_before_and_after_load() {
        let (_api, store, _notifier) = setup().await;

        assert!(store.loader().await.is_empty());
        assert_eq!(store.revision(), 0);

        store.load().await.unwrap();
        let names: Vec<String> = store.loader().await.into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["user-metadata", "contact"]);
        assert_eq!(store.revision(), 1);
    }

    #[tokio::test]
    async fn test_save_success_replaces_cache() {
        let (api, store, notifier) = setup().await;
        let config = store.load().await.unwrap();
        let updated = config.with_group(AttributeGroup::new("work")).unwrap();

        store
            .save(updated.clone(), &SaveMessages::group_created())
            .await
            .unwrap();

        assert_eq!(store.current().await, Some(updated.clone()));
        assert_eq!(api.get_user_profile_config("photoz").await.unwrap(), updated);
        assert_eq!(notifier.message_keys(), vec!["createGroupSuccess"]);
        assert_eq!(store.revision(), 2);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_cache() {
        let (api, store, notifier) = setup().await;
        let config = store.load().await.unwrap();
        api.reject_saves("photoz", "forbidden change").await;

        let err = store
            .save(UserProfileConfig::default(), &SaveMessages::group_deleted())
            .await
            .unwrap_err();

        assert_eq!(err.message_key, "deleteAttributeGroupError");
        assert_eq!(store.current().await, Some(config));
        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Error);
        assert_eq!(store.revision(), 1);
    }

    #[tokio::test]
    async fn test_save_overwrites_concurrent_changes() {
        let (api, store, _notifier) = setup().await;
        let stale = store.load().await.unwrap();

        // Another editor adds a group behind our back
        api.save_user_profile_config(
            "photoz",
            &stale.with_group(AttributeGroup::new("theirs")).unwrap(),
        )
        .await
        .unwrap();

        store
            .save(
                stale.with_group(AttributeGroup::new("ours")).unwrap(),
                &SaveMessages::group_created(),
            )
            .await
            .unwrap();

        let persisted = api.get_user_profile_config("photoz").await.unwrap();
        assert!(persisted.group("ours").is_some());
        assert!(persisted.group("theirs").is_none());
    }

    #[tokio::test]
    async fn test_create_group_loads_on_demand() {
        let (_api, store, _notifier) = setup().await;

        let updated = store.create_group(AttributeGroup::new("work")).await.unwrap();
        assert_eq!(updated.groups.len(), 3);

        let err = store
            .create_group(AttributeGroup::new("work"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Group(GroupError::DuplicateName { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_group() {
        let (_api, store, notifier) = setup().await;

        let updated = store
            .update_group("contact", AttributeGroup::new("contact-info"))
            .await
            .unwrap();
        assert_eq!(updated.groups[1].name, "contact-info");
        assert_eq!(notifier.message_keys(), vec!["updateGroupSuccess"]);
    }
}
