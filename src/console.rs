//! The attribute-groups tab of the realm user-profile settings.
//!
//! [`AttributeGroupsTab`] wires the store, the translation synchronizer and the
//! deletion workflow together for a UI collaborator. The UI renders
//! [`loader`](AttributeGroupsTab::loader), refreshes whenever
//! [`revision`](AttributeGroupsTab::revision) changes, and drives deletions
//! through the row action and the confirm dialog.
//!
//! # Example Usage
//!
//! ```rust
//! use realm_profile_admin::admin_api::InMemoryAdminApi;
//! use realm_profile_admin::config::AdminConsoleConfig;
//! use realm_profile_admin::console::{AttributeGroupsTab, GroupDraft};
//! use realm_profile_admin::realm::RealmRepresentation;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(InMemoryAdminApi::new());
//! api.add_realm(RealmRepresentation::new("photoz").with_locales("en", ["en", "fr"]))
//!     .await;
//!
//! let mut tab = AttributeGroupsTab::open(api, &AdminConsoleConfig::new("photoz")).await?;
//! tab.create_group(GroupDraft::new("contact").header("Contact")).await?;
//!
//! let group = tab.loader().await.remove(0);
//! tab.delete(group)?;
//! tab.confirm_delete().await?;
//! assert!(tab.loader().await.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::admin_api::AdminApi;
use crate::config::AdminConsoleConfig;
use crate::error::{ConsoleError, StoreError, WorkflowError};
use crate::notification::{LogNotifier, Notifier};
use crate::profile::group::{description_key, header_key};
use crate::profile::{AttributeGroup, DisplayText};
use crate::realm::{LocaleSet, RealmRepresentation, load_realm};
use crate::store::AttributeGroupStore;
use crate::translation::{
    LocalizationObserver, NoopObserver, SyncReport, TranslationEntry, TranslationSynchronizer,
    Translations,
};
use crate::workflow::{DeletionOutcome, GroupDeletionWorkflow};
use log::{info, warn};
use std::sync::Arc;

/// Input of the "create attribute group" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupDraft {
    pub name: String,
    pub display_header: String,
    pub display_description: String,
    pub header_translations: Vec<TranslationEntry>,
    pub description_translations: Vec<TranslationEntry>,
}

impl GroupDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.display_header = header.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.display_description = description.into();
        self
    }

    pub fn header_translation(mut self, locale: impl Into<String>, value: impl Into<String>) -> Self {
        self.header_translations
            .push(TranslationEntry::new(locale, value));
        self
    }

    pub fn description_translation(
        mut self,
        locale: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.description_translations
            .push(TranslationEntry::new(locale, value));
        self
    }
}

/// A group created through the tab, with the translations written for it.
#[derive(Debug, Clone)]
pub struct CreatedGroup {
    pub group: AttributeGroup,
    pub translations: Vec<SyncReport>,
}

/// State behind the attribute-groups tab of one realm.
pub struct AttributeGroupsTab<A: AdminApi> {
    realm: RealmRepresentation,
    store: Arc<AttributeGroupStore<A>>,
    synchronizer: TranslationSynchronizer<A>,
    workflow: GroupDeletionWorkflow<A>,
}

impl<A: AdminApi> AttributeGroupsTab<A> {
    /// Open the tab with log notifications and no localization observer.
    pub async fn open(api: Arc<A>, config: &AdminConsoleConfig) -> Result<Self, ConsoleError> {
        Self::open_with(api, config, Arc::new(LogNotifier), Arc::new(NoopObserver)).await
    }

    /// Open the tab: load the realm and its user profile.
    ///
    /// A missing realm is fatal and reported as [`ConsoleError::Realm`].
    pub async fn open_with(
        api: Arc<A>,
        config: &AdminConsoleConfig,
        notifier: Arc<dyn Notifier>,
        observer: Arc<dyn LocalizationObserver>,
    ) -> Result<Self, ConsoleError> {
        config.validate()?;
        let realm = load_realm(api.as_ref(), &config.realm).await?;
        let locales = LocaleSet::for_realm(&realm, &config.fallback_locale);

        let store = Arc::new(
            AttributeGroupStore::new(api.clone(), &config.realm).with_notifier(notifier),
        );
        store.load().await.map_err(ConsoleError::Load)?;

        info!(
            "Opened attribute groups of realm '{}' ({} locales)",
            realm.realm,
            locales.len()
        );

        let synchronizer = TranslationSynchronizer::new(api, &config.realm);
        let workflow = GroupDeletionWorkflow::new(store.clone(), locales)
            .with_settings(config.deletion.clone())
            .with_observer(observer);

        Ok(Self {
            realm,
            store,
            synchronizer,
            workflow,
        })
    }

    pub fn realm(&self) -> &RealmRepresentation {
        &self.realm
    }

    pub fn locales(&self) -> &LocaleSet {
        self.workflow.locales()
    }

    pub fn store(&self) -> &Arc<AttributeGroupStore<A>> {
        &self.store
    }

    /// Table data source.
    pub async fn loader(&self) -> Vec<AttributeGroup> {
        self.store.loader().await
    }

    /// Changes whenever the table should re-render.
    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Row action: ask for confirmation to delete `group`.
    pub fn delete(&mut self, group: AttributeGroup) -> Result<(), WorkflowError> {
        self.workflow.request_delete(group)
    }

    /// The group shown in the confirm dialog.
    pub fn pending_deletion(&self) -> Option<&AttributeGroup> {
        self.workflow.pending()
    }

    pub fn cancel_delete(&mut self) -> Option<AttributeGroup> {
        self.workflow.cancel()
    }

    pub async fn confirm_delete(&mut self) -> Result<DeletionOutcome, WorkflowError> {
        self.workflow.confirm().await
    }

    /// Create a group from the form input.
    ///
    /// With internationalization enabled and translations given, the display
    /// field becomes a reference to the generated key and the translations are
    /// written first. Otherwise the typed text is used as-is.
    ///
    /// When the save is rejected, the translations written for the group are
    /// deleted again so no orphaned keys stay behind.
    pub async fn create_group(&self, draft: GroupDraft) -> Result<CreatedGroup, StoreError> {
        // Reject bad names before any translation is written
        let current = self.store.current_or_load().await.map_err(StoreError::Load)?;
        current.with_group(AttributeGroup::new(draft.name.clone()))?;

        let mut group = AttributeGroup::new(draft.name.clone());
        let mut translations = Vec::new();

        let (header, report) = self
            .display_field(
                header_key(&draft.name),
                &draft.display_header,
                draft.header_translations,
            )
            .await;
        group.display_header = header;
        translations.extend(report);

        let (description, report) = self
            .display_field(
                description_key(&draft.name),
                &draft.display_description,
                draft.description_translations,
            )
            .await;
        group.display_description = description;
        translations.extend(report);

        if let Err(err) = self.store.create_group(group.clone()).await {
            for applied in &translations {
                let reverted = self.synchronizer.revert(applied).await;
                if !reverted.is_complete() {
                    warn!(
                        "Translations of attribute group '{}' left behind in {:?}",
                        group.name,
                        reverted.failed_locales()
                    );
                }
            }
            return Err(err);
        }

        Ok(CreatedGroup {
            group,
            translations,
        })
    }

    async fn display_field(
        &self,
        key: String,
        typed: &str,
        entries: Vec<TranslationEntry>,
    ) -> (Option<DisplayText>, Option<SyncReport>) {
        if self.realm.internationalization_enabled && !entries.is_empty() {
            let report = self
                .synchronizer
                .apply_translations(&Translations::new(key.clone(), entries))
                .await;
            return (Some(DisplayText::Reference(key)), Some(report));
        }
        if typed.is_empty() {
            (None, None)
        } else {
            (Some(DisplayText::parse(typed)), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_api::InMemoryAdminApi;
    use crate::error::RealmLoadError;

    #[tokio::test]
    async fn test_missing_realm_is_fatal() {
        let api = Arc::new(InMemoryAdminApi::new());

        let result = AttributeGroupsTab::open(api, &AdminConsoleConfig::new("ghost")).await;
        assert!(matches!(
            result,
            Err(ConsoleError::Realm(RealmLoadError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_create_literal_group_without_i18n() {
        let api = Arc::new(InMemoryAdminApi::new());
        api.add_realm(RealmRepresentation::new("photoz")).await;
        let tab = AttributeGroupsTab::open(api.clone(), &AdminConsoleConfig::new("photoz"))
            .await
            .unwrap();

        let created = tab
            .create_group(
                GroupDraft::new("contact")
                    .header("Contact")
                    .header_translation("fr", "Contact (fr)"),
            )
            .await
            .unwrap();

        assert_eq!(
            created.group.display_header,
            Some(DisplayText::literal("Contact"))
        );
        assert_eq!(created.group.display_description, None);
        assert!(created.translations.is_empty());
        assert_eq!(api.stats().await.localization_writes, 0);
    }

    #[tokio::test]
    async fn test_create_localized_group() {
        let api = Arc::new(InMemoryAdminApi::new());
        api.add_realm(RealmRepresentation::new("photoz").with_locales("en", ["en", "fr"]))
            .await;
        let tab = AttributeGroupsTab::open(api.clone(), &AdminConsoleConfig::new("photoz"))
            .await
            .unwrap();

        let created = tab
            .create_group(
                GroupDraft::new("contact")
                    .header_translation("en", "Contact")
                    .header_translation("fr", "Contact (fr)")
                    .description("How to reach you"),
            )
            .await
            .unwrap();

        assert_eq!(
            created.group.header_key(),
            Some("profile.attribute-group.contact")
        );
        assert_eq!(created.group.description_key(), None);
        assert_eq!(created.translations.len(), 1);
        let fr = api.get_localization_texts("photoz", "fr").await.unwrap().unwrap();
        assert_eq!(
            fr.get("profile.attribute-group.contact").map(String::as_str),
            Some("Contact (fr)")
        );
        assert_eq!(tab.loader().await.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_create_removes_written_translations() {
        let api = Arc::new(InMemoryAdminApi::new());
        api.add_realm(RealmRepresentation::new("photoz").with_locales("en", ["en", "fr"]))
            .await;
        api.seed_localization_texts("photoz", "fr", [("other", "keep")])
            .await
            .unwrap();
        let tab = AttributeGroupsTab::open(api.clone(), &AdminConsoleConfig::new("photoz"))
            .await
            .unwrap();
        api.reject_saves("photoz", "read-only").await;

        let err = tab
            .create_group(
                GroupDraft::new("contact")
                    .header_translation("en", "Contact")
                    .header_translation("fr", "Contact (fr)"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Save(_)));
        for locale in ["en", "fr"] {
            let texts = api
                .get_localization_texts("photoz", locale)
                .await
                .unwrap()
                .unwrap_or_default();
            assert!(!texts.contains_key("profile.attribute-group.contact"));
        }
        let fr = api.get_localization_texts("photoz", "fr").await.unwrap().unwrap();
        assert_eq!(fr.get("other").map(String::as_str), Some("keep"));
        assert_eq!(api.stats().await.localization_deletes, 2);
        assert!(tab.loader().await.is_empty());
    }
}
