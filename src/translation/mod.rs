//! Keeps per-locale localization texts in step with attribute groups.
//!
//! Every operation fans out over a set of locales. Locales run concurrently on
//! the calling task and are isolated from each other: a failure in one locale
//! is logged and recorded in the [`SyncReport`], and the others carry on. The
//! report is returned once every locale has settled.
//!
//! # Example Usage
//!
//! ```rust
//! use realm_profile_admin::admin_api::InMemoryAdminApi;
//! use realm_profile_admin::profile::AttributeGroup;
//! use realm_profile_admin::realm::{LocaleSet, RealmRepresentation};
//! use realm_profile_admin::translation::{NoopObserver, TranslationSynchronizer};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(InMemoryAdminApi::new());
//! api.add_realm(RealmRepresentation::new("photoz")).await;
//! api.seed_localization_texts("photoz", "en", [("profile.attribute-group.contact", "Contact")])
//!     .await?;
//!
//! let synchronizer = TranslationSynchronizer::new(api.clone(), "photoz");
//! let locales: LocaleSet = ["en", "fr"].into_iter().collect();
//! let report = synchronizer
//!     .remove_translations(&AttributeGroup::localized("contact"), &locales, &NoopObserver)
//!     .await;
//!
//! assert!(report.is_complete());
//! assert_eq!(report.changed_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod report;

pub use report::{LocaleOutcome, LocaleStatus, SyncOperation, SyncReport};

use crate::admin_api::{AdminApi, LocalizationTexts};
use crate::error::{LocalizationSyncError, SyncStage};
use crate::profile::AttributeGroup;
use crate::realm::LocaleSet;
use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Receives the refreshed text table of a locale after its translations were
/// synchronized, so a UI table can show live data.
pub trait LocalizationObserver: Send + Sync {
    fn localization_updated(&self, locale: &str, texts: &LocalizationTexts);
}

impl<F> LocalizationObserver for F
where
    F: Fn(&str, &LocalizationTexts) + Send + Sync,
{
    fn localization_updated(&self, locale: &str, texts: &LocalizationTexts) {
        self(locale, texts)
    }
}

/// Observer that ignores updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LocalizationObserver for NoopObserver {
    fn localization_updated(&self, _locale: &str, _texts: &LocalizationTexts) {}
}

/// One translated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub locale: String,
    pub value: String,
}

impl TranslationEntry {
    pub fn new(locale: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            value: value.into(),
        }
    }
}

/// Translations of one key across locales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translations {
    pub key: String,
    pub translations: Vec<TranslationEntry>,
}

impl Translations {
    pub fn new(key: impl Into<String>, translations: Vec<TranslationEntry>) -> Self {
        Self {
            key: key.into(),
            translations,
        }
    }
}

/// Applies and removes localization texts of attribute groups for one realm.
pub struct TranslationSynchronizer<A: AdminApi> {
    api: Arc<A>,
    realm: String,
}

impl<A: AdminApi> TranslationSynchronizer<A> {
    pub fn new(api: Arc<A>, realm: impl Into<String>) -> Self {
        Self {
            api,
            realm: realm.into(),
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Remove a group's translation keys from every locale.
    ///
    /// Only keys from reference-valued display fields are removed. A group with
    /// literal display fields owns no keys, and every locale is reported as
    /// [`LocaleStatus::Skipped`] without any request being made.
    pub async fn remove_translations(
        &self,
        group: &AttributeGroup,
        locales: &LocaleSet,
        observer: &dyn LocalizationObserver,
    ) -> SyncReport {
        let keys: Vec<String> = group
            .translation_keys()
            .into_iter()
            .map(str::to_owned)
            .collect();

        if keys.is_empty() {
            debug!(
                "Attribute group '{}' in realm '{}' has no translation references",
                group.name, self.realm
            );
            return SyncReport::new(
                SyncOperation::Remove,
                locales
                    .iter()
                    .map(|locale| LocaleOutcome::new(locale, LocaleStatus::Skipped))
                    .collect(),
            );
        }

        info!(
            "Removing translations {:?} of attribute group '{}' from {} locales in realm '{}'",
            keys,
            group.name,
            locales.len(),
            self.realm
        );

        let branches = locales
            .iter()
            .map(|locale| self.remove_in_locale(locale, &keys, observer));
        let report = SyncReport::new(SyncOperation::Remove, join_all(branches).await);

        self.log_report(&report);
        report
    }

    /// Write translations, one locale per entry.
    pub async fn apply_translations(&self, translations: &Translations) -> SyncReport {
        let mut by_locale: BTreeMap<&str, LocalizationTexts> = BTreeMap::new();
        for entry in &translations.translations {
            by_locale
                .entry(entry.locale.as_str())
                .or_default()
                .insert(translations.key.clone(), entry.value.clone());
        }

        debug!(
            "Applying translations of '{}' to {} locales in realm '{}'",
            translations.key,
            by_locale.len(),
            self.realm
        );

        let branches = by_locale
            .into_iter()
            .map(|(locale, entries)| self.write_locale(locale, entries));
        let report = SyncReport::new(SyncOperation::Apply, join_all(branches).await);

        self.log_report(&report);
        report
    }

    /// Write back the entries a previous run changed, including those changed by
    /// locales that failed part-way.
    pub async fn restore(&self, report: &SyncReport) -> SyncReport {
        let branches = report
            .outcomes()
            .iter()
            .filter_map(|outcome| {
                outcome
                    .entries()
                    .filter(|entries| !entries.is_empty())
                    .map(|entries| self.write_locale(&outcome.locale, entries.clone()))
            });
        let restored = SyncReport::new(SyncOperation::Restore, join_all(branches).await);

        info!(
            "Restored {} translations in realm '{}'",
            restored.changed_count(),
            self.realm
        );
        self.log_report(&restored);
        restored
    }

    /// Delete the entries a previous [`apply_translations`](Self::apply_translations)
    /// wrote, including those of locales that failed part-way.
    pub async fn revert(&self, applied: &SyncReport) -> SyncReport {
        let branches = applied.outcomes().iter().filter_map(|outcome| {
            outcome
                .entries()
                .filter(|entries| !entries.is_empty())
                .map(|entries| self.delete_locale(&outcome.locale, entries.clone()))
        });
        let reverted = SyncReport::new(SyncOperation::Revert, join_all(branches).await);

        info!(
            "Reverted {} translations in realm '{}'",
            reverted.changed_count(),
            self.realm
        );
        self.log_report(&reverted);
        reverted
    }

    async fn remove_in_locale(
        &self,
        locale: &str,
        keys: &[String],
        observer: &dyn LocalizationObserver,
    ) -> LocaleOutcome {
        let mut removed = LocalizationTexts::new();
        let status = match self
            .try_remove_in_locale(locale, keys, observer, &mut removed)
            .await
        {
            Ok(true) => LocaleStatus::Updated { entries: removed },
            Ok(false) => LocaleStatus::NoTable,
            Err(error) => {
                warn!("Error removing translations for {}: {}", locale, error);
                LocaleStatus::Failed {
                    error,
                    entries: removed,
                }
            }
        };
        LocaleOutcome::new(locale, status)
    }

    // Returns false when the locale has no text table.
    async fn try_remove_in_locale(
        &self,
        locale: &str,
        keys: &[String],
        observer: &dyn LocalizationObserver,
        removed: &mut LocalizationTexts,
    ) -> Result<bool, LocalizationSyncError> {
        let existing = self
            .api
            .get_localization_texts(&self.realm, locale)
            .await
            .map_err(|source| LocalizationSyncError::new(locale, SyncStage::Fetch, source))?;

        let Some(existing) = existing else {
            debug!("Realm '{}' has no texts for locale '{}'", self.realm, locale);
            return Ok(false);
        };

        for key in keys {
            self.api
                .delete_localization_text(&self.realm, locale, key)
                .await
                .map_err(|source| {
                    LocalizationSyncError::new(locale, SyncStage::Delete { key: key.clone() }, source)
                })?;
            if let Some(text) = existing.get(key) {
                removed.insert(key.clone(), text.clone());
            }
        }

        let updated = self
            .api
            .get_localization_texts(&self.realm, locale)
            .await
            .map_err(|source| LocalizationSyncError::new(locale, SyncStage::Refetch, source))?
            .unwrap_or_default();
        observer.localization_updated(locale, &updated);

        Ok(true)
    }

    async fn write_locale(&self, locale: &str, entries: LocalizationTexts) -> LocaleOutcome {
        let mut written = LocalizationTexts::new();
        for (key, text) in entries {
            if let Err(source) = self
                .api
                .put_localization_text(&self.realm, locale, &key, &text)
                .await
            {
                let error = LocalizationSyncError::new(locale, SyncStage::Write { key }, source);
                warn!("Error writing translations for {}: {}", locale, error);
                return LocaleOutcome::new(
                    locale,
                    LocaleStatus::Failed {
                        error,
                        entries: written,
                    },
                );
            }
            written.insert(key, text);
        }
        LocaleOutcome::new(locale, LocaleStatus::Updated { entries: written })
    }

    async fn delete_locale(&self, locale: &str, entries: LocalizationTexts) -> LocaleOutcome {
        let mut deleted = LocalizationTexts::new();
        for (key, text) in entries {
            if let Err(source) = self
                .api
                .delete_localization_text(&self.realm, locale, &key)
                .await
            {
                let error = LocalizationSyncError::new(locale, SyncStage::Delete { key }, source);
                warn!("Error reverting translations for {}: {}", locale, error);
                return LocaleOutcome::new(
                    locale,
                    LocaleStatus::Failed {
                        error,
                        entries: deleted,
                    },
                );
            }
            deleted.insert(key, text);
        }
        LocaleOutcome::new(locale, LocaleStatus::Updated { entries: deleted })
    }

    fn log_report(&self, report: &SyncReport) {
        let failed = report.failed_locales();
        if failed.is_empty() {
            debug!(
                "{:?} finished for {} locales in realm '{}'",
                report.operation(),
                report.outcomes().len(),
                self.realm
            );
        } else {
            warn!(
                "{:?} finished in realm '{}' with {} failed locales: {:?}",
                report.operation(),
                self.realm,
                failed.len(),
                failed
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_api::InMemoryAdminApi;
    use crate::profile::DisplayText;
    use crate::realm::RealmRepresentation;
    use std::sync::Mutex;

    const HEADER: &str = "profile.attribute-group.contact";
    const DESCRIPTION: &str = "profile.attribute-group-description.contact";

    async fn setup() -> (Arc<InMemoryAdminApi>, TranslationSynchronizer<InMemoryAdminApi>) {
        let api = Arc::new(InMemoryAdminApi::new());
        api.add_realm(RealmRepresentation::new("photoz").with_locales("en", ["en", "fr"]))
            .await;
        for (locale, header, description) in [
            ("en", "Contact", "How to reach you"),
            ("fr", "Contact (fr)", "Comment vous joindre"),
        ] {
            api.seed_localization_texts(
                "photoz",
                locale,
                [(HEADER, header), (DESCRIPTION, description), ("other", "keep")],
            )
            .await
            .unwrap();
        }
        let synchronizer = TranslationSynchronizer::new(api.clone(), "photoz");
        (api, synchronizer)
    }

    fn locales(list: &[&'static str]) -> LocaleSet {
        list.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_remove_translations_in_every_locale() {
        let (api, synchronizer) = setup().await;

        let report = synchronizer
            .remove_translations(
                &AttributeGroup::localized("contact"),
                &locales(&["en", "fr"]),
                &NoopObserver,
            )
            .await;

        assert!(report.is_complete());
        assert_eq!(report.changed_count(), 4);
        for locale in ["en", "fr"] {
            let texts = api
                .get_localization_texts("photoz", locale)
                .await
                .unwrap()
                .unwrap();
            assert!(!texts.contains_key(HEADER));
            assert!(!texts.contains_key(DESCRIPTION));
            assert_eq!(texts.get("other").map(String::as_str), Some("keep"));
        }
    }

    #[tokio::test]
    async fn test_observer_sees_refreshed_tables() {
        let (_api, synchronizer) = setup().await;
        let seen: Mutex<Vec<(String, usize)>> = Mutex::new(Vec::new());
        let observer = |locale: &str, texts: &LocalizationTexts| {
            seen.lock().unwrap().push((locale.to_string(), texts.len()));
        };

        synchronizer
            .remove_translations(
                &AttributeGroup::localized("contact"),
                &locales(&["en", "fr"]),
                &observer,
            )
            .await;

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, vec![("en".to_string(), 1), ("fr".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_failed_locale_does_not_stop_others() {
        let (api, synchronizer) = setup().await;
        api.fail_locale("photoz", "fr").await;

        let report = synchronizer
            .remove_translations(
                &AttributeGroup::localized("contact"),
                &locales(&["en", "fr"]),
                &NoopObserver,
            )
            .await;

        assert_eq!(report.failed_locales(), vec!["fr"]);
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.stage, SyncStage::Fetch);

        let en = api.get_localization_texts("photoz", "en").await.unwrap().unwrap();
        assert!(!en.contains_key(HEADER));
    }

    #[tokio::test]
    async fn test_locale_without_table() {
        let (api, synchronizer) = setup().await;

        let report = synchronizer
            .remove_translations(
                &AttributeGroup::localized("contact"),
                &locales(&["en", "de"]),
                &NoopObserver,
            )
            .await;

        assert!(matches!(
            report.outcome("de").unwrap().status,
            LocaleStatus::NoTable
        ));
        assert!(api.list_locales("photoz").await.iter().all(|l| l != "de"));
    }

    #[tokio::test]
    async fn test_literal_group_touches_nothing() {
        let (api, synchronizer) = setup().await;
        let group = AttributeGroup::new("contact")
            .with_display_header(DisplayText::literal("Contact"))
            .with_display_description(DisplayText::literal("How to reach you"));

        let report = synchronizer
            .remove_translations(&group, &locales(&["en", "fr"]), &NoopObserver)
            .await;

        assert!(report
            .outcomes()
            .iter()
            .all(|outcome| matches!(outcome.status, LocaleStatus::Skipped)));
        let stats = api.stats().await;
        assert_eq!(stats.localization_reads, 0);
        assert_eq!(stats.localization_deletes, 0);
    }

    #[tokio::test]
    async fn test_apply_and_restore() {
        let (api, synchronizer) = setup().await;
        let translations = Translations::new(
            "profile.attribute-group.work",
            vec![
                TranslationEntry::new("en", "Work"),
                TranslationEntry::new("fr", "Travail"),
            ],
        );

        let applied = synchronizer.apply_translations(&translations).await;
        assert!(applied.is_complete());
        assert_eq!(applied.changed_count(), 2);

        let removed = synchronizer
            .remove_translations(
                &AttributeGroup::localized("contact"),
                &locales(&["en", "fr"]),
                &NoopObserver,
            )
            .await;
        let restored = synchronizer.restore(&removed).await;
        assert!(restored.is_complete());
        assert_eq!(restored.changed_count(), 4);

        let fr = api.get_localization_texts("photoz", "fr").await.unwrap().unwrap();
        assert_eq!(fr.get(HEADER).map(String::as_str), Some("Contact (fr)"));
        assert_eq!(
            fr.get("profile.attribute-group.work").map(String::as_str),
            Some("Travail")
        );
    }

    #[tokio::test]
    async fn test_apply_reports_failed_locale() {
        let (api, synchronizer) = setup().await;
        api.fail_locale("photoz", "fr").await;

        let report = synchronizer
            .apply_translations(&Translations::new(
                "k",
                vec![TranslationEntry::new("en", "v"), TranslationEntry::new("fr", "v")],
            ))
            .await;

        assert_eq!(report.failed_locales(), vec!["fr"]);
        assert!(matches!(
            report.failures().next().unwrap().stage,
            SyncStage::Write { .. }
        ));
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_keys_already_removed() {
        let (api, synchronizer) = setup().await;
        api.fail_delete("photoz", "fr", DESCRIPTION).await;

        let report = synchronizer
            .remove_translations(
                &AttributeGroup::localized("contact"),
                &locales(&["en", "fr"]),
                &NoopObserver,
            )
            .await;

        let fr = report.outcome("fr").unwrap();
        match &fr.status {
            LocaleStatus::Failed { error, entries } => {
                assert_eq!(
                    error.stage,
                    SyncStage::Delete {
                        key: DESCRIPTION.to_string()
                    }
                );
                assert_eq!(entries.len(), 1);
                assert_eq!(entries.get(HEADER).map(String::as_str), Some("Contact (fr)"));
            }
            other => panic!("unexpected status: {other:?}"),
        }
        assert_eq!(report.changed_count(), 3);

        let restored = synchronizer.restore(&report).await;
        assert!(restored.is_complete());
        let fr_texts = api.get_localization_texts("photoz", "fr").await.unwrap().unwrap();
        assert_eq!(fr_texts.len(), 3);
    }

    #[tokio::test]
    async fn test_revert_deletes_applied_entries() {
        let (api, synchronizer) = setup().await;
        let applied = synchronizer
            .apply_translations(&Translations::new(
                "profile.attribute-group.work",
                vec![
                    TranslationEntry::new("en", "Work"),
                    TranslationEntry::new("fr", "Travail"),
                ],
            ))
            .await;

        let reverted = synchronizer.revert(&applied).await;

        assert_eq!(reverted.operation(), SyncOperation::Revert);
        assert_eq!(reverted.changed_count(), 2);
        for locale in ["en", "fr"] {
            let texts = api
                .get_localization_texts("photoz", locale)
                .await
                .unwrap()
                .unwrap();
            assert!(!texts.contains_key("profile.attribute-group.work"));
            assert!(texts.contains_key(HEADER));
        }
    }
}
