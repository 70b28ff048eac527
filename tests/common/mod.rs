//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use realm_profile_admin::admin_api::{AdminApi, InMemoryAdminApi, LocalizationTexts};
use realm_profile_admin::config::AdminConsoleConfig;
use realm_profile_admin::console::AttributeGroupsTab;
use realm_profile_admin::notification::RecordingNotifier;
use realm_profile_admin::profile::{AttributeGroup, DisplayText, UserProfileConfig};
use realm_profile_admin::realm::RealmRepresentation;
use realm_profile_admin::translation::LocalizationObserver;
use serde_json::json;
use std::sync::{Arc, Mutex};

pub const REALM: &str = "photoz";
pub const LOCALES: [&str; 3] = ["en", "fr", "de"];

pub const CONTACT_HEADER: &str = "profile.attribute-group.contact";
pub const CONTACT_DESCRIPTION: &str = "profile.attribute-group-description.contact";
pub const UNRELATED_KEY: &str = "profile.attribute.nickname";

/// Literal group whose header happens to look like a generated key's text.
pub fn literal_group() -> AttributeGroup {
    AttributeGroup::new("user-metadata")
        .with_display_header(DisplayText::literal("User metadata"))
        .with_display_description(DisplayText::literal("Attributes, which refer to user metadata"))
}

pub fn contact_group() -> AttributeGroup {
    AttributeGroup::localized("contact")
}

pub fn work_group() -> AttributeGroup {
    AttributeGroup::new("work").with_display_header(DisplayText::reference("work.header"))
}

pub fn profile_config() -> UserProfileConfig {
    let mut config =
        UserProfileConfig::with_groups(vec![literal_group(), contact_group(), work_group()]);
    config.attributes = vec![
        json!({"name": "username"}),
        json!({"name": "employer", "group": "work"}),
        json!({"name": "job-title", "group": "work"}),
    ];
    config
}

/// Realm `photoz` with locales en, fr and de, the three fixture groups, and
/// texts for every group key plus one unrelated key in every locale.
pub async fn seeded_api() -> Arc<InMemoryAdminApi> {
    let api = Arc::new(InMemoryAdminApi::new());
    api.add_realm(RealmRepresentation::new(REALM).with_locales("en", LOCALES))
        .await;
    api.set_user_profile_config(REALM, &profile_config())
        .await
        .unwrap();

    for locale in LOCALES {
        api.seed_localization_texts(
            REALM,
            locale,
            [
                (CONTACT_HEADER, format!("Contact ({})", locale)),
                (CONTACT_DESCRIPTION, format!("How to reach you ({})", locale)),
                ("work.header", format!("Work ({})", locale)),
                (UNRELATED_KEY, format!("Nickname ({})", locale)),
            ],
        )
        .await
        .unwrap();
    }
    api
}

pub async fn texts(api: &InMemoryAdminApi, locale: &str) -> LocalizationTexts {
    api.get_localization_texts(REALM, locale)
        .await
        .unwrap()
        .unwrap_or_default()
}

/// Route library logs to the test output, once per test binary.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub async fn open_tab(
    api: Arc<InMemoryAdminApi>,
    config: &AdminConsoleConfig,
) -> (AttributeGroupsTab<InMemoryAdminApi>, RecordingNotifier, RecordingObserver) {
    init_logging();
    let notifier = RecordingNotifier::new();
    let observer = RecordingObserver::default();
    let tab = AttributeGroupsTab::open_with(
        api,
        config,
        Arc::new(notifier.clone()),
        Arc::new(observer.clone()),
    )
    .await
    .unwrap();
    (tab, notifier, observer)
}

/// Observer that keeps every refreshed table it is handed.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    updates: Arc<Mutex<Vec<(String, LocalizationTexts)>>>,
}

impl RecordingObserver {
    pub fn updates(&self) -> Vec<(String, LocalizationTexts)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.updates().into_iter().map(|(l, _)| l).collect();
        locales.sort();
        locales
    }
}

impl LocalizationObserver for RecordingObserver {
    fn localization_updated(&self, locale: &str, texts: &LocalizationTexts) {
        self.updates
            .lock()
            .unwrap()
            .push((locale.to_string(), texts.clone()));
    }
}
