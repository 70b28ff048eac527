//! Abstraction over the external administration API.
//!
//! The attribute-group workflow never talks HTTP itself. Everything it needs from
//! the identity server (realm lookup, user-profile configuration, per-locale
//! localization texts) goes through the [`AdminApi`] trait, so the workflow can run
//! against a real REST client or against [`InMemoryAdminApi`] in tests.
//!
//! # Responsibilities
//!
//! The API layer is responsible for:
//! - Reading and replacing the full user-profile configuration of a realm
//! - Reading, writing and deleting individual localization texts per locale
//! - Realm lookup
//!
//! The API layer is NOT responsible for:
//! - Deriving translation keys from attribute groups
//! - Fanning out over locales or isolating per-locale failures
//! - User-facing notifications
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
//! api.put_localization_text("photoz", "en", "profile.attribute-group.contact", "Contact")
//!     .await?;
//! let texts = api.get_localization_texts("photoz", "en").await?;
//! assert_eq!(texts.unwrap()["profile.attribute-group.contact"], "Contact");
//!
//! api.delete_localization_text("photoz", "en", "profile.attribute-group.contact")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::AdminApiError;
pub use in_memory::{InMemoryAdminApi, InMemoryAdminApiStats};

use crate::profile::UserProfileConfig;
use crate::realm::RealmRepresentation;
use std::collections::BTreeMap;
use std::future::Future;

/// Localization texts of one locale: translation key → text.
pub type LocalizationTexts = BTreeMap<String, String>;

/// Operations the attribute-group workflow consumes from the administration API.
///
/// Implementations map their transport errors onto [`AdminApiError`]. All
/// operations are addressed by realm name; locale-scoped operations additionally
/// take the locale tag (`"en"`, `"fr"`, ...).
pub trait AdminApi: Send + Sync {
    /// Look up a realm.
    ///
    /// # Returns
    /// `Some(realm)` if it exists, `None` otherwise.
    fn find_realm(
        &self,
        realm: &str,
    ) -> impl Future<Output = Result<Option<RealmRepresentation>, AdminApiError>> + Send;

    /// Fetch the full user-profile configuration of a realm.
    fn get_user_profile_config(
        &self,
        realm: &str,
    ) -> impl Future<Output = Result<UserProfileConfig, AdminApiError>> + Send;

    /// Replace the full user-profile configuration of a realm.
    ///
    /// # Behavior
    /// - The whole configuration is written, not a diff
    /// - Last writer wins; there is no version check
    fn save_user_profile_config(
        &self,
        realm: &str,
        config: &UserProfileConfig,
    ) -> impl Future<Output = Result<(), AdminApiError>> + Send;

    /// Fetch the localization texts of one locale.
    ///
    /// # Returns
    /// `Some(texts)` if the realm has a text table for the locale, `None` otherwise.
    fn get_localization_texts(
        &self,
        realm: &str,
        locale: &str,
    ) -> impl Future<Output = Result<Option<LocalizationTexts>, AdminApiError>> + Send;

    /// Store a localization text, replacing any existing text for the key.
    fn put_localization_text(
        &self,
        realm: &str,
        locale: &str,
        key: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), AdminApiError>> + Send;

    /// Delete a localization text.
    ///
    /// Deleting a key that does not exist succeeds.
    fn delete_localization_text(
        &self,
        realm: &str,
        locale: &str,
        key: &str,
    ) -> impl Future<Output = Result<(), AdminApiError>> + Send;
}
