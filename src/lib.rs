//! Administration core for realm user-profile attribute groups.
//!
//! Attribute groups organise the attributes of a realm's user profile. Their
//! display header and description are either literal text or references to
//! localization keys, and deleting a group has to clean those keys up in every
//! locale the realm supports before the updated group list is persisted.
//!
//! # Core Components
//!
//! - [`AttributeGroupStore`] - Cached user-profile configuration and persistence
//! - [`TranslationSynchronizer`] - Per-locale translation cleanup, apply and restore
//! - [`GroupDeletionWorkflow`] - Confirm-then-execute deletion of a group
//! - [`AttributeGroupsTab`] - Screen-level facade wiring the three together
//! - [`AdminApi`] - Trait for the administration API backend
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use realm_profile_admin::{AdminConsoleConfig, AttributeGroupsTab, InMemoryAdminApi};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(InMemoryAdminApi::new());
//! let mut tab = AttributeGroupsTab::open(api, &AdminConsoleConfig::new("photoz")).await?;
//!
//! if let Some(group) = tab.loader().await.pop() {
//!     tab.delete(group)?;
//!     let outcome = tab.confirm_delete().await?;
//!     println!("{} translations removed", outcome.translations.changed_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod admin_api;
pub mod config;
pub mod console;
pub mod error;
pub mod notification;
pub mod profile;
pub mod realm;
pub mod store;
pub mod translation;
pub mod workflow;

// Re-export commonly used types for convenience
pub use admin_api::{AdminApi, AdminApiError, InMemoryAdminApi, LocalizationTexts};
pub use config::{AdminConsoleConfig, DeletionOrdering, DeletionSettings};
pub use console::{AttributeGroupsTab, GroupDraft};
pub use error::{
    ConsoleError, GroupError, LocalizationSyncError, RealmLoadError, SaveError, StoreError,
    WorkflowError, WorkflowResult,
};
pub use profile::{AttributeGroup, DisplayText, UserProfileConfig};
pub use realm::{LocaleSet, RealmRepresentation};
pub use store::AttributeGroupStore;
pub use translation::{LocalizationObserver, SyncReport, TranslationSynchronizer};
pub use workflow::{DeletionOutcome, DeletionState, GroupDeletionWorkflow};

// Account console types
pub use account::{AccountConsole, AccountDirectory, AccountError, AccountPage};
