//! Error types for attribute-group administration.
//!
//! Failures are layered the same way the workflow is:
//!
//! - [`LocalizationSyncError`] - one locale failed to synchronize; recorded in a
//!   report, never propagated
//! - [`SaveError`] - the user-profile configuration could not be persisted
//! - [`RealmLoadError`] - the realm could not be found, fatal to the screen
//! - [`WorkflowError`] - what the deletion workflow hands back to its caller

use crate::admin_api::AdminApiError;
use crate::translation::SyncReport;
use std::fmt;

/// The realm backing the screen could not be loaded.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RealmLoadError {
    #[error("Realm '{realm}' not found")]
    NotFound { realm: String },

    #[error("Failed to look up realm '{realm}': {source}")]
    Lookup {
        realm: String,
        #[source]
        source: AdminApiError,
    },
}

/// Step of a per-locale synchronization that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStage {
    /// Reading the locale's text table
    Fetch,
    /// Deleting one key
    Delete { key: String },
    /// Reading the table back after deletion
    Refetch,
    /// Writing one key
    Write { key: String },
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStage::Fetch => write!(f, "fetch"),
            SyncStage::Delete { key } => write!(f, "delete of '{}'", key),
            SyncStage::Refetch => write!(f, "refetch"),
            SyncStage::Write { key } => write!(f, "write of '{}'", key),
        }
    }
}

/// Synchronizing the translations of a single locale failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Localization sync for locale '{locale}' failed during {stage}: {source}")]
pub struct LocalizationSyncError {
    pub locale: String,
    pub stage: SyncStage,
    #[source]
    pub source: AdminApiError,
}

impl LocalizationSyncError {
    pub fn new(locale: impl Into<String>, stage: SyncStage, source: AdminApiError) -> Self {
        Self {
            locale: locale.into(),
            stage,
            source,
        }
    }
}

/// The user-profile configuration could not be saved.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to save user profile of realm '{realm}' ({message_key}): {source}")]
pub struct SaveError {
    pub realm: String,
    /// Message key shown to the user for this failure
    pub message_key: String,
    #[source]
    pub source: AdminApiError,
}

/// Attribute-group edits that violate configuration rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    #[error("Attribute group name cannot be empty")]
    EmptyName,

    #[error("Attribute group '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Attribute group '{name}' not found")]
    NotFound { name: String },

    #[error("Attribute group '{name}' is still assigned to attributes: {}", .attributes.join(", "))]
    InUse {
        name: String,
        attributes: Vec<String>,
    },
}

/// Errors from editing groups through the store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error("Failed to load user profile: {0}")]
    Load(#[source] AdminApiError),
}

/// Errors returned by the group deletion workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("A deletion is already {state}")]
    Busy { state: &'static str },

    #[error("No deletion is awaiting confirmation")]
    NothingToConfirm,

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error("Failed to load user profile: {0}")]
    Load(#[source] AdminApiError),

    /// The save failed. Translation changes already made are reported, along
    /// with the result of restoring them when restoration is enabled.
    #[error("Failed to delete attribute group")]
    Save {
        #[source]
        source: SaveError,
        translations: SyncReport,
        restored: Option<SyncReport>,
    },
}

/// Result type of the deletion workflow.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Invalid console configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Realm name cannot be empty")]
    EmptyRealm,

    #[error("Fallback locale cannot be empty")]
    EmptyFallbackLocale,

    #[error("Restoring translations after a failed save requires the translationsFirst ordering")]
    RestoreWithoutTranslationsFirst,

    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors opening the attribute-groups screen.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Realm(#[from] RealmLoadError),

    #[error("Failed to load user profile: {0}")]
    Load(#[source] AdminApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
