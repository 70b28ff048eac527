//! Per-locale results of a translation synchronization.

use crate::admin_api::LocalizationTexts;
use crate::error::LocalizationSyncError;

/// What a synchronization run did to each locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    /// Deleting a group's keys
    Remove,
    /// Writing new translations
    Apply,
    /// Writing back previously removed entries
    Restore,
    /// Deleting entries a previous apply wrote
    Revert,
}

/// Outcome of one locale.
#[derive(Debug, Clone)]
pub enum LocaleStatus {
    /// The locale was synchronized. `entries` are the texts that were removed
    /// (for [`SyncOperation::Remove`] and [`SyncOperation::Revert`]) or written
    /// (otherwise).
    Updated { entries: LocalizationTexts },
    /// The realm has no text table for the locale; nothing was touched.
    NoTable,
    /// There was nothing to do for this locale.
    Skipped,
    /// The locale failed part-way. `entries` holds what was changed before the
    /// failure.
    Failed {
        error: LocalizationSyncError,
        entries: LocalizationTexts,
    },
}

#[derive(Debug, Clone)]
pub struct LocaleOutcome {
    pub locale: String,
    pub status: LocaleStatus,
}

impl LocaleOutcome {
    pub fn new(locale: impl Into<String>, status: LocaleStatus) -> Self {
        Self {
            locale: locale.into(),
            status,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, LocaleStatus::Failed { .. })
    }

    /// Entries changed in this locale, whether or not it completed.
    pub fn entries(&self) -> Option<&LocalizationTexts> {
        match &self.status {
            LocaleStatus::Updated { entries } | LocaleStatus::Failed { entries, .. } => {
                Some(entries)
            }
            LocaleStatus::NoTable | LocaleStatus::Skipped => None,
        }
    }
}

/// Aggregate result of a synchronization, one outcome per locale.
#[derive(Debug, Clone)]
pub struct SyncReport {
    operation: SyncOperation,
    outcomes: Vec<LocaleOutcome>,
}

impl SyncReport {
    pub fn new(operation: SyncOperation, outcomes: Vec<LocaleOutcome>) -> Self {
        Self {
            operation,
            outcomes,
        }
    }

    /// A report for a run that touched no locale.
    pub fn empty(operation: SyncOperation) -> Self {
        Self::new(operation, Vec::new())
    }

    pub fn operation(&self) -> SyncOperation {
        self.operation
    }

    pub fn outcomes(&self) -> &[LocaleOutcome] {
        &self.outcomes
    }

    /// Outcome for a locale.
    pub fn outcome(&self, locale: &str) -> Option<&LocaleOutcome> {
        self.outcomes.iter().find(|outcome| outcome.locale == locale)
    }

    /// True when no locale failed.
    pub fn is_complete(&self) -> bool {
        !self.outcomes.iter().any(LocaleOutcome::is_failure)
    }

    /// Errors of the failed locales.
    pub fn failures(&self) -> impl Iterator<Item = &LocalizationSyncError> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.status {
            LocaleStatus::Failed { error, .. } => Some(error),
            _ => None,
        })
    }

    pub fn failed_locales(&self) -> Vec<&str> {
        self.failures().map(|error| error.locale.as_str()).collect()
    }

    /// Every changed `(locale, key, text)` triple, including those from failed locales.
    pub fn changed_entries(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.outcomes.iter().flat_map(|outcome| {
            outcome.entries().into_iter().flat_map(move |entries| {
                entries
                    .iter()
                    .map(move |(key, text)| (outcome.locale.as_str(), key.as_str(), text.as_str()))
            })
        })
    }

    pub fn changed_count(&self) -> usize {
        self.changed_entries().count()
    }
}
