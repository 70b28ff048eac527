//! Confirm-then-execute deletion of attribute groups.
//!
//! Deleting a group touches two resources that share no transaction: the
//! realm's localization texts and its user-profile configuration. The workflow
//! moves through `Idle → ConfirmPending → Executing → Idle`:
//!
//! 1. [`request_delete`](GroupDeletionWorkflow::request_delete) records the
//!    candidate (row action)
//! 2. [`cancel`](GroupDeletionWorkflow::cancel) drops it, or
//!    [`confirm`](GroupDeletionWorkflow::confirm) runs the deletion to completion
//!
//! Execution applies no timeouts of its own. A caller that abandons a running
//! confirmation (by dropping its future) gets the workflow back idle, with
//! whatever translation changes had already been made left in place. The order
//! in which the two resources are updated, and whether removed translations are
//! written back after a failed save, is set by [`DeletionSettings`].

use crate::admin_api::AdminApi;
use crate::config::{DeletionOrdering, DeletionSettings};
use crate::error::{WorkflowError, WorkflowResult};
use crate::notification::SaveMessages;
use crate::profile::{AttributeGroup, UserProfileConfig};
use crate::realm::LocaleSet;
use crate::store::AttributeGroupStore;
use crate::translation::{
    LocalizationObserver, NoopObserver, SyncOperation, SyncReport, TranslationSynchronizer,
};
use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Where the workflow currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletionState {
    Idle,
    ConfirmPending {
        group: AttributeGroup,
    },
    Executing {
        group: AttributeGroup,
        operation_id: Uuid,
    },
}

impl DeletionState {
    fn name(&self) -> &'static str {
        match self {
            DeletionState::Idle => "idle",
            DeletionState::ConfirmPending { .. } => "awaiting confirmation",
            DeletionState::Executing { .. } => "executing",
        }
    }
}

/// A completed deletion.
#[derive(Debug, Clone)]
pub struct DeletionOutcome {
    pub group: AttributeGroup,
    /// Per-locale result of the translation cleanup
    pub translations: SyncReport,
    /// The configuration as saved
    pub config: UserProfileConfig,
    pub operation_id: Uuid,
}

/// Deletes attribute groups of one realm together with their translations.
pub struct GroupDeletionWorkflow<A: AdminApi> {
    executor: DeletionExecutor<A>,
    state: DeletionState,
}

// Everything a running deletion needs, kept apart from the state so the state
// can be guarded while the deletion borrows the rest.
struct DeletionExecutor<A: AdminApi> {
    store: Arc<AttributeGroupStore<A>>,
    synchronizer: TranslationSynchronizer<A>,
    locales: LocaleSet,
    settings: DeletionSettings,
    observer: Arc<dyn LocalizationObserver>,
}

/// Holds the workflow in `Executing` and puts it back to `Idle` when dropped,
/// including when the confirming future is dropped mid-way.
struct ExecutingGuard<'a> {
    state: &'a mut DeletionState,
    finished: bool,
}

impl<'a> ExecutingGuard<'a> {
    fn enter(state: &'a mut DeletionState, group: AttributeGroup, operation_id: Uuid) -> Self {
        *state = DeletionState::Executing {
            group,
            operation_id,
        };
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for ExecutingGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let DeletionState::Executing {
                group,
                operation_id,
            } = &*self.state
            {
                warn!(
                    "Deletion of attribute group '{}' abandoned before completion (operation: '{}')",
                    group.name, operation_id
                );
            }
        }
        *self.state = DeletionState::Idle;
    }
}

impl<A: AdminApi> GroupDeletionWorkflow<A> {
    /// Create a workflow over the store's realm, cleaning up `locales`.
    pub fn new(store: Arc<AttributeGroupStore<A>>, locales: LocaleSet) -> Self {
        let synchronizer = TranslationSynchronizer::new(store.api().clone(), store.realm());
        Self {
            executor: DeletionExecutor {
                store,
                synchronizer,
                locales,
                settings: DeletionSettings::default(),
                observer: Arc::new(NoopObserver),
            },
            state: DeletionState::Idle,
        }
    }

    /// Deletion settings. `restore_translations_on_save_failure` only applies
    /// to [`DeletionOrdering::TranslationsFirst`].
    pub fn with_settings(mut self, settings: DeletionSettings) -> Self {
        self.executor.settings = settings;
        self
    }

    /// Observer notified with each locale's refreshed text table.
    pub fn with_observer(mut self, observer: Arc<dyn LocalizationObserver>) -> Self {
        self.executor.observer = observer;
        self
    }

    pub fn state(&self) -> &DeletionState {
        &self.state
    }

    pub fn settings(&self) -> &DeletionSettings {
        &self.executor.settings
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.executor.locales
    }

    /// The group awaiting confirmation, if any.
    pub fn pending(&self) -> Option<&AttributeGroup> {
        match &self.state {
            DeletionState::ConfirmPending { group } => Some(group),
            _ => None,
        }
    }

    /// Select a group for deletion. Only allowed while idle.
    pub fn request_delete(&mut self, group: AttributeGroup) -> WorkflowResult<()> {
        if self.state != DeletionState::Idle {
            return Err(WorkflowError::Busy {
                state: self.state.name(),
            });
        }
        info!(
            "Deletion of attribute group '{}' in realm '{}' awaiting confirmation",
            group.name,
            self.executor.store.realm()
        );
        self.state = DeletionState::ConfirmPending { group };
        Ok(())
    }

    /// Drop a pending deletion. Returns the group that was pending.
    pub fn cancel(&mut self) -> Option<AttributeGroup> {
        match std::mem::replace(&mut self.state, DeletionState::Idle) {
            DeletionState::ConfirmPending { group } => Some(group),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Run the pending deletion to completion.
    ///
    /// The workflow is back to idle when this returns, whatever the outcome.
    pub async fn confirm(&mut self) -> WorkflowResult<DeletionOutcome> {
        let group = match std::mem::replace(&mut self.state, DeletionState::Idle) {
            DeletionState::ConfirmPending { group } => group,
            other => {
                self.state = other;
                return Err(WorkflowError::NothingToConfirm);
            }
        };

        let operation_id = Uuid::new_v4();
        let guard = ExecutingGuard::enter(&mut self.state, group.clone(), operation_id);
        let result = self.executor.execute(group, operation_id).await;
        guard.finish();
        result
    }
}

impl<A: AdminApi> DeletionExecutor<A> {
    async fn execute(
        &self,
        group: AttributeGroup,
        operation_id: Uuid,
    ) -> WorkflowResult<DeletionOutcome> {
        info!(
            "Deleting attribute group '{}' in realm '{}' ({:?}, operation: '{}')",
            group.name,
            self.store.realm(),
            self.settings.ordering,
            operation_id
        );

        let current = self
            .store
            .current_or_load()
            .await
            .map_err(WorkflowError::Load)?;
        let updated = current.without_group(&group)?;

        match self.settings.ordering {
            DeletionOrdering::TranslationsFirst => {
                self.translations_first(group, updated, operation_id).await
            }
            DeletionOrdering::ConfigFirst => self.config_first(group, updated, operation_id).await,
        }
    }

    async fn translations_first(
        &self,
        group: AttributeGroup,
        updated: UserProfileConfig,
        operation_id: Uuid,
    ) -> WorkflowResult<DeletionOutcome> {
        let translations = self
            .synchronizer
            .remove_translations(&group, &self.locales, self.observer.as_ref())
            .await;

        match self
            .store
            .save(updated.clone(), &SaveMessages::group_deleted())
            .await
        {
            Ok(()) => {
                info!(
                    "Deleted attribute group '{}' (operation: '{}')",
                    group.name, operation_id
                );
                Ok(DeletionOutcome {
                    group,
                    translations,
                    config: updated,
                    operation_id,
                })
            }
            Err(source) => {
                error!(
                    "Error removing translations or updating attributes group '{}' (operation: '{}'): {}",
                    group.name, operation_id, source
                );
                let restored = if self.settings.restore_translations_on_save_failure {
                    Some(self.synchronizer.restore(&translations).await)
                } else {
                    if translations.changed_count() > 0 {
                        warn!(
                            "{} translations of '{}' stay removed although the group was kept",
                            translations.changed_count(),
                            group.name
                        );
                    }
                    None
                };
                Err(WorkflowError::Save {
                    source,
                    translations,
                    restored,
                })
            }
        }
    }

    async fn config_first(
        &self,
        group: AttributeGroup,
        updated: UserProfileConfig,
        operation_id: Uuid,
    ) -> WorkflowResult<DeletionOutcome> {
        if let Err(source) = self
            .store
            .save(updated.clone(), &SaveMessages::group_deleted())
            .await
        {
            error!(
                "Error updating attributes group '{}' (operation: '{}'): {}",
                group.name, operation_id, source
            );
            return Err(WorkflowError::Save {
                source,
                translations: SyncReport::empty(SyncOperation::Remove),
                restored: None,
            });
        }

        let translations = self
            .synchronizer
            .remove_translations(&group, &self.locales, self.observer.as_ref())
            .await;
        if !translations.is_complete() {
            warn!(
                "Attribute group '{}' deleted but translations remain in {:?} (operation: '{}')",
                group.name,
                translations.failed_locales(),
                operation_id
            );
        }

        Ok(DeletionOutcome {
            group,
            translations,
            config: updated,
            operation_id,
        })
    }
}
