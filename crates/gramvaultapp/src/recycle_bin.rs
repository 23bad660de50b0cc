//! # Recycle Bin
//!
//! [`RecycleBin`] composes the three trashable collections of an [`AppState`] behind one
//! interface, so trash counts and "empty trash" are computed in exactly one place.
//!
//! ## Scope
//!
//! Entries and DAI entries are counted and emptied for the current user only. Users are
//! global: every trashed user counts, and emptying the bin purges all of them.
//!
//! ## Confirmation
//!
//! `delete`, `restore` and `purge` of a single record act immediately. `empty` is the
//! only operation that asks, once, through a [`Confirm`] gate, and it does not ask at all
//! when the bin is already empty.
//!
//! ## Users
//!
//! The last active user cannot be trashed. When the current user is trashed or purged,
//! the selection moves to the first active user.
//!
//! Purging a user does not touch the entries it owned; they stay in storage unowned and
//! are still carried by backups.

use crate::confirm::{Confirm, Prompt};
use crate::error::{GramVaultError, Result};
use crate::lifecycle::{delete_by_id, purge_by_id, purge_trashed, restore_by_id, EntityKind};
use crate::model::View;
use crate::state::AppState;
use crate::store::StorageBackend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrashSummary {
    pub entries: usize,
    pub users: usize,
    pub dai_entries: usize,
}

impl TrashSummary {
    pub fn total(&self) -> usize {
        self.entries + self.users + self.dai_entries
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyTrashOutcome {
    AlreadyEmpty,
    Declined,
    Emptied(TrashSummary),
}

pub struct RecycleBin<'a, B: StorageBackend> {
    state: &'a mut AppState<B>,
}

impl<'a, B: StorageBackend> RecycleBin<'a, B> {
    pub fn new(state: &'a mut AppState<B>) -> Self {
        Self { state }
    }

    pub fn summary(&self) -> TrashSummary {
        summary(self.state)
    }

    /// Active → Trashed. Returns whether anything changed.
    pub fn delete(&mut self, kind: EntityKind, id: &str) -> Result<bool> {
        match kind {
            EntityKind::Entry => {
                let changed = delete_by_id(self.state.entries_mut(), id);
                if changed {
                    self.state.persist_entries()?;
                }
                Ok(changed)
            }
            EntityKind::User => {
                let is_active_user = self
                    .state
                    .find_user(id)
                    .is_some_and(|u| !u.is_deleted());
                if is_active_user && self.state.active_users().len() == 1 {
                    return Err(GramVaultError::Api(
                        "Cannot delete the only remaining user".to_string(),
                    ));
                }
                let changed = delete_by_id(self.state.users_mut(), id);
                if changed {
                    self.state.normalize_current_user();
                    self.state.persist_users()?;
                }
                Ok(changed)
            }
            EntityKind::Dai => {
                let changed = delete_by_id(self.state.dai_entries_mut(), id);
                if changed {
                    self.state.persist_dai_entries()?;
                }
                Ok(changed)
            }
        }
    }

    /// Trashed → Active (DAI entries come back as `waiting`).
    pub fn restore(&mut self, kind: EntityKind, id: &str) -> Result<bool> {
        match kind {
            EntityKind::Entry => {
                let changed = restore_by_id(self.state.entries_mut(), id);
                if changed {
                    self.state.persist_entries()?;
                }
                Ok(changed)
            }
            EntityKind::User => {
                let changed = restore_by_id(self.state.users_mut(), id);
                if changed {
                    self.state.persist_users()?;
                }
                Ok(changed)
            }
            EntityKind::Dai => {
                let changed = restore_by_id(self.state.dai_entries_mut(), id);
                if changed {
                    self.state.persist_dai_entries()?;
                }
                Ok(changed)
            }
        }
    }

    /// Trashed → gone. Ids that are absent or not trashed are left alone.
    pub fn purge(&mut self, kind: EntityKind, id: &str) -> Result<bool> {
        match kind {
            EntityKind::Entry => {
                let changed = purge_by_id(self.state.entries_mut(), id);
                if changed {
                    self.state.persist_entries()?;
                }
                Ok(changed)
            }
            EntityKind::User => {
                let changed = purge_by_id(self.state.users_mut(), id);
                if changed {
                    self.state.normalize_current_user();
                    self.state.persist_users()?;
                }
                Ok(changed)
            }
            EntityKind::Dai => {
                let changed = purge_by_id(self.state.dai_entries_mut(), id);
                if changed {
                    self.state.persist_dai_entries()?;
                }
                Ok(changed)
            }
        }
    }

    /// Purges everything in the bin after one confirmation.
    pub fn empty<C: Confirm + ?Sized>(&mut self, confirm: &mut C) -> Result<EmptyTrashOutcome> {
        // Decide on the state before anything is cleared.
        let before = self.summary();
        if before.is_empty() {
            return Ok(EmptyTrashOutcome::AlreadyEmpty);
        }

        let prompt = Prompt::new("Permanently delete everything in the recycle bin?")
            .with_detail(format!("{} entries", before.entries))
            .with_detail(format!("{} users", before.users))
            .with_detail(format!("{} DAI entries", before.dai_entries))
            .with_detail("This cannot be undone.");
        if !confirm.confirm(&prompt) {
            return Ok(EmptyTrashOutcome::Declined);
        }

        let current = self.state.current_user_id().to_string();
        let removed = TrashSummary {
            entries: purge_trashed(self.state.entries_mut(), |e| e.user_id == current),
            dai_entries: purge_trashed(self.state.dai_entries_mut(), |d| d.belongs_to(&current)),
            users: purge_trashed(self.state.users_mut(), |_| true),
        };
        log::info!(
            "emptied recycle bin: {} entries, {} users, {} DAI entries",
            removed.entries,
            removed.users,
            removed.dai_entries
        );

        self.state.persist_entries()?;
        self.state.persist_dai_entries()?;
        self.state.normalize_current_user();
        self.state.persist_users()?;

        if self.state.view() == View::Trash && self.summary().is_empty() {
            self.state.set_view(View::List);
        }
        Ok(EmptyTrashOutcome::Emptied(removed))
    }
}

pub fn summary<B: StorageBackend>(state: &AppState<B>) -> TrashSummary {
    TrashSummary {
        entries: state.trashed_entries().len(),
        users: state.trashed_users().len(),
        dai_entries: state.trashed_dai_entries().len(),
    }
}
