//! # API Facade
//!
//! [`GramVaultApi`] is the single entry point for UI clients. It owns the
//! [`AppState`] and forwards every call to a function in [`crate::commands`].
//!
//! The facade does two things of its own:
//! - **Id resolution**: users type short id prefixes. Each id is matched against the
//!   records of the relevant kind: an exact match wins, otherwise a prefix shared by
//!   exactly one record resolves to it. A prefix matching several records is an error.
//!   A prefix matching none is passed through unchanged, and the command reports it
//!   as a no-op.
//! - **Defaults**: where an export goes when no path is given.
//!
//! It holds no business logic and does no I/O beyond what the commands do.
//!
//! ## Generic Over StorageBackend
//!
//! - Production: `GramVaultApi<FsBackend>`
//! - Testing: `GramVaultApi<MemBackend>`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::commands::{self, CmdResult};
use crate::confirm::Confirm;
use crate::error::{GramVaultError, Result};
use crate::model::{DaiStatus, NewDaiEntry, NewEntry, Theme, UserUpdate};
use crate::state::AppState;
use crate::store::StorageBackend;

pub use crate::commands::dai::DaiEdit;
pub use crate::commands::entries::{EntryEdit, EntryFilter};
pub use crate::commands::{CmdMessage, MessageLevel, Record};
pub use crate::lifecycle::EntityKind;

pub struct GramVaultApi<B: StorageBackend> {
    state: AppState<B>,
    backup_dir: PathBuf,
}

impl<B: StorageBackend> GramVaultApi<B> {
    pub fn new(state: AppState<B>, backup_dir: PathBuf) -> Self {
        Self { state, backup_dir }
    }

    /// Loads state from `backend` and exports into the working directory.
    pub fn open(backend: B) -> Result<Self> {
        Ok(Self::new(AppState::load(backend)?, PathBuf::from(".")))
    }

    pub fn state(&self) -> &AppState<B> {
        &self.state
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    // --- Entries ---

    pub fn add_entry(&mut self, new_entry: NewEntry) -> Result<CmdResult> {
        commands::entries::add(&mut self.state, new_entry)
    }

    pub fn edit_entry(&mut self, mut edit: EntryEdit) -> Result<CmdResult> {
        edit.id = self.resolve_one(EntityKind::Entry, &edit.id)?;
        commands::entries::edit(&mut self.state, &edit)
    }

    pub fn list_entries(&self, filter: EntryFilter) -> Result<CmdResult> {
        commands::entries::list(&self.state, filter)
    }

    pub fn total(&self) -> Result<CmdResult> {
        commands::entries::total(&self.state)
    }

    // --- Recycle bin ---

    pub fn delete<I: AsRef<str>>(&mut self, kind: EntityKind, ids: &[I]) -> Result<CmdResult> {
        let ids = self.resolve(kind, ids)?;
        commands::trash::delete(&mut self.state, kind, &ids)
    }

    pub fn restore<I: AsRef<str>>(&mut self, kind: EntityKind, ids: &[I]) -> Result<CmdResult> {
        let ids = self.resolve(kind, ids)?;
        commands::trash::restore(&mut self.state, kind, &ids)
    }

    pub fn purge<I: AsRef<str>>(&mut self, kind: EntityKind, ids: &[I]) -> Result<CmdResult> {
        let ids = self.resolve(kind, ids)?;
        commands::trash::purge(&mut self.state, kind, &ids)
    }

    pub fn list_trash(&mut self) -> Result<CmdResult> {
        commands::trash::list(&mut self.state)
    }

    pub fn empty_trash<C: Confirm + ?Sized>(&mut self, confirm: &mut C) -> Result<CmdResult> {
        commands::trash::empty(&mut self.state, confirm)
    }

    // --- Users ---

    pub fn add_user(&mut self, name: &str) -> Result<CmdResult> {
        commands::users::add(&mut self.state, name)
    }

    pub fn list_users(&self) -> Result<CmdResult> {
        commands::users::list(&self.state)
    }

    pub fn select_user(&mut self, id: &str) -> Result<CmdResult> {
        let id = self.resolve_one(EntityKind::User, id)?;
        commands::users::select(&mut self.state, &id)
    }

    pub fn edit_user(&mut self, mut update: UserUpdate) -> Result<CmdResult> {
        update.id = self.resolve_one(EntityKind::User, &update.id)?;
        commands::users::edit(&mut self.state, &update)
    }

    // --- DAI ---

    pub fn add_dai(&mut self, new_entry: NewDaiEntry) -> Result<CmdResult> {
        commands::dai::add(&mut self.state, new_entry)
    }

    pub fn list_dai(&self, status: Option<DaiStatus>) -> Result<CmdResult> {
        commands::dai::list(&self.state, status)
    }

    pub fn set_dai_status(&mut self, id: &str, status: DaiStatus) -> Result<CmdResult> {
        let id = self.resolve_one(EntityKind::Dai, id)?;
        commands::dai::set_status(&mut self.state, &id, status)
    }

    pub fn edit_dai(&mut self, mut edit: DaiEdit) -> Result<CmdResult> {
        edit.id = self.resolve_one(EntityKind::Dai, &edit.id)?;
        commands::dai::edit(&mut self.state, &edit)
    }

    // --- Billing ---

    pub fn bill(&self) -> Result<CmdResult> {
        commands::billing::estimate(&self.state)
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<CmdResult> {
        commands::billing::set_rate(&mut self.state, rate)
    }

    pub fn show_rate(&self) -> Result<CmdResult> {
        commands::billing::show_rate(&self.state)
    }

    // --- Notebook ---

    pub fn add_note(&self, content: &str) -> Result<CmdResult> {
        commands::notebook::add_note(&self.state, content)
    }

    pub fn list_notes(&self) -> Result<CmdResult> {
        commands::notebook::list_notes(&self.state)
    }

    pub fn remove_note(&self, id: &str) -> Result<CmdResult> {
        let notes = self.state.persistence().notes();
        let id = resolve_id(notes.iter().map(|n| n.id.as_str()), id)?;
        commands::notebook::remove_note(&self.state, &id)
    }

    pub fn add_contact(&self, name: &str, number: &str) -> Result<CmdResult> {
        commands::notebook::add_contact(&self.state, name, number)
    }

    pub fn list_contacts(&self) -> Result<CmdResult> {
        commands::notebook::list_contacts(&self.state)
    }

    pub fn remove_contact(&self, id: &str) -> Result<CmdResult> {
        let contacts = self.state.persistence().emergency_contacts();
        let id = resolve_id(contacts.iter().map(|c| c.id.as_str()), id)?;
        commands::notebook::remove_contact(&self.state, &id)
    }

    pub fn add_dai_image(&self, url: &str, title: &str) -> Result<CmdResult> {
        commands::notebook::add_dai_image(&self.state, url, title)
    }

    pub fn list_dai_images(&self) -> Result<CmdResult> {
        commands::notebook::list_dai_images(&self.state)
    }

    // --- Backup ---

    /// Exports to `target`, or to the backup directory when none is given.
    pub fn export_backup(&self, target: Option<&Path>) -> Result<CmdResult> {
        let target = target.unwrap_or(self.backup_dir.as_path());
        commands::backup::export(&self.state, target)
    }

    pub fn import_backup<C: Confirm + ?Sized>(
        &mut self,
        path: &Path,
        confirm: &mut C,
    ) -> Result<CmdResult> {
        commands::backup::import_file(&mut self.state, path, confirm)
    }

    // --- Settings ---

    pub fn show_settings(&self) -> Result<CmdResult> {
        commands::settings::show(&self.state)
    }

    pub fn set_titles(
        &mut self,
        primary: Option<String>,
        secondary: Option<String>,
    ) -> Result<CmdResult> {
        commands::settings::set_titles(&mut self.state, primary, secondary)
    }

    pub fn theme(&mut self, theme: Option<Theme>) -> Result<CmdResult> {
        commands::settings::theme(&mut self.state, theme)
    }

    // --- Id resolution ---

    fn candidate_ids(&self, kind: EntityKind) -> Vec<&str> {
        let state = &self.state;
        let current = state.current_user_id();
        match kind {
            EntityKind::Entry => state
                .entries()
                .iter()
                .filter(|e| e.user_id == current)
                .map(|e| e.id.as_str())
                .collect(),
            EntityKind::User => state.users().iter().map(|u| u.id.as_str()).collect(),
            EntityKind::Dai => state
                .dai_entries()
                .iter()
                .filter(|d| d.belongs_to(current))
                .map(|d| d.id.as_str())
                .collect(),
        }
    }

    fn resolve_one(&self, kind: EntityKind, input: &str) -> Result<String> {
        resolve_id(self.candidate_ids(kind).into_iter(), input)
    }

    /// Resolves every input, dropping repeats while keeping order.
    fn resolve<I: AsRef<str>>(&self, kind: EntityKind, inputs: &[I]) -> Result<Vec<String>> {
        let candidates = self.candidate_ids(kind);
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for input in inputs {
            let id = resolve_id(candidates.iter().copied(), input.as_ref())?;
            if seen.insert(id.clone()) {
                resolved.push(id);
            }
        }
        Ok(resolved)
    }
}

fn resolve_id<'a>(candidates: impl Iterator<Item = &'a str>, input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(GramVaultError::Api("Empty id".to_string()));
    }

    let mut matches: Vec<&str> = Vec::new();
    for candidate in candidates {
        if candidate == input {
            return Ok(input.to_string());
        }
        if candidate.starts_with(input) {
            matches.push(candidate);
        }
    }

    match matches.as_slice() {
        [] => Ok(input.to_string()),
        [only] => Ok(only.to_string()),
        many => Err(GramVaultError::Api(format!(
            "Id prefix '{}' is ambiguous: it matches {} records",
            input,
            many.len()
        ))),
    }
}
