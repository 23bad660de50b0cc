//! # Domain State Store
//!
//! [`AppState`] is the in-memory copy of everything the user works with: settings,
//! theme, users and the current selection, inventory entries, DAI entries, the current
//! view and the current user's billing rate.
//!
//! ## Write-through
//!
//! Every mutation updates the in-memory collection and immediately saves it through
//! [`Persistence`] before returning. Users, settings and the current user id are always
//! saved together. There is no transaction around these writes: a failing backend can
//! leave some of them written and others not, and the error is returned to the caller.
//!
//! ## Derived views
//!
//! Filtered and sorted lists (`active_entries`, `trashed_entries`, `total_weight`, …)
//! are recomputed on every call and never stored.
//!
//! ## The current user
//!
//! There is always at least one user: an empty store is seeded with the default user.
//! The current selection is kept pointing at a user that exists and is not trashed;
//! when it cannot be (the selected user went to the trash), it falls back to the first
//! active user, then to `users[0]`.

use crate::config::load_settings;
use crate::error::{GramVaultError, Result};
use crate::model::{
    AppSettings, DaiEntry, DaiStatus, InventoryEntry, NewDaiEntry, NewEntry, Theme, User,
    UserUpdate, View,
};
use crate::natural::natural_cmp;
use crate::store::{Persistence, StorageBackend};

pub struct AppState<B: StorageBackend> {
    persistence: Persistence<B>,
    settings: AppSettings,
    theme: Theme,
    users: Vec<User>,
    current_user_id: String,
    entries: Vec<InventoryEntry>,
    dai_entries: Vec<DaiEntry>,
    view: View,
    billing_rate: f64,
}

impl<B: StorageBackend> AppState<B> {
    /// Startup load. Runs settings migrations, which may write.
    pub fn load(backend: B) -> Result<Self> {
        let mut state = Self {
            persistence: Persistence::new(backend),
            settings: AppSettings::default(),
            theme: Theme::default(),
            users: Vec::new(),
            current_user_id: String::new(),
            entries: Vec::new(),
            dai_entries: Vec::new(),
            view: View::default(),
            billing_rate: 0.0,
        };
        state.reload()?;
        Ok(state)
    }

    /// Re-reads every collection from storage. The current view is kept.
    pub fn reload(&mut self) -> Result<()> {
        self.settings = load_settings(&self.persistence)?;
        self.theme = self.persistence.theme();
        self.users = self
            .persistence
            .users()
            .unwrap_or_else(|| vec![User::default_user()]);
        self.current_user_id = self
            .persistence
            .current_user_id()
            .unwrap_or_else(|| self.users[0].id.clone());
        self.entries = self.persistence.entries();
        self.dai_entries = self.persistence.dai_entries();
        self.normalize_current_user();
        self.billing_rate = self.persistence.billing_rate(&self.current_user_id);
        Ok(())
    }

    pub fn persistence(&self) -> &Persistence<B> {
        &self.persistence
    }

    // --- Plain accessors ---

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub fn dai_entries(&self) -> &[DaiEntry] {
        &self.dai_entries
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn billing_rate(&self) -> f64 {
        self.billing_rate
    }

    pub fn current_user_id(&self) -> &str {
        &self.current_user_id
    }

    pub fn active_user(&self) -> &User {
        self.users
            .iter()
            .find(|u| u.id == self.current_user_id && !u.is_deleted())
            .or_else(|| self.users.iter().find(|u| !u.is_deleted()))
            .unwrap_or(&self.users[0])
    }

    pub fn find_entry(&self, id: &str) -> Option<&InventoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_dai_entry(&self, id: &str) -> Option<&DaiEntry> {
        self.dai_entries.iter().find(|d| d.id == id)
    }

    // --- Derived views ---

    /// The current user's live entries, in numeric-aware invoice order.
    pub fn active_entries(&self) -> Vec<&InventoryEntry> {
        let mut active: Vec<&InventoryEntry> = self
            .entries
            .iter()
            .filter(|e| e.user_id == self.current_user_id && !e.is_deleted)
            .collect();
        active.sort_by(|a, b| natural_cmp(&a.invoice_number, &b.invoice_number));
        active
    }

    pub fn trashed_entries(&self) -> Vec<&InventoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.user_id == self.current_user_id && e.is_deleted)
            .collect()
    }

    pub fn active_users(&self) -> Vec<&User> {
        self.users.iter().filter(|u| !u.is_deleted()).collect()
    }

    pub fn trashed_users(&self) -> Vec<&User> {
        self.users.iter().filter(|u| u.is_deleted()).collect()
    }

    /// The current user's DAI entries outside the trash, newest first.
    pub fn active_dai_entries(&self) -> Vec<&DaiEntry> {
        self.dai_entries
            .iter()
            .filter(|d| d.status != DaiStatus::Trash && d.belongs_to(&self.current_user_id))
            .collect()
    }

    pub fn dai_entries_with_status(&self, status: DaiStatus) -> Vec<&DaiEntry> {
        self.dai_entries
            .iter()
            .filter(|d| d.status == status && d.belongs_to(&self.current_user_id))
            .collect()
    }

    pub fn trashed_dai_entries(&self) -> Vec<&DaiEntry> {
        self.dai_entries_with_status(DaiStatus::Trash)
    }

    pub fn total_weight(&self) -> f64 {
        self.active_entries().iter().map(|e| e.weight).sum()
    }

    /// Total weight with exactly one decimal digit, e.g. `"4.0"`.
    pub fn formatted_total_weight(&self) -> String {
        format_weight(self.total_weight())
    }

    // --- Entry mutations ---

    /// Stores a new entry at the front of the collection and switches to the list view.
    pub fn add_entry(&mut self, new_entry: NewEntry) -> Result<InventoryEntry> {
        let entry = new_entry.into_entry();
        self.entries.insert(0, entry.clone());
        self.persistence.save_entries(&self.entries)?;
        self.view = View::List;
        Ok(entry)
    }

    /// Replaces the entry with the same id. Owner, creation time and deleted flag are
    /// kept from the stored entry. Returns false when the id is unknown.
    pub fn update_entry(&mut self, updated: InventoryEntry) -> Result<bool> {
        let Some(slot) = self.entries.iter_mut().find(|e| e.id == updated.id) else {
            return Ok(false);
        };
        *slot = InventoryEntry {
            user_id: slot.user_id.clone(),
            created_at: slot.created_at,
            is_deleted: slot.is_deleted,
            ..updated
        };
        self.persistence.save_entries(&self.entries)?;
        Ok(true)
    }

    // --- User mutations ---

    /// Appends a user and makes it the current one.
    pub fn add_user(&mut self, name: impl Into<String>) -> Result<User> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GramVaultError::Api("User name cannot be empty".to_string()));
        }
        let user = User::new(name.trim());
        self.users.push(user.clone());
        self.current_user_id = user.id.clone();
        self.billing_rate = self.persistence.billing_rate(&user.id);
        self.persist_users()?;
        Ok(user)
    }

    /// Applies the fields present in `update`. Returns false when the id is unknown.
    pub fn update_user(&mut self, update: &UserUpdate) -> Result<bool> {
        let Some(user) = self.users.iter_mut().find(|u| u.id == update.id) else {
            return Ok(false);
        };
        user.apply(update);
        self.persist_users()?;
        Ok(true)
    }

    /// Switches the current user. Unknown or trashed ids are ignored.
    pub fn select_user(&mut self, id: &str) -> Result<bool> {
        let selectable = self.users.iter().any(|u| u.id == id && !u.is_deleted());
        if !selectable {
            return Ok(false);
        }
        self.current_user_id = id.to_string();
        self.billing_rate = self.persistence.billing_rate(id);
        self.persist_users()?;
        Ok(true)
    }

    // --- Settings ---

    pub fn update_settings(&mut self, primary_title: String, secondary_title: String) -> Result<()> {
        self.settings.primary_title = primary_title;
        self.settings.secondary_title = secondary_title;
        self.persist_users()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        self.persistence.save_theme(theme)
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn save_billing_rate(&mut self, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(GramVaultError::Api(format!("Invalid billing rate: {}", rate)));
        }
        self.persistence
            .save_billing_rate(&self.current_user_id, rate)?;
        self.billing_rate = rate;
        Ok(())
    }

    // --- DAI mutations ---

    pub fn add_dai_entry(&mut self, new_entry: NewDaiEntry) -> Result<DaiEntry> {
        if new_entry.di_number.trim().is_empty() {
            return Err(GramVaultError::Api("DI number cannot be empty".to_string()));
        }
        let entry = new_entry.into_entry(&self.current_user_id);
        self.dai_entries.insert(0, entry.clone());
        self.persistence.save_dai_entries(&self.dai_entries)?;
        Ok(entry)
    }

    /// Moves a DAI entry between `waiting`, `out` and `in`. Trashed or unknown entries
    /// are left alone and report false.
    pub fn set_dai_status(&mut self, id: &str, status: DaiStatus) -> Result<bool> {
        if status == DaiStatus::Trash {
            return Err(GramVaultError::Api(
                "Use delete to move a DAI entry to the trash".to_string(),
            ));
        }
        let Some(entry) = self
            .dai_entries
            .iter_mut()
            .find(|d| d.id == id && d.status != DaiStatus::Trash)
        else {
            return Ok(false);
        };
        entry.status = status;
        self.persistence.save_dai_entries(&self.dai_entries)?;
        Ok(true)
    }

    /// Replaces a DAI entry's details. Status, owner and creation time are kept.
    pub fn update_dai_entry(&mut self, updated: DaiEntry) -> Result<bool> {
        let Some(slot) = self.dai_entries.iter_mut().find(|d| d.id == updated.id) else {
            return Ok(false);
        };
        *slot = DaiEntry {
            status: slot.status,
            user_id: slot.user_id.clone(),
            created_at: slot.created_at,
            ..updated
        };
        self.persistence.save_dai_entries(&self.dai_entries)?;
        Ok(true)
    }

    // --- Crate-internal access for the recycle bin ---

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<InventoryEntry> {
        &mut self.entries
    }

    pub(crate) fn users_mut(&mut self) -> &mut Vec<User> {
        &mut self.users
    }

    pub(crate) fn dai_entries_mut(&mut self) -> &mut Vec<DaiEntry> {
        &mut self.dai_entries
    }

    pub(crate) fn persist_entries(&self) -> Result<()> {
        self.persistence.save_entries(&self.entries)
    }

    pub(crate) fn persist_dai_entries(&self) -> Result<()> {
        self.persistence.save_dai_entries(&self.dai_entries)
    }

    /// Saves users, settings and the current user id together.
    pub(crate) fn persist_users(&self) -> Result<()> {
        self.persistence.save_settings(&self.settings)?;
        self.persistence.save_users(&self.users)?;
        self.persistence.save_current_user_id(&self.current_user_id)
    }

    /// Points the selection back at a live user after users changed.
    pub(crate) fn normalize_current_user(&mut self) {
        if self.users.is_empty() {
            self.users.push(User::default_user());
        }
        let id = self.active_user().id.clone();
        if id != self.current_user_id {
            log::debug!("current user {} unavailable, switching to {}", self.current_user_id, id);
            self.billing_rate = self.persistence.billing_rate(&id);
            self.current_user_id = id;
        }
    }
}

pub fn format_weight(grams: f64) -> String {
    format!("{:.1}", grams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_USER_ID;
    use crate::store::mem_backend::MemBackend;
    use crate::store::persistence::keys;

    fn state() -> AppState<MemBackend> {
        AppState::load(MemBackend::new()).unwrap()
    }

    fn add(state: &mut AppState<MemBackend>, invoice: &str, weight: f64) -> InventoryEntry {
        let user = state.current_user_id().to_string();
        state
            .add_entry(NewEntry::new(user, invoice, weight, "item"))
            .unwrap()
    }

    #[test]
    fn empty_store_seeds_default_user() {
        let state = state();
        assert_eq!(state.users().len(), 1);
        assert_eq!(state.current_user_id(), DEFAULT_USER_ID);
        assert_eq!(state.active_user().name, "Master User");
        assert_eq!(state.view(), View::Form);
        assert_eq!(state.settings().primary_title, "PRO JEWELLERY");
    }

    #[test]
    fn add_entry_prepends_persists_and_switches_view() {
        let mut state = state();
        let first = add(&mut state, "INV-1", 1.0);
        let second = add(&mut state, "INV-2", 2.0);

        assert_eq!(state.entries()[0].id, second.id);
        assert_eq!(state.entries()[1].id, first.id);
        assert!(!second.is_deleted);
        assert_eq!(state.view(), View::List);
        assert_eq!(state.persistence().entries().len(), 2);
    }

    #[test]
    fn active_entries_sort_numerically() {
        let mut state = state();
        add(&mut state, "INV-2", 1.0);
        add(&mut state, "INV-10", 1.0);
        add(&mut state, "INV-1", 1.0);

        let invoices: Vec<&str> = state
            .active_entries()
            .iter()
            .map(|e| e.invoice_number.as_str())
            .collect();
        assert_eq!(invoices, vec!["INV-1", "INV-2", "INV-10"]);
    }

    #[test]
    fn total_weight_counts_only_current_live_entries() {
        let mut state = state();
        add(&mut state, "INV-1", 1.25);
        add(&mut state, "INV-2", 2.75);
        add(&mut state, "INV-3", 0.0);

        let trashed = add(&mut state, "INV-4", 100.0);
        state.entries_mut()[0].is_deleted = true;
        assert_eq!(state.entries()[0].id, trashed.id);

        state
            .add_entry(NewEntry::new("someone-else", "INV-5", 50.0, "x"))
            .unwrap();

        assert_eq!(state.total_weight(), 4.0);
        assert_eq!(state.formatted_total_weight(), "4.0");
        assert_eq!(state.trashed_entries().len(), 1);
    }

    #[test]
    fn weight_formats_with_one_decimal() {
        assert_eq!(format_weight(0.0), "0.0");
        assert_eq!(format_weight(12.34), "12.3");
        assert_eq!(format_weight(7.0), "7.0");
    }

    #[test]
    fn update_entry_replaces_by_id_and_keeps_owner() {
        let mut state = state();
        let entry = add(&mut state, "INV-1", 1.0);

        let mut edited = entry.clone();
        edited.weight = 9.5;
        edited.description = "Resized".into();
        edited.user_id = "intruder".into();
        assert!(state.update_entry(edited).unwrap());

        let stored = state.find_entry(&entry.id).unwrap();
        assert_eq!(stored.weight, 9.5);
        assert_eq!(stored.description, "Resized");
        assert_eq!(stored.user_id, DEFAULT_USER_ID);
        assert_eq!(state.persistence().entries()[0].weight, 9.5);
    }

    #[test]
    fn update_unknown_entry_is_noop() {
        let mut state = state();
        add(&mut state, "INV-1", 1.0);
        let ghost = NewEntry::new("default", "INV-9", 9.0, "ghost").into_entry();
        assert!(!state.update_entry(ghost).unwrap());
        assert_eq!(state.entries().len(), 1);
    }

    #[test]
    fn add_user_switches_selection_and_persists_triple() {
        let mut state = state();
        let user = state.add_user("Ravi").unwrap();

        assert_eq!(state.users().len(), 2);
        assert_eq!(state.current_user_id(), user.id);
        let p = state.persistence();
        assert_eq!(p.users().unwrap().len(), 2);
        assert_eq!(p.current_user_id().unwrap(), user.id);
        assert!(p.settings().is_some());
    }

    #[test]
    fn entries_are_scoped_to_current_user() {
        let mut state = state();
        add(&mut state, "INV-1", 1.0);
        state.add_user("Ravi").unwrap();
        assert!(state.active_entries().is_empty());
        add(&mut state, "INV-7", 7.0);
        assert_eq!(state.total_weight(), 7.0);

        assert!(state.select_user(DEFAULT_USER_ID).unwrap());
        assert_eq!(state.total_weight(), 1.0);
    }

    #[test]
    fn update_user_preserves_untouched_fields() {
        let mut state = state();
        let user = state.add_user("Ravi").unwrap();
        let update = UserUpdate {
            phone: Some("98400".into()),
            ..UserUpdate::new(user.id.clone())
        };
        assert!(state.update_user(&update).unwrap());
        let update = UserUpdate {
            email: Some("ravi@example.com".into()),
            ..UserUpdate::new(user.id.clone())
        };
        assert!(state.update_user(&update).unwrap());

        let stored = state.find_user(&user.id).unwrap();
        assert_eq!(stored.name, "Ravi");
        assert_eq!(stored.phone.as_deref(), Some("98400"));
        assert_eq!(stored.email.as_deref(), Some("ravi@example.com"));
        assert!(!state.update_user(&UserUpdate::new("nobody")).unwrap());
    }

    #[test]
    fn select_unknown_user_is_ignored() {
        let mut state = state();
        assert!(!state.select_user("nobody").unwrap());
        assert_eq!(state.current_user_id(), DEFAULT_USER_ID);
    }

    #[test]
    fn billing_rate_follows_current_user() {
        let mut state = state();
        state.save_billing_rate(6400.0).unwrap();
        state.add_user("Ravi").unwrap();
        assert_eq!(state.billing_rate(), 0.0);
        state.save_billing_rate(6100.0).unwrap();
        state.select_user(DEFAULT_USER_ID).unwrap();
        assert_eq!(state.billing_rate(), 6400.0);
        assert!(state.save_billing_rate(-1.0).is_err());
    }

    #[test]
    fn reload_restores_everything_saved() {
        let mut state = state();
        let ravi = state.add_user("Ravi").unwrap();
        add(&mut state, "INV-3", 3.0);
        state.set_theme(Theme::Dark).unwrap();
        state
            .update_settings("GOLD HOUSE".into(), "Ledger".into())
            .unwrap();

        let backend = MemBackend::new();
        for key in state.persistence().backend().keys().unwrap() {
            let value = state.persistence().backend().get_item(&key).unwrap().unwrap();
            backend.put_raw(&key, &value);
        }
        let reloaded = AppState::load(backend).unwrap();
        assert_eq!(reloaded.current_user_id(), ravi.id);
        assert_eq!(reloaded.theme(), Theme::Dark);
        assert_eq!(reloaded.settings().primary_title, "GOLD HOUSE");
        assert_eq!(reloaded.total_weight(), 3.0);
    }

    #[test]
    fn stale_current_user_falls_back_to_first_active() {
        let backend = MemBackend::new();
        backend.put_raw(keys::USERS, r#"[{"id":"a","name":"A","isDeleted":true},{"id":"b","name":"B"}]"#);
        backend.put_raw(keys::CURRENT_USER_ID, "gone");
        let state = AppState::load(backend).unwrap();
        assert_eq!(state.current_user_id(), "b");
        assert_eq!(state.active_user().name, "B");
    }

    #[test]
    fn legacy_settings_are_migrated_on_load() {
        let backend = MemBackend::new();
        backend.put_raw(keys::SETTINGS, r#"{"primaryTitle":"PRECISION","secondaryTitle":"Gram Tracker Pro"}"#);
        let state = AppState::load(backend).unwrap();
        assert_eq!(state.settings().primary_title, "PRO JEWELLERY");
        assert_eq!(
            state.persistence().settings().unwrap().primary_title,
            "PRO JEWELLERY"
        );
    }

    #[test]
    fn dai_status_workflow() {
        let mut state = state();
        let dai = state
            .add_dai_entry(NewDaiEntry::new("DI-1", "2024-03-01", "Bangles"))
            .unwrap();
        assert_eq!(dai.status, DaiStatus::Waiting);

        assert!(state.set_dai_status(&dai.id, DaiStatus::Out).unwrap());
        assert_eq!(state.dai_entries_with_status(DaiStatus::Out).len(), 1);
        assert!(state.set_dai_status(&dai.id, DaiStatus::In).unwrap());
        assert_eq!(state.find_dai_entry(&dai.id).unwrap().status, DaiStatus::In);
        assert!(state.set_dai_status(&dai.id, DaiStatus::Trash).is_err());
        assert!(!state.set_dai_status("missing", DaiStatus::Out).unwrap());
        assert_eq!(state.persistence().dai_entries()[0].status, DaiStatus::In);
    }

    #[test]
    fn dai_entries_are_scoped_but_legacy_ones_are_shared() {
        let mut state = state();
        state
            .add_dai_entry(NewDaiEntry::new("DI-1", "2024-03-01", "mine"))
            .unwrap();
        let mut legacy = NewDaiEntry::new("DI-0", "2023-01-01", "old").into_entry("x");
        legacy.user_id = None;
        state.dai_entries_mut().push(legacy);

        state.add_user("Ravi").unwrap();
        let visible: Vec<&str> = state
            .active_dai_entries()
            .iter()
            .map(|d| d.di_number.as_str())
            .collect();
        assert_eq!(visible, vec!["DI-0"]);
    }

    #[test]
    fn fractional_quantity_survives_load_and_write() {
        let backend = MemBackend::new();
        backend.put_raw(
            keys::ENTRIES,
            r#"[{"id":"e1","userId":"default","invoiceNumber":"INV-1","weight":1.0,"quantity":1.5,"createdAt":1,"isDeleted":false},
                {"id":"e2","userId":"default","invoiceNumber":"INV-2","weight":2.0,"quantity":-1,"createdAt":2,"isDeleted":false}]"#,
        );
        let mut state = AppState::load(backend).unwrap();
        assert_eq!(state.entries().len(), 2);
        assert_eq!(state.find_entry("e1").unwrap().quantity, Some(1.5));

        add(&mut state, "INV-3", 3.0);
        let stored = state.persistence().entries();
        assert_eq!(stored.len(), 3);
        assert!(stored.iter().any(|e| e.id == "e1" && e.quantity == Some(1.5)));
        assert!(stored.iter().any(|e| e.id == "e2" && e.quantity == Some(-1.0)));
    }

    #[test]
    fn write_failure_is_reported() {
        let mut state = state();
        state.persistence().backend().set_simulate_write_error(true);
        assert!(state
            .add_entry(NewEntry::new("default", "INV-1", 1.0, "x"))
            .is_err());
    }
}
