//! # Entity Lifecycle
//!
//! Entries, users and DAI entries share one lifecycle:
//!
//! ```text
//!   Active ──delete──▶ Trashed ──purge──▶ (gone)
//!     ▲                   │
//!     └─────restore───────┘
//! ```
//!
//! They do not store it the same way. Entries and users carry an `isDeleted` flag, while
//! a DAI entry's trash is one value of its status. [`Trashable`] gives the three kinds the
//! same surface so the transitions below are written once.
//!
//! ## Restore policy
//!
//! Restoring a DAI entry does not bring back the status it had before it was trashed: it
//! always lands in `waiting`. That rule lives in the `DaiEntry` impl, not in the generic
//! transition.
//!
//! ## Missing ids
//!
//! Every transition on an id that is absent, or not in the required state, changes
//! nothing and reports `false`. None of them are errors.

use crate::model::{DaiEntry, DaiStatus, Identified, InventoryEntry, User};
use std::fmt;

pub trait Trashable: Identified {
    fn is_trashed(&self) -> bool;
    fn trash(&mut self);
    fn restore(&mut self);
}

impl Trashable for InventoryEntry {
    fn is_trashed(&self) -> bool {
        self.is_deleted
    }

    fn trash(&mut self) {
        self.is_deleted = true;
    }

    fn restore(&mut self) {
        self.is_deleted = false;
    }
}

impl Trashable for User {
    fn is_trashed(&self) -> bool {
        self.is_deleted()
    }

    fn trash(&mut self) {
        self.is_deleted = Some(true);
    }

    fn restore(&mut self) {
        self.is_deleted = Some(false);
    }
}

impl Trashable for DaiEntry {
    fn is_trashed(&self) -> bool {
        self.status == DaiStatus::Trash
    }

    fn trash(&mut self) {
        self.status = DaiStatus::Trash;
    }

    fn restore(&mut self) {
        self.status = DaiStatus::Waiting;
    }
}

/// The three kinds of record that can sit in the recycle bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Entry,
    User,
    Dai,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Entry => "Entry",
            EntityKind::User => "User",
            EntityKind::Dai => "DAI entry",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Active → Trashed.
pub fn delete_by_id<T: Trashable>(items: &mut [T], id: &str) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) if !item.is_trashed() => {
            item.trash();
            true
        }
        _ => false,
    }
}

/// Trashed → Active.
pub fn restore_by_id<T: Trashable>(items: &mut [T], id: &str) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) if item.is_trashed() => {
            item.restore();
            true
        }
        _ => false,
    }
}

/// Trashed → removed. Active items are left alone.
pub fn purge_by_id<T: Trashable>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|item| !(item.id() == id && item.is_trashed()));
    items.len() != before
}

/// Removes every trashed item accepted by `in_scope`. Returns how many went.
pub fn purge_trashed<T, F>(items: &mut Vec<T>, in_scope: F) -> usize
where
    T: Trashable,
    F: Fn(&T) -> bool,
{
    let before = items.len();
    items.retain(|item| !(item.is_trashed() && in_scope(item)));
    before - items.len()
}
