//! # Command Layer
//!
//! The business operations of gramvault, one submodule per area. Every command takes the
//! [`AppState`](crate::state::AppState) it works on and returns a [`CmdResult`]:
//! the records it touched or listed, plus leveled messages for the user.
//!
//! Commands never print, never parse arguments and never ask questions. Operations that
//! need a yes/no answer take a [`Confirm`](crate::confirm::Confirm) gate from the caller.
//!
//! Ids reaching this layer are already resolved (see [`crate::api`]). An id that matches
//! nothing is not an error: the command changes nothing and says so with an info message.
//!
//! ## Command Modules
//!
//! - [`entries`]: add, edit and list inventory entries
//! - [`users`]: user profiles and the current selection
//! - [`dai`]: DAI records and their status workflow
//! - [`trash`]: delete, restore, purge and empty the recycle bin
//! - [`billing`]: billing rate and estimate
//! - [`notebook`]: notes, emergency contacts and DAI images
//! - [`backup`]: export to and import from backup files
//! - [`settings`]: display titles and theme

use serde::Serialize;
use std::path::PathBuf;

use crate::model::{DaiEntry, DaiImage, EmergencyContact, InventoryEntry, Note, User};

pub mod backup;
pub mod billing;
pub mod dai;
pub mod entries;
pub mod notebook;
pub mod settings;
pub mod trash;
pub mod users;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Any record a command can hand back for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Entry(InventoryEntry),
    User(User),
    Dai(DaiEntry),
    Note(Note),
    Contact(EmergencyContact),
    DaiImage(DaiImage),
}

impl Record {
    pub fn id(&self) -> &str {
        match self {
            Record::Entry(r) => &r.id,
            Record::User(r) => &r.id,
            Record::Dai(r) => &r.id,
            Record::Note(r) => &r.id,
            Record::Contact(r) => &r.id,
            Record::DaiImage(r) => &r.id,
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected: Vec<Record>,
    pub listed: Vec<Record>,
    pub paths: Vec<PathBuf>,
    pub estimate: Option<billing::BillingEstimate>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected(mut self, records: Vec<Record>) -> Self {
        self.affected = records;
        self
    }

    pub fn with_listed(mut self, records: Vec<Record>) -> Self {
        self.listed = records;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    /// A result carrying a single message.
    pub fn message(message: CmdMessage) -> Self {
        Self {
            messages: vec![message],
            ..Default::default()
        }
    }
}
