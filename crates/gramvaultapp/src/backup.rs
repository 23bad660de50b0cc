//! # Backup Export and Import
//!
//! A backup is one JSON document holding every collection:
//!
//! ```text
//! {
//!   "metadata": { "version": "2.0", "timestamp": 1718000000000,
//!                 "type": "PRO_JEWELLERY_FULL_BACKUP" },
//!   "data": { "entries": [...], "notes": [...], "daiImages": [...],
//!             "daiEntries": [...], "emergencyContacts": [...], "users": [...],
//!             "settings": {...}, "billingRates": {...},
//!             "aboutPhoto": null, "helpPhoto": null }
//! }
//! ```
//!
//! Older releases exported only the inventory, as a bare array of entries. Both shapes
//! are accepted on import; [`parse_backup`] tells them apart.
//!
//! ## Import is additive
//!
//! Importing never removes or overwrites anything. For every collection the result is
//! the local records plus the incoming records whose id is not already present
//! locally. Billing rates only add users that have no local rate, photos only fill an
//! empty slot, and settings are only adopted when none are stored.
//!
//! Importing runs in two steps so that nothing is written before the user agrees:
//! [`prepare_import`] computes the merged collections and the counts in memory, and
//! [`PreparedImport::commit`] writes them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::confirm::Prompt;
use crate::error::{ImportError, Result};
use crate::model::{
    now_millis, AppSettings, DaiEntry, DaiImage, EmergencyContact, Identified, InventoryEntry,
    Note, User,
};
use crate::store::persistence::BillingRates;
use crate::store::{Persistence, StorageBackend};

pub const BACKUP_TYPE: &str = "PRO_JEWELLERY_FULL_BACKUP";
pub const BACKUP_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub version: String,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    #[serde(default)]
    pub entries: Vec<InventoryEntry>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub dai_images: Vec<DaiImage>,
    #[serde(default)]
    pub dai_entries: Vec<DaiEntry>,
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub settings: Option<AppSettings>,
    #[serde(default)]
    pub billing_rates: BillingRates,
    #[serde(default)]
    pub about_photo: Option<String>,
    #[serde(default)]
    pub help_photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub metadata: BackupMetadata,
    pub data: BackupData,
}

impl BackupDocument {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshot of everything in storage.
///
/// `users` and `settings` are passed in rather than read back, so a store that has
/// never saved them still exports the seeded default user and the effective settings.
pub fn export_document<B: StorageBackend>(
    persistence: &Persistence<B>,
    users: &[User],
    settings: &AppSettings,
) -> BackupDocument {
    BackupDocument {
        metadata: BackupMetadata {
            version: BACKUP_VERSION.to_string(),
            timestamp: now_millis(),
            kind: BACKUP_TYPE.to_string(),
        },
        data: BackupData {
            entries: persistence.entries(),
            notes: persistence.notes(),
            dai_images: persistence.dai_images(),
            dai_entries: persistence.dai_entries(),
            emergency_contacts: persistence.emergency_contacts(),
            users: users.to_vec(),
            settings: Some(settings.clone()),
            billing_rates: persistence.billing_rates(),
            about_photo: persistence.about_photo(),
            help_photo: persistence.help_photo(),
        },
    }
}

/// `pro-jewellery-backup-YYYY-MM-DD.json`
pub fn backup_filename(date: chrono::NaiveDate) -> String {
    format!("pro-jewellery-backup-{}.json", date.format("%Y-%m-%d"))
}

/// A decoded import file.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupPayload {
    Full(Box<BackupData>),
    /// A bare list of inventory entries from an older export.
    Legacy(Vec<InventoryEntry>),
}

impl BackupPayload {
    pub fn is_legacy(&self) -> bool {
        matches!(self, BackupPayload::Legacy(_))
    }
}

pub fn parse_backup(text: &str) -> std::result::Result<BackupPayload, ImportError> {
    let value: Value = serde_json::from_str(text).map_err(ImportError::Parse)?;

    match value {
        Value::Object(mut map) => {
            let is_full_backup = map
                .get("metadata")
                .and_then(|m| m.get("type"))
                .and_then(Value::as_str)
                == Some(BACKUP_TYPE);
            if !is_full_backup {
                return Err(ImportError::InvalidFormat(
                    "object is not a full backup (missing metadata type)".to_string(),
                ));
            }
            match map.remove("data") {
                Some(data @ Value::Object(_)) => serde_json::from_value(data)
                    .map(|data| BackupPayload::Full(Box::new(data)))
                    .map_err(|e| ImportError::InvalidFormat(format!("backup data: {}", e))),
                _ => Err(ImportError::InvalidFormat(
                    "backup has no data section".to_string(),
                )),
            }
        }
        Value::Array(_) => serde_json::from_value(value)
            .map(BackupPayload::Legacy)
            .map_err(|e| ImportError::InvalidFormat(format!("legacy entry list: {}", e))),
        _ => Err(ImportError::InvalidFormat(
            "expected a backup object or a list of entries".to_string(),
        )),
    }
}

/// How many records an import adds, per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub entries: usize,
    pub users: usize,
    pub dai_entries: usize,
    pub notes: usize,
    pub emergency_contacts: usize,
    pub dai_images: usize,
    pub billing_rates: usize,
    pub photos: usize,
    pub settings: bool,
}

impl ImportCounts {
    pub fn total(&self) -> usize {
        self.entries
            + self.users
            + self.dai_entries
            + self.notes
            + self.emergency_contacts
            + self.dai_images
            + self.billing_rates
            + self.photos
            + usize::from(self.settings)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Human labels of the collections that gain records, e.g. `"3 entries"`.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        let mut push = |count: usize, label: &str| {
            if count > 0 {
                parts.push(format!("{} {}", count, label));
            }
        };
        push(self.entries, "entries");
        push(self.users, "users");
        push(self.dai_entries, "DAI entries");
        push(self.notes, "notes");
        push(self.emergency_contacts, "emergency contacts");
        push(self.dai_images, "DAI images");
        push(self.billing_rates, "billing rates");
        push(self.photos, "photos");
        if self.settings {
            parts.push("settings".to_string());
        }
        parts
    }
}

/// Appends the incoming records whose id is unknown. Returns how many were added.
///
/// Duplicates inside `incoming` collapse to their first occurrence.
pub fn merge_by_id<T: Identified>(local: &mut Vec<T>, incoming: Vec<T>) -> usize {
    let mut seen: HashSet<String> = local.iter().map(|item| item.id().to_string()).collect();
    let before = local.len();
    for item in incoming {
        if seen.insert(item.id().to_string()) {
            local.push(item);
        }
    }
    local.len() - before
}

/// Adds rates for users that have none locally.
pub fn merge_rates(local: &mut BillingRates, incoming: BillingRates) -> usize {
    let mut added = 0;
    for (user_id, rate) in incoming {
        if !local.contains_key(&user_id) {
            local.insert(user_id, rate);
            added += 1;
        }
    }
    added
}

fn fill_photo(local: &mut Option<String>, incoming: Option<String>) -> usize {
    match (local.as_ref(), incoming) {
        (None, Some(photo)) if !photo.is_empty() => {
            *local = Some(photo);
            1
        }
        _ => 0,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MergedFull {
    notes: Vec<Note>,
    dai_images: Vec<DaiImage>,
    dai_entries: Vec<DaiEntry>,
    emergency_contacts: Vec<EmergencyContact>,
    users: Vec<User>,
    settings: Option<AppSettings>,
    billing_rates: BillingRates,
    about_photo: Option<String>,
    help_photo: Option<String>,
}

/// The outcome of merging an import against storage, not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImport {
    legacy: bool,
    counts: ImportCounts,
    entries: Vec<InventoryEntry>,
    full: Option<MergedFull>,
}

pub fn prepare_import<B: StorageBackend>(
    persistence: &Persistence<B>,
    payload: BackupPayload,
) -> PreparedImport {
    let mut counts = ImportCounts::default();
    let mut entries = persistence.entries();

    let data = match payload {
        BackupPayload::Legacy(incoming) => {
            counts.entries = merge_by_id(&mut entries, incoming);
            return PreparedImport {
                legacy: true,
                counts,
                entries,
                full: None,
            };
        }
        BackupPayload::Full(data) => *data,
    };

    counts.entries = merge_by_id(&mut entries, data.entries);

    let mut notes = persistence.notes();
    counts.notes = merge_by_id(&mut notes, data.notes);

    let mut dai_images = persistence.dai_images();
    counts.dai_images = merge_by_id(&mut dai_images, data.dai_images);

    let mut dai_entries = persistence.dai_entries();
    counts.dai_entries = merge_by_id(&mut dai_entries, data.dai_entries);

    let mut emergency_contacts = persistence.emergency_contacts();
    counts.emergency_contacts = merge_by_id(&mut emergency_contacts, data.emergency_contacts);

    // An unsaved store still has the seeded default user.
    let mut users = persistence
        .users()
        .unwrap_or_else(|| vec![User::default_user()]);
    counts.users = merge_by_id(&mut users, data.users);

    let settings = match persistence.settings() {
        Some(_) => None,
        None => data.settings,
    };
    counts.settings = settings.is_some();

    let mut billing_rates = persistence.billing_rates();
    counts.billing_rates = merge_rates(&mut billing_rates, data.billing_rates);

    let mut about_photo = persistence.about_photo();
    let mut help_photo = persistence.help_photo();
    counts.photos = fill_photo(&mut about_photo, data.about_photo)
        + fill_photo(&mut help_photo, data.help_photo);

    PreparedImport {
        legacy: false,
        counts,
        entries,
        full: Some(MergedFull {
            notes,
            dai_images,
            dai_entries,
            emergency_contacts,
            users,
            settings,
            billing_rates,
            about_photo,
            help_photo,
        }),
    }
}

impl PreparedImport {
    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    pub fn counts(&self) -> &ImportCounts {
        &self.counts
    }

    /// The question put to the user before anything is written.
    pub fn prompt(&self) -> Prompt {
        if self.legacy {
            return Prompt::new(format!(
                "Merge {} new entries from a legacy backup?",
                self.counts.entries
            ));
        }
        let prompt = Prompt::new(
            "Import full backup? Entries, users, notes, DAI records, contacts, images and \
             billing rates not already present will be added. Nothing existing is changed.",
        );
        let described = self.counts.describe();
        if described.is_empty() {
            prompt.with_detail("Every record in the backup is already present.")
        } else {
            prompt.with_detail(format!("Adds {}.", described.join(", ")))
        }
    }

    /// Writes the merged collections. Collections that gained nothing are not rewritten.
    pub fn commit<B: StorageBackend>(self, persistence: &Persistence<B>) -> Result<ImportCounts> {
        let counts = self.counts;
        if counts.entries > 0 {
            persistence.save_entries(&self.entries)?;
        }
        if let Some(full) = self.full {
            if counts.notes > 0 {
                persistence.save_notes(&full.notes)?;
            }
            if counts.dai_images > 0 {
                persistence.save_dai_images(&full.dai_images)?;
            }
            if counts.dai_entries > 0 {
                persistence.save_dai_entries(&full.dai_entries)?;
            }
            if counts.emergency_contacts > 0 {
                persistence.save_emergency_contacts(&full.emergency_contacts)?;
            }
            if counts.users > 0 {
                persistence.save_users(&full.users)?;
            }
            if let Some(settings) = &full.settings {
                persistence.save_settings(settings)?;
            }
            if counts.billing_rates > 0 {
                persistence.save_billing_rates(&full.billing_rates)?;
            }
            if counts.photos > 0 {
                persistence.save_about_photo(full.about_photo.as_deref())?;
                persistence.save_help_photo(full.help_photo.as_deref())?;
            }
        }
        log::info!("import merged {} records", counts.total());
        Ok(counts)
    }
}
