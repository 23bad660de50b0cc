//! # Domain Model
//!
//! The records gramvault tracks: [`InventoryEntry`], [`User`], [`DaiEntry`] and the small
//! value records around them ([`Note`], [`EmergencyContact`], [`DaiImage`]), plus the
//! process-wide [`AppSettings`], [`Theme`] and [`View`].
//!
//! ## Wire Shape
//!
//! Everything here serializes with camelCase field names. This is the exact shape the
//! browser edition of the tracker wrote into local storage and into its backup files,
//! so documents produced by either edition import into the other.
//!
//! ```text
//! { "id": "…", "userId": "…", "invoiceNumber": "INV-10", "weight": 12.5,
//!   "description": "Bangle", "createdAt": 1718000000000, "isDeleted": false }
//! ```
//!
//! ## Identity
//!
//! Ids are opaque strings. New records get a v4 UUID, but imported data may carry any
//! token (the seeded default user is literally `"default"`), so ids are never parsed.
//!
//! ## Timestamps
//!
//! `createdAt` and `timestamp` fields are epoch milliseconds, matching `Date.now()`.
//!
//! ## Soft Delete
//!
//! Entries and users carry an `isDeleted` flag, while DAI entries fold the trash into
//! their status (`"trash"`). [`crate::lifecycle`] hides that difference behind one trait.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::GramVaultError;

pub const DEFAULT_USER_ID: &str = "default";
pub const DEFAULT_USER_NAME: &str = "Master User";
pub const DEFAULT_PRIMARY_TITLE: &str = "PRO JEWELLERY";
pub const DEFAULT_SECONDARY_TITLE: &str = "Gram Tracker Pro";

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Records addressed by an opaque string id.
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! identified {
    ($($ty:ty),+ $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })+
    };
}

identified!(InventoryEntry, User, DaiEntry, Note, EmergencyContact, DaiImage);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub id: String,
    pub user_id: String,
    pub invoice_number: String,
    /// Grams.
    pub weight: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub is_deleted: bool,
}

/// The user-supplied part of an entry; id, creation time and the deleted flag are
/// assigned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEntry {
    pub user_id: String,
    pub invoice_number: String,
    pub weight: f64,
    pub description: String,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub date: Option<String>,
    pub photo: Option<String>,
}

impl NewEntry {
    pub fn new(
        user_id: impl Into<String>,
        invoice_number: impl Into<String>,
        weight: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            invoice_number: invoice_number.into(),
            weight,
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn into_entry(self) -> InventoryEntry {
        InventoryEntry {
            id: new_id(),
            user_id: self.user_id,
            invoice_number: self.invoice_number,
            weight: self.weight,
            description: self.description,
            category: self.category,
            quantity: self.quantity,
            date: self.date,
            photo: self.photo,
            created_at: now_millis(),
            is_deleted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    // Absent in data written before users could be trashed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            photo: None,
            phone: None,
            address: None,
            email: None,
            is_deleted: None,
        }
    }

    /// The user seeded into an empty store.
    pub fn default_user() -> Self {
        Self {
            id: DEFAULT_USER_ID.to_string(),
            ..Self::new(DEFAULT_USER_NAME)
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }

    /// Applies the fields present in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: &UserUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(photo) = &update.photo {
            self.photo = Some(photo.clone());
        }
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(address) = &update.address {
            self.address = Some(address.clone());
        }
        if let Some(email) = &update.email {
            self.email = Some(email.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub id: String,
    pub name: Option<String>,
    pub photo: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.photo.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.email.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaiStatus {
    #[default]
    Waiting,
    Out,
    In,
    Trash,
}

impl fmt::Display for DaiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DaiStatus::Waiting => "waiting",
            DaiStatus::Out => "out",
            DaiStatus::In => "in",
            DaiStatus::Trash => "trash",
        };
        f.write_str(s)
    }
}

impl FromStr for DaiStatus {
    type Err = GramVaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "waiting" => Ok(DaiStatus::Waiting),
            "out" => Ok(DaiStatus::Out),
            "in" => Ok(DaiStatus::In),
            "trash" => Ok(DaiStatus::Trash),
            other => Err(GramVaultError::Api(format!("Unknown DAI status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaiEntry {
    pub id: String,
    pub di_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub status: DaiStatus,
    /// Owner. Entries written by older versions have none and are visible to every user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl DaiEntry {
    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref().map_or(true, |owner| owner == user_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDaiEntry {
    pub di_number: String,
    pub date: String,
    pub details: String,
    pub photo: Option<String>,
}

impl NewDaiEntry {
    pub fn new(
        di_number: impl Into<String>,
        date: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            di_number: di_number.into(),
            date: date.into(),
            details: details.into(),
            photo: None,
        }
    }

    pub fn into_entry(self, user_id: &str) -> DaiEntry {
        DaiEntry {
            id: new_id(),
            di_number: self.di_number,
            date: self.date,
            details: self.details,
            photo: self.photo,
            created_at: now_millis(),
            status: DaiStatus::Waiting,
            user_id: Some(user_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub primary_title: String,
    pub secondary_title: String,
    /// Highest settings migration already applied. Missing in legacy data.
    #[serde(default)]
    pub schema_version: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            primary_title: DEFAULT_PRIMARY_TITLE.to_string(),
            secondary_title: DEFAULT_SECONDARY_TITLE.to_string(),
            schema_version: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub content: String,
    pub timestamp: i64,
}

impl Note {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: content.into(),
            timestamp: now_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub number: String,
}

impl EmergencyContact {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            number: number.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaiImage {
    pub id: String,
    pub url: String,
    pub title: String,
    pub timestamp: i64,
}

impl DaiImage {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            url: url.into(),
            title: title.into(),
            timestamp: now_millis(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = GramVaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(GramVaultError::Api(format!("Unknown theme: {}", other))),
        }
    }
}

/// Which screen the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Form,
    List,
    Trash,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_reads_browser_shape() {
        let raw = r#"{"id":"a1","userId":"default","invoiceNumber":"INV-7","weight":3.5,
            "description":"Ring","createdAt":1718000000000,"isDeleted":false,"quantity":2}"#;
        let entry: InventoryEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.user_id, "default");
        assert_eq!(entry.invoice_number, "INV-7");
        assert_eq!(entry.quantity, Some(2.0));
        assert!(entry.category.is_none());

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["invoiceNumber"], "INV-7");
        assert!(back.get("category").is_none());
    }

    #[test]
    fn user_without_deleted_flag_is_active() {
        let user: User = serde_json::from_str(r#"{"id":"u1","name":"Asha"}"#).unwrap();
        assert!(!user.is_deleted());
        assert_eq!(User::default_user().id, DEFAULT_USER_ID);
    }

    #[test]
    fn user_update_keeps_missing_fields() {
        let mut user = User::new("Asha");
        user.phone = Some("123".into());
        let update = UserUpdate {
            email: Some("asha@example.com".into()),
            ..UserUpdate::new(user.id.clone())
        };
        user.apply(&update);
        assert_eq!(user.name, "Asha");
        assert_eq!(user.phone.as_deref(), Some("123"));
        assert_eq!(user.email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn dai_status_uses_lowercase_names() {
        let entry: DaiEntry = serde_json::from_str(
            r#"{"id":"d1","diNumber":"DI-1","date":"2024-01-01","details":"x","createdAt":1,"status":"out"}"#,
        )
        .unwrap();
        assert_eq!(entry.status, DaiStatus::Out);
        assert!(entry.belongs_to("anyone"));
        assert_eq!("TRASH".parse::<DaiStatus>().unwrap(), DaiStatus::Trash);
        assert!("lost".parse::<DaiStatus>().is_err());
    }

    #[test]
    fn dai_entry_without_status_is_waiting() {
        let entry: DaiEntry =
            serde_json::from_str(r#"{"id":"d2","diNumber":"DI-2"}"#).unwrap();
        assert_eq!(entry.status, DaiStatus::Waiting);
        assert_eq!(DaiStatus::default(), DaiStatus::Waiting);
    }

    #[test]
    fn new_dai_entry_starts_waiting_and_owned() {
        let entry = NewDaiEntry::new("DI-9", "2024-02-02", "Chains").into_entry("u1");
        assert_eq!(entry.status, DaiStatus::Waiting);
        assert!(entry.belongs_to("u1"));
        assert!(!entry.belongs_to("u2"));
    }

    #[test]
    fn settings_without_version_default_to_zero() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"primaryTitle":"PRECISION","secondaryTitle":"x"}"#).unwrap();
        assert_eq!(settings.schema_version, 0);
    }
}
