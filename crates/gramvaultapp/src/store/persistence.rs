use super::backend::StorageBackend;
use crate::error::{GramVaultError, Result};
use crate::model::{
    AppSettings, DaiEntry, DaiImage, EmergencyContact, InventoryEntry, Note, Theme, User,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

pub mod keys {
    pub const THEME: &str = "theme";
    pub const SETTINGS: &str = "app_settings";
    pub const USERS: &str = "app_users";
    pub const CURRENT_USER_ID: &str = "current_user_id";
    pub const ENTRIES: &str = "jewellery_entries";
    pub const DAI_ENTRIES: &str = "dai_entries";
    pub const NOTES: &str = "notebook_notes";
    pub const DAI_IMAGES: &str = "dai_images";
    pub const EMERGENCY_CONTACTS: &str = "emergency_contacts";
    pub const BILLING_RATES: &str = "billing_rates";
    pub const ABOUT_PHOTO: &str = "about_photo";
    pub const HELP_PHOTO: &str = "help_photo";
}

/// Per-user billing rates, keyed by user id.
pub type BillingRates = BTreeMap<String, f64>;

/// Typed accessors over a [`StorageBackend`].
///
/// Every collection lives under its own key as JSON text. Reads never fail: a missing
/// key, unreadable storage or text that does not decode all yield the empty value, and
/// the problem is logged. Writes return errors so callers can report them.
pub struct Persistence<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> Persistence<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("could not read {}: {}", key, e);
                None
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("ignoring malformed {}: {}", key, e);
                None
            }
        }
    }

    /// Decodes a JSON array one element at a time. Elements that do not decode are
    /// skipped and logged, so one bad record cannot hide the rest of its collection.
    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let items: Vec<serde_json::Value> = self.read_json(key)?;
        let total = items.len();
        let decoded: Vec<T> = items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match serde_json::from_value(item) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("skipping malformed record {} in {}: {}", i, key, e);
                    None
                }
            })
            .collect();
        if decoded.len() < total {
            log::warn!("{} of {} records in {} could not be read", total - decoded.len(), total, key);
        }
        Some(decoded)
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value).map_err(GramVaultError::Serialization)?;
        self.backend.set_item(key, &text)
    }

    fn write_optional(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(v) => self.backend.set_item(key, v),
            None => self.backend.remove_item(key),
        }
    }

    // --- Collections ---

    pub fn entries(&self) -> Vec<InventoryEntry> {
        self.read_collection(keys::ENTRIES).unwrap_or_default()
    }

    pub fn save_entries(&self, entries: &[InventoryEntry]) -> Result<()> {
        self.write_json(keys::ENTRIES, entries)
    }

    pub fn dai_entries(&self) -> Vec<DaiEntry> {
        self.read_collection(keys::DAI_ENTRIES).unwrap_or_default()
    }

    pub fn save_dai_entries(&self, entries: &[DaiEntry]) -> Result<()> {
        self.write_json(keys::DAI_ENTRIES, entries)
    }

    pub fn notes(&self) -> Vec<Note> {
        self.read_collection(keys::NOTES).unwrap_or_default()
    }

    pub fn save_notes(&self, notes: &[Note]) -> Result<()> {
        self.write_json(keys::NOTES, notes)
    }

    pub fn dai_images(&self) -> Vec<DaiImage> {
        self.read_collection(keys::DAI_IMAGES).unwrap_or_default()
    }

    pub fn save_dai_images(&self, images: &[DaiImage]) -> Result<()> {
        self.write_json(keys::DAI_IMAGES, images)
    }

    pub fn emergency_contacts(&self) -> Vec<EmergencyContact> {
        self.read_collection(keys::EMERGENCY_CONTACTS).unwrap_or_default()
    }

    pub fn save_emergency_contacts(&self, contacts: &[EmergencyContact]) -> Result<()> {
        self.write_json(keys::EMERGENCY_CONTACTS, contacts)
    }

    /// Stored users, or `None` when there are none to load.
    pub fn users(&self) -> Option<Vec<User>> {
        self.read_collection::<User>(keys::USERS)
            .filter(|users| !users.is_empty())
    }

    pub fn save_users(&self, users: &[User]) -> Result<()> {
        self.write_json(keys::USERS, users)
    }

    // --- Process-wide values ---

    pub fn settings(&self) -> Option<AppSettings> {
        self.read_json(keys::SETTINGS)
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.write_json(keys::SETTINGS, settings)
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.read_raw(keys::CURRENT_USER_ID)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }

    pub fn save_current_user_id(&self, id: &str) -> Result<()> {
        self.backend.set_item(keys::CURRENT_USER_ID, id)
    }

    pub fn theme(&self) -> Theme {
        self.read_raw(keys::THEME)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.backend.set_item(keys::THEME, theme.as_str())
    }

    // --- Billing ---

    pub fn billing_rates(&self) -> BillingRates {
        self.read_json(keys::BILLING_RATES).unwrap_or_default()
    }

    pub fn save_billing_rates(&self, rates: &BillingRates) -> Result<()> {
        self.write_json(keys::BILLING_RATES, rates)
    }

    pub fn billing_rate(&self, user_id: &str) -> f64 {
        self.billing_rates().get(user_id).copied().unwrap_or(0.0)
    }

    pub fn save_billing_rate(&self, user_id: &str, rate: f64) -> Result<()> {
        let mut rates = self.billing_rates();
        rates.insert(user_id.to_string(), rate);
        self.save_billing_rates(&rates)
    }

    // --- Image blobs ---

    pub fn about_photo(&self) -> Option<String> {
        self.read_raw(keys::ABOUT_PHOTO)
    }

    pub fn save_about_photo(&self, photo: Option<&str>) -> Result<()> {
        self.write_optional(keys::ABOUT_PHOTO, photo)
    }

    pub fn help_photo(&self) -> Option<String> {
        self.read_raw(keys::HELP_PHOTO)
    }

    pub fn save_help_photo(&self, photo: Option<&str>) -> Result<()> {
        self.write_optional(keys::HELP_PHOTO, photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntry;
    use crate::store::mem_backend::MemBackend;

    fn persistence() -> Persistence<MemBackend> {
        Persistence::new(MemBackend::new())
    }

    #[test]
    fn missing_collections_are_empty() {
        let p = persistence();
        assert!(p.entries().is_empty());
        assert!(p.dai_entries().is_empty());
        assert!(p.notes().is_empty());
        assert!(p.dai_images().is_empty());
        assert!(p.emergency_contacts().is_empty());
        assert!(p.users().is_none());
        assert!(p.settings().is_none());
        assert_eq!(p.theme(), Theme::Light);
    }

    #[test]
    fn malformed_text_reads_as_absent() {
        let p = persistence();
        p.backend().put_raw(keys::ENTRIES, "{not json");
        p.backend().put_raw(keys::USERS, "[{\"id\": 3}]");
        p.backend().put_raw(keys::BILLING_RATES, "null");
        p.backend().put_raw(keys::THEME, "sepia");

        assert!(p.entries().is_empty());
        assert!(p.users().is_none());
        assert!(p.billing_rates().is_empty());
        assert_eq!(p.theme(), Theme::Light);
    }

    #[test]
    fn one_bad_record_keeps_the_rest() {
        let p = persistence();
        p.backend().put_raw(
            keys::ENTRIES,
            r#"[{"id":"e1","userId":"u1","invoiceNumber":"INV-1","weight":1.0},
                {"id":"e2","userId":"u1","invoiceNumber":"INV-2","weight":"heavy"},
                {"id":"e3","userId":"u1","invoiceNumber":"INV-3","weight":3.0}]"#,
        );
        let ids: Vec<String> = p.entries().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["e1", "e3"]);

        p.backend().put_raw(keys::NOTES, r#"[{"id":"n1","content":"keep","timestamp":1}, 7]"#);
        assert_eq!(p.notes().len(), 1);
    }

    #[test]
    fn entries_round_trip_in_order() {
        let p = persistence();
        let a = NewEntry::new("u1", "INV-1", 1.5, "Ring").into_entry();
        let b = NewEntry::new("u1", "INV-2", 2.5, "Chain").into_entry();
        p.save_entries(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(p.entries(), vec![a, b]);
    }

    #[test]
    fn billing_rates_are_per_user() {
        let p = persistence();
        p.save_billing_rate("u1", 6200.0).unwrap();
        p.save_billing_rate("u2", 5900.5).unwrap();
        assert_eq!(p.billing_rate("u1"), 6200.0);
        assert_eq!(p.billing_rate("u2"), 5900.5);
        assert_eq!(p.billing_rate("nobody"), 0.0);
    }

    #[test]
    fn current_user_is_stored_as_bare_text() {
        let p = persistence();
        p.save_current_user_id("abc").unwrap();
        assert_eq!(
            p.backend().get_item(keys::CURRENT_USER_ID).unwrap().as_deref(),
            Some("abc")
        );
        assert_eq!(p.current_user_id().as_deref(), Some("abc"));
    }

    #[test]
    fn empty_user_list_counts_as_missing() {
        let p = persistence();
        p.save_users(&[]).unwrap();
        assert!(p.users().is_none());
    }

    #[test]
    fn photos_can_be_cleared() {
        let p = persistence();
        p.save_about_photo(Some("data:image/png;base64,AAAA")).unwrap();
        assert!(p.about_photo().is_some());
        p.save_about_photo(None).unwrap();
        assert!(p.about_photo().is_none());
    }

    #[test]
    fn write_errors_propagate() {
        let p = persistence();
        p.backend().set_simulate_write_error(true);
        assert!(p.save_notes(&[Note::new("x")]).is_err());
    }
}
