//! # Storage Layer
//!
//! gramvault keeps every collection as JSON text under its own key in a key-value store.
//! The layer is split in two:
//!
//! 1. **Backends** ([`backend::StorageBackend`]): raw text in, raw text out.
//!    - [`fs_backend::FsBackend`]: one file per key, atomic writes. Used by the CLI.
//!    - [`mem_backend::MemBackend`]: a map in memory. Used by tests.
//! 2. **Persistence** ([`persistence::Persistence`]): which key holds which collection,
//!    plus encoding and the "malformed means empty" rule.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! ├── theme.json               # "light" | "dark" (bare text)
//! ├── app_settings.json        # AppSettings
//! ├── app_users.json           # [User]
//! ├── current_user_id.json     # user id (bare text)
//! ├── jewellery_entries.json   # [InventoryEntry]
//! ├── dai_entries.json         # [DaiEntry]
//! ├── notebook_notes.json      # [Note]
//! ├── dai_images.json          # [DaiImage]
//! ├── emergency_contacts.json  # [EmergencyContact]
//! ├── billing_rates.json       # { userId: rate }
//! ├── about_photo.json         # opaque image blob
//! └── help_photo.json          # opaque image blob
//! ```
//!
//! There is no schema versioning at this level. Versioned data lives in backup
//! documents ([`crate::backup`]) and in the settings migrations ([`crate::config`]).

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod persistence;

pub use backend::StorageBackend;
pub use persistence::Persistence;
