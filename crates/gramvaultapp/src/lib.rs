//! # GramVault Architecture
//!
//! GramVault tracks a jewellery workshop's inventory by weight: entries per user, running
//! totals, billing estimates, a recycle bin, DAI dispatch records and a small notebook.
//! It is a **UI-agnostic library**; the `gramvault` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Single entry point, resolves id prefixes                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business operations returning CmdResult                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Domain Layer (state.rs, recycle_bin.rs, backup.rs)         │
//! │  - In-memory state with write-through persistence           │
//! │  - Trash lifecycle, backup merge                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Persistence: typed collections over a key-value backend  │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! Nothing in this crate writes to stdout or stderr, exits the process or prompts.
//! Questions that need an answer from the user go through [`confirm::Confirm`].
//! Diagnostics go through the `log` facade; installing a logger is the client's job.
//!
//! ## Testing Strategy
//!
//! Commands carry most of the tests, run against [`store::mem_backend::MemBackend`].
//! The file backend is tested against temporary directories in `tests/`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business operations
//! - [`state`]: In-memory state store
//! - [`lifecycle`]: Active / trashed / purged transitions
//! - [`recycle_bin`]: Trash counts and emptying
//! - [`backup`]: Backup documents and additive import
//! - [`model`]: Records and their wire shape
//! - [`natural`]: Numeric-aware ordering of invoice numbers
//! - [`store`]: Storage backends and typed persistence
//! - [`config`]: Runtime configuration and settings migrations
//! - [`confirm`]: Confirmation gates
//! - [`error`]: Error types

pub mod api;
pub mod backup;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod natural;
pub mod recycle_bin;
pub mod state;
pub mod store;
