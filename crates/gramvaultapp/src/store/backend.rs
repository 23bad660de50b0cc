use crate::error::Result;

/// Abstract interface for raw key-value storage.
///
/// This trait handles the "how" of storage (filesystem vs memory), while
/// [`super::persistence::Persistence`] handles the "what" (which key holds which
/// collection, and how it is encoded).
///
/// Values are opaque text. Every method takes `&self`: gramvault is single-threaded,
/// and backends use interior mutability where they need it.
pub trait StorageBackend {
    /// Read the value stored under `key`.
    /// Returns Ok(None) if nothing is stored there.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing what was there.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// All keys currently holding a value.
    fn keys(&self) -> Result<Vec<String>>;
}
