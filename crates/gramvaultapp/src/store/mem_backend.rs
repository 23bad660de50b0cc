use super::backend::StorageBackend;
use crate::error::{GramVaultError, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since gramvault is single-threaded.
#[derive(Default)]
pub struct MemBackend {
    items: RefCell<BTreeMap<String, String>>,
    simulate_write_error: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Test helper to plant raw text under a key, bypassing encoding.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl StorageBackend for MemBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(GramVaultError::Store("Simulated write error".to_string()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_removes_items() {
        let backend = MemBackend::new();
        assert_eq!(backend.get_item("theme").unwrap(), None);

        backend.set_item("theme", "dark").unwrap();
        assert_eq!(backend.get_item("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(backend.keys().unwrap(), vec!["theme".to_string()]);

        backend.remove_item("theme").unwrap();
        backend.remove_item("theme").unwrap();
        assert_eq!(backend.get_item("theme").unwrap(), None);
    }

    #[test]
    fn simulated_write_error_leaves_value() {
        let backend = MemBackend::new();
        backend.set_item("k", "v1").unwrap();
        backend.set_simulate_write_error(true);
        assert!(backend.set_item("k", "v2").is_err());
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some("v1"));
    }
}
