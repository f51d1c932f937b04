//! Draft persistence for the join form.
//!
//! Storage problems never reach the user: every helper here logs and
//! carries on, so a blocked or full `localStorage` just means the draft
//! is not remembered.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use web_sys::Storage;

use crate::error::{storage_error, Result, SiteError};

/// Field name → value, as typed into the form.
pub type Draft = BTreeMap<String, String>;

pub trait DraftStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Browser `localStorage`.
pub struct LocalDraftStore {
    storage: Storage,
}

impl LocalDraftStore {
    pub fn open() -> Result<Self> {
        let window = web_sys::window().ok_or(SiteError::MissingElement("window"))?;
        let storage = window
            .local_storage()
            .map_err(storage_error)?
            .ok_or_else(|| SiteError::Storage("localStorage is not available".to_string()))?;
        Ok(Self { storage })
    }
}

impl DraftStore for LocalDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(storage_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(storage_error)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(storage_error)
    }
}

/// Non-persistent store, used when `localStorage` is blocked.
#[derive(Default)]
pub struct MemoryDraftStore {
    entries: RefCell<HashMap<String, String>>,
    failing: bool,
}

impl MemoryDraftStore {
    /// A store whose every operation fails, like a browser with storage
    /// disabled.
    #[cfg(test)]
    pub fn failing() -> Self {
        Self {
            entries: RefCell::default(),
            failing: true,
        }
    }

    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            Err(SiteError::Storage("storage disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads a draft. Non-string values are dropped; anything that is not a
/// JSON object yields an error.
pub fn parse_draft(raw: &str) -> Result<Draft> {
    let value: BTreeMap<String, Value> = serde_json::from_str(raw)?;
    Ok(value
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::String(s) => Some((name, s)),
            _ => None,
        })
        .collect())
}

pub fn load_draft(store: &dyn DraftStore, key: &str) -> Option<Draft> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::debug!("Draft not readable: {}", e);
            return None;
        }
    };
    match parse_draft(&raw) {
        Ok(draft) => Some(draft),
        Err(e) => {
            log::debug!("Ignoring stored draft: {}", e);
            None
        }
    }
}

pub fn save_draft(store: &dyn DraftStore, key: &str, draft: &Draft) {
    let raw = match serde_json::to_string(draft) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Failed to serialize draft: {}", e);
            return;
        }
    };
    match store.set(key, &raw) {
        Ok(()) => {}
        Err(SiteError::QuotaExceeded) => log::warn!("Draft not saved, storage is full"),
        Err(e) => log::debug!("Draft not saved: {}", e),
    }
}

pub fn discard_draft(store: &dyn DraftStore, key: &str) {
    if let Err(e) = store.delete(key) {
        log::debug!("Draft not removed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(pairs: &[(&str, &str)]) -> Draft {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn saved_draft_loads_back() {
        let store = MemoryDraftStore::default();
        let entered = draft(&[("full_name", "Ada"), ("message", "hello \"there\"")]);

        save_draft(&store, "k", &entered);

        assert_eq!(load_draft(&store, "k"), Some(entered));
    }

    #[test]
    fn missing_draft_is_none() {
        let store = MemoryDraftStore::default();
        assert_eq!(load_draft(&store, "k"), None);
    }

    #[test]
    fn corrupt_draft_is_ignored() {
        let store = MemoryDraftStore::default();
        store.set("k", "{\"full_name\": ").unwrap();
        assert_eq!(load_draft(&store, "k"), None);

        store.set("k", "[1, 2]").unwrap();
        assert_eq!(load_draft(&store, "k"), None);
    }

    #[test]
    fn non_string_values_are_dropped() {
        let parsed = parse_draft(r#"{"a": "x", "b": 3, "c": null}"#).unwrap();
        assert_eq!(parsed, draft(&[("a", "x")]));
    }

    #[test]
    fn failing_store_is_swallowed() {
        let store = MemoryDraftStore::failing();
        save_draft(&store, "k", &draft(&[("a", "x")]));
        assert_eq!(load_draft(&store, "k"), None);
        discard_draft(&store, "k");
    }

    #[test]
    fn discard_removes_key() {
        let store = MemoryDraftStore::default();
        save_draft(&store, "k", &draft(&[("a", "x")]));
        assert!(store.contains("k"));

        discard_draft(&store, "k");
        assert!(!store.contains("k"));
    }
}
