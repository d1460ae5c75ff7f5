//! Client-local preference storage.
//!
//! Native builds keep one small file per key under the platform data
//! directory. Browser builds use `window.localStorage`. Tests use an
//! in-memory map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::{fs, io, path::PathBuf};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned")]
    Poisoned,

    #[error("browser storage unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Shared handle to whichever backend the platform uses.
pub type SharedStorage = Arc<dyn PreferenceStorage>;

#[cfg(not(target_arch = "wasm32"))]
pub fn default_storage() -> SharedStorage {
    Arc::new(FileStorage::new(FileStorage::default_dir()))
}

#[cfg(target_arch = "wasm32")]
pub fn default_storage() -> SharedStorage {
    Arc::new(WebStorage)
}

// ============================================
// File Backend (native platforms)
// ============================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn default_dir() -> PathBuf {
        if let Some(data_dir) = dirs::data_local_dir() {
            return data_dir.join("twin").join("preferences");
        }
        PathBuf::from("cache").join("preferences")
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(sanitize_key(key))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

// ============================================
// localStorage Backend (web)
// ============================================

/// Keys are stored verbatim, so `theme` lands under `localStorage.theme`.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Debug, Default)]
pub struct WebStorage;

#[cfg(target_arch = "wasm32")]
impl WebStorage {
    fn local_storage() -> StorageResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl PreferenceStorage for WebStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Self::local_storage()?
            .get_item(key)
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        Self::local_storage()?
            .set_item(key, value)
            .map_err(|err| StorageError::Unavailable(format!("{err:?}")))
    }
}

// ============================================
// Memory Backend
// ============================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Sanitize storage key for filesystem use
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}


#[cfg(all(test, target_arch = "wasm32"))]
mod web_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn web_storage_writes_through_to_local_storage() {
        let storage = default_storage();
        storage.set("theme", "dark").unwrap();

        // A fresh handle stands in for a page reload.
        assert_eq!(WebStorage.get("theme").unwrap(), Some("dark".to_string()));

        let raw = web_sys::window()
            .unwrap()
            .local_storage()
            .unwrap()
            .unwrap()
            .get_item("theme")
            .unwrap();
        assert_eq!(raw, Some("dark".to_string()));
    }

    #[wasm_bindgen_test]
    fn web_storage_reload_restores_theme() {
        use crate::theme::ThemeStore;
        use crate::types::{ResolvedTheme, ThemePreference};

        let mut first = ThemeStore::new();
        first.mount(&WebStorage, ResolvedTheme::Light);
        first.set_theme(ThemePreference::Dark, &WebStorage);

        let mut reloaded = ThemeStore::new();
        reloaded.mount(&WebStorage, ResolvedTheme::Light);
        assert_eq!(reloaded.preference(), ThemePreference::Dark);
        assert_eq!(reloaded.resolved(), ResolvedTheme::Dark);
    }
}
