//! Host capabilities the editor bootstrap needs, with in-memory stand-ins.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::errors::EditorResult;
use crate::params::EditorParams;

pub trait LocationPort: Send + Sync {
    /// Current fragment including the leading `#`, or empty.
    fn hash(&self) -> String;
    fn set_hash(&self, hash: &str);
    fn pathname(&self) -> String;
    fn search(&self) -> String;
    fn supports_history(&self) -> bool;
    /// History replacement with a path-relative URL.
    fn replace_state(&self, url: &str);
}

/// Page-session scoped key/value storage.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> EditorResult<()>;
    fn remove(&self, key: &str);
}

pub type ScriptCallback = Box<dyn FnOnce() + Send>;

pub trait EditorHost: Send + Sync {
    /// Inserts a script element for `src`; `on_load` runs once it has loaded.
    fn load_script(&self, src: &str, on_load: ScriptCallback);
    /// Calls the editor's global entry point.
    fn launch_editor(&self, params: &EditorParams);
}

#[derive(Debug, Clone, Default)]
struct LocationState {
    hash: String,
    pathname: String,
    search: String,
    replaced: Vec<String>,
}

pub struct MemoryLocation {
    state: RwLock<LocationState>,
    history: bool,
}

impl MemoryLocation {
    pub fn new(pathname: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(LocationState {
                hash: hash.into(),
                pathname: pathname.into(),
                ..LocationState::default()
            }),
            history: true,
        }
    }

    pub fn with_search(self, search: impl Into<String>) -> Self {
        self.state.write().search = search.into();
        self
    }

    pub fn without_history(mut self) -> Self {
        self.history = false;
        self
    }

    /// URLs passed to `replace_state`, oldest first.
    pub fn replaced_urls(&self) -> Vec<String> {
        self.state.read().replaced.clone()
    }
}

impl LocationPort for MemoryLocation {
    fn hash(&self) -> String {
        self.state.read().hash.clone()
    }

    fn set_hash(&self, hash: &str) {
        let hash = if hash.is_empty() || hash.starts_with('#') {
            hash.to_string()
        } else {
            format!("#{hash}")
        };
        self.state.write().hash = hash;
    }

    fn pathname(&self) -> String {
        self.state.read().pathname.clone()
    }

    fn search(&self) -> String {
        self.state.read().search.clone()
    }

    fn supports_history(&self) -> bool {
        self.history
    }

    fn replace_state(&self, url: &str) {
        let mut state = self.state.write();
        state.replaced.push(url.to_string());
        state.hash.clear();
    }
}

#[derive(Default)]
pub struct MemorySessionStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.write().insert(key.to_string(), value.to_string());
        self
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> EditorResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Loads every script immediately and records what happened.
#[derive(Default)]
pub struct RecordingEditorHost {
    scripts: Mutex<Vec<String>>,
    launches: Mutex<Vec<EditorParams>>,
}

impl RecordingEditorHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }

    pub fn launches(&self) -> Vec<EditorParams> {
        self.launches.lock().clone()
    }
}

impl EditorHost for RecordingEditorHost {
    fn load_script(&self, src: &str, on_load: ScriptCallback) {
        self.scripts.lock().push(src.to_string());
        on_load();
    }

    fn launch_editor(&self, params: &EditorParams) {
        self.launches.lock().push(params.clone());
    }
}
