//! Persisted per-chat session state.
//!
//! The store is an explicit collaborator injected where needed, never a
//! global: loaded once at startup, flushed on mutation, torn down per chat
//! when a user is removed. Durability is best effort; losing the file simply
//! re-initializes every latch optimistically.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::types::{ChatId, UserState};

/// Load-at-startup, flush-on-mutation session persistence.
pub trait SessionStore: Send + Sync {
    fn load_all(&self) -> io::Result<BTreeMap<ChatId, UserState>>;
    fn save(&self, chat_id: ChatId, state: &UserState) -> io::Result<()>;
    fn remove(&self, chat_id: ChatId) -> io::Result<()>;
}

/// JSON file holding one record per chat, keyed by chat id.
pub struct JsonFileStore {
    path: PathBuf,
    lock: std::sync::Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: std::sync::Mutex::new(()),
        }
    }

    fn read_map(&self) -> io::Result<BTreeMap<ChatId, UserState>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str::<BTreeMap<String, UserState>>(&raw)
                .map(|map| {
                    map.into_iter()
                        .filter_map(|(id, state)| id.parse().ok().map(|id| (id, state)))
                        .collect()
                })
                .map_err(|e| {
                    warn!(path = %self.path.display(), %e, "Discarding unreadable session file");
                    io::Error::new(io::ErrorKind::InvalidData, e)
                }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e),
        }
    }

    fn write_map(&self, map: &BTreeMap<ChatId, UserState>) -> io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|dir| *dir != Path::new("")) {
            fs::create_dir_all(dir)?;
        }
        let keyed: BTreeMap<String, &UserState> =
            map.iter().map(|(id, state)| (id.to_string(), state)).collect();
        let raw = serde_json::to_string_pretty(&keyed)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, raw)
    }
}

impl SessionStore for JsonFileStore {
    fn load_all(&self) -> io::Result<BTreeMap<ChatId, UserState>> {
        let _guard = self.lock.lock().unwrap();
        // A corrupt file starts everyone over with optimistic latches.
        Ok(self.read_map().unwrap_or_default())
    }

    fn save(&self, chat_id: ChatId, state: &UserState) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map().unwrap_or_default();
        map.insert(chat_id, state.clone());
        self.write_map(&map)
    }

    fn remove(&self, chat_id: ChatId) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_map().unwrap_or_default();
        map.remove(&chat_id);
        if map.is_empty() {
            // An empty session file confuses restart re-attachment; drop it.
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e),
            }
        } else {
            self.write_map(&map)
        }
    }
}
