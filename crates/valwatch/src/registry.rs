//! User registry: the node-collection operations the chat layer calls.
//!
//! Each chat's state lives behind one async mutex shared by its poll job and
//! the interactive operations here, so a handler never races its own chat's
//! poll. Job creation is idempotent via the scheduler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use valwatch_client::Validator;
use valwatch_core::{ChatId, NodeSnapshot, SessionStore, UserState};

use crate::monitor::Monitor;
use crate::scheduler::Scheduler;

type SharedState = Arc<tokio::sync::Mutex<UserState>>;

pub struct Registry {
    chats: Mutex<HashMap<ChatId, SharedState>>,
    store: Arc<dyn SessionStore>,
    scheduler: Arc<Scheduler>,
    monitor: Arc<Monitor>,
}

impl Registry {
    pub fn new(
        store: Arc<dyn SessionStore>,
        scheduler: Arc<Scheduler>,
        monitor: Arc<Monitor>,
    ) -> Self {
        Self {
            chats: Mutex::new(HashMap::new()),
            store,
            scheduler,
            monitor,
        }
    }

    /// Re-attach a chat loaded from the session store at startup.
    pub fn attach_existing(&self, chat_id: ChatId, state: UserState) -> SharedState {
        let shared = Arc::new(tokio::sync::Mutex::new(state));
        self.chats.lock().unwrap().insert(chat_id, Arc::clone(&shared));
        self.scheduler
            .ensure_job(chat_id, Arc::clone(&shared), Arc::clone(&self.monitor));
        shared
    }

    /// First contact for a chat: create fresh state and start its poll job.
    /// Safe to call repeatedly; an existing chat keeps its state and job.
    pub fn register(&self, chat_id: ChatId) -> SharedState {
        use std::collections::hash_map::Entry;

        let (shared, created) = {
            let mut chats = self.chats.lock().unwrap();
            match chats.entry(chat_id) {
                Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
                Entry::Vacant(entry) => {
                    let shared = Arc::new(tokio::sync::Mutex::new(UserState::new()));
                    entry.insert(Arc::clone(&shared));
                    (shared, true)
                }
            }
        };
        if created {
            if let Err(e) = self.store.save(chat_id, &UserState::new()) {
                warn!(chat_id, %e, "Failed to persist new session");
            }
        }
        self.scheduler
            .ensure_job(chat_id, Arc::clone(&shared), Arc::clone(&self.monitor));
        shared
    }

    fn shared_state(&self, chat_id: ChatId) -> Option<SharedState> {
        self.chats.lock().unwrap().get(&chat_id).cloned()
    }

    /// Start monitoring `address` with its initial snapshot.
    pub async fn add_node(&self, chat_id: ChatId, address: &str, snapshot: NodeSnapshot) -> bool {
        let Some(shared) = self.shared_state(chat_id) else {
            return false;
        };
        let mut state = shared.lock().await;
        state.nodes.insert(address.to_string(), snapshot);
        self.persist(chat_id, &state);
        true
    }

    /// Bulk-add every validator currently in the set, skipping known ones.
    pub async fn add_all_nodes(&self, chat_id: ChatId, validators: &[Validator]) -> usize {
        let Some(shared) = self.shared_state(chat_id) else {
            return 0;
        };
        let mut state = shared.lock().await;
        let mut added = 0;
        for validator in validators {
            if !state.nodes.contains_key(&validator.operator_address) {
                state
                    .nodes
                    .insert(validator.operator_address.clone(), validator.snapshot());
                added += 1;
            }
        }
        if added > 0 {
            self.persist(chat_id, &state);
        }
        added
    }

    /// Stop monitoring `address`, dropping its per-address latches with it.
    pub async fn remove_node(&self, chat_id: ChatId, address: &str) -> bool {
        let Some(shared) = self.shared_state(chat_id) else {
            return false;
        };
        let mut state = shared.lock().await;
        let removed = state.nodes.remove(address).is_some();
        if removed {
            state.price_feed_healthy.remove(address);
            self.persist(chat_id, &state);
        }
        removed
    }

    /// Chat ids with live state, for global broadcasts.
    pub fn chat_ids(&self) -> Vec<ChatId> {
        self.chats.lock().unwrap().keys().copied().collect()
    }

    /// Drop a chat after its user revoked access. The persisted record is
    /// already gone; this clears the in-memory side.
    pub fn forget(&self, chat_id: ChatId) {
        self.chats.lock().unwrap().remove(&chat_id);
    }

    fn persist(&self, chat_id: ChatId, state: &UserState) {
        if let Err(e) = self.store.save(chat_id, state) {
            warn!(chat_id, %e, "Failed to persist session state");
        }
    }
}
