//! In-memory fakes shared by the orchestrator, scheduler, and registry tests.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use valwatch_client::{ChainApi, NodeApi, PrevoteSet, Proposal, SyncInfo, Validator};
use valwatch_core::{ChatId, DeliveryError, FetchError, SessionStore, UserState};

use crate::notify::ChatTransport;

#[derive(Default)]
pub struct FakeChain {
    lcd_down: Mutex<bool>,
    validators: Mutex<BTreeMap<String, Option<Validator>>>,
    validator_error: Mutex<bool>,
    prevotes: Mutex<BTreeMap<String, PrevoteSet>>,
    proposals: Mutex<Vec<Proposal>>,
    validator_fetches: AtomicUsize,
}

impl FakeChain {
    pub fn set_lcd_reachable(&self, reachable: bool) {
        *self.lcd_down.lock().unwrap() = !reachable;
    }

    pub fn set_validator(&self, address: &str, validator: Option<Validator>) {
        self.validators
            .lock()
            .unwrap()
            .insert(address.to_string(), validator);
    }

    pub fn set_validator_error(&self, failing: bool) {
        *self.validator_error.lock().unwrap() = failing;
    }

    pub fn set_prevotes(&self, address: &str, prevotes: PrevoteSet) {
        self.prevotes
            .lock()
            .unwrap()
            .insert(address.to_string(), prevotes);
    }

    pub fn set_proposals(&self, proposals: Vec<Proposal>) {
        *self.proposals.lock().unwrap() = proposals;
    }

    pub fn validator_fetches(&self) -> usize {
        self.validator_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainApi for FakeChain {
    async fn lcd_reachable(&self) -> bool {
        !*self.lcd_down.lock().unwrap()
    }

    async fn validator(&self, address: &str) -> Result<Option<Validator>, FetchError> {
        self.validator_fetches.fetch_add(1, Ordering::SeqCst);
        if *self.validator_error.lock().unwrap() {
            return Err(FetchError::Connectivity("validator endpoint down".into()));
        }
        Ok(self
            .validators
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .flatten())
    }

    async fn validators(&self) -> Result<Vec<Validator>, FetchError> {
        if *self.validator_error.lock().unwrap() {
            return Err(FetchError::Connectivity("validator endpoint down".into()));
        }
        Ok(self
            .validators
            .lock()
            .unwrap()
            .values()
            .filter_map(|v| v.clone())
            .collect())
    }

    async fn prevotes(&self, address: &str) -> Result<PrevoteSet, FetchError> {
        self.prevotes
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| FetchError::Connectivity("oracle endpoint down".into()))
    }

    async fn proposals(&self) -> Result<Vec<Proposal>, FetchError> {
        Ok(self.proposals.lock().unwrap().clone())
    }
}

pub struct FakeNode {
    reachable: Mutex<bool>,
    status: Mutex<Option<SyncInfo>>,
    status_fetches: AtomicUsize,
}

impl Default for FakeNode {
    fn default() -> Self {
        Self {
            reachable: Mutex::new(true),
            status: Mutex::new(None),
            status_fetches: AtomicUsize::new(0),
        }
    }
}

impl FakeNode {
    pub fn set_reachable(&self, reachable: bool) {
        *self.reachable.lock().unwrap() = reachable;
    }

    pub fn set_status(&self, status: SyncInfo) {
        *self.status.lock().unwrap() = Some(status);
    }

    pub fn status_fetches(&self) -> usize {
        self.status_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeApi for FakeNode {
    async fn reachable(&self) -> bool {
        *self.reachable.lock().unwrap()
    }

    async fn sync_status(&self) -> Result<SyncInfo, FetchError> {
        self.status_fetches.fetch_add(1, Ordering::SeqCst);
        self.status
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| FetchError::Connectivity("status endpoint down".into()))
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(ChatId, String)>>,
    blocked: Mutex<HashSet<ChatId>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn block_user(&self, chat_id: ChatId) {
        self.blocked.lock().unwrap().insert(chat_id);
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        _with_home_menu: bool,
    ) -> Result<(), DeliveryError> {
        if self.blocked.lock().unwrap().contains(&chat_id) {
            return Err(DeliveryError::Blocked);
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    states: Mutex<BTreeMap<ChatId, UserState>>,
}

impl SessionStore for MemoryStore {
    fn load_all(&self) -> io::Result<BTreeMap<ChatId, UserState>> {
        Ok(self.states.lock().unwrap().clone())
    }

    fn save(&self, chat_id: ChatId, state: &UserState) -> io::Result<()> {
        self.states.lock().unwrap().insert(chat_id, state.clone());
        Ok(())
    }

    fn remove(&self, chat_id: ChatId) -> io::Result<()> {
        self.states.lock().unwrap().remove(&chat_id);
        Ok(())
    }
}
