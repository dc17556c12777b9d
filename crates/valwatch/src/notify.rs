//! Notification fan-out: chat transport plus optional Slack mirror.
//!
//! A blocked-user delivery error is the single place where "remove this user"
//! is decided: the persisted record is dropped and the scheduler is signalled
//! to cancel the chat's recurring job.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use valwatch_core::{ChatId, DeliveryError, SessionStore};

/// Outcome of one fan-out delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Transport failed for a transient reason; logged, no state change.
    Failed,
    /// The user revoked access; their state is gone and their job cancelled.
    UserGone,
}

/// Minimal chat transport the fan-out needs.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `text` to `chat_id`; `with_home_menu` attaches the persistent
    /// home-menu keyboard.
    async fn send(
        &self,
        chat_id: ChatId,
        text: &str,
        with_home_menu: bool,
    ) -> Result<(), DeliveryError>;
}

pub struct Notifier {
    transport: Arc<dyn ChatTransport>,
    store: Arc<dyn SessionStore>,
    removals: mpsc::UnboundedSender<ChatId>,
    slack_webhook: Option<String>,
    http: reqwest::Client,
}

impl Notifier {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn SessionStore>,
        removals: mpsc::UnboundedSender<ChatId>,
        slack_webhook: Option<String>,
    ) -> Self {
        Self {
            transport,
            store,
            removals,
            slack_webhook,
            http: reqwest::Client::new(),
        }
    }

    /// Deliver a monitoring notification: chat message with the home-menu
    /// keyboard, mirrored to Slack best-effort.
    pub async fn notify(&self, chat_id: ChatId, text: &str) -> Delivery {
        self.mirror_to_slack(text).await;

        match self.transport.send(chat_id, text, true).await {
            Ok(()) => Delivery::Delivered,
            Err(DeliveryError::Blocked) => {
                self.remove_user(chat_id);
                Delivery::UserGone
            }
            Err(e) => {
                warn!(chat_id, %e, "Failed to deliver notification");
                Delivery::Failed
            }
        }
    }

    /// Broadcast to many chats without tearing anyone down, used by the
    /// sentry job whose messages are global rather than per-user.
    pub async fn broadcast(&self, chat_ids: &[ChatId], text: &str) {
        self.mirror_to_slack(text).await;

        for &chat_id in chat_ids {
            if let Err(e) = self.transport.send(chat_id, text, true).await {
                warn!(chat_id, %e, "Failed to deliver broadcast");
            }
        }
    }

    fn remove_user(&self, chat_id: ChatId) {
        info!(chat_id, "User blocked the bot; removing from the user list");
        if let Err(e) = self.store.remove(chat_id) {
            error!(chat_id, %e, "Failed to remove persisted state");
        }
        let _ = self.removals.send(chat_id);
    }

    async fn mirror_to_slack(&self, text: &str) {
        let Some(webhook) = &self.slack_webhook else {
            return;
        };
        let result = self
            .http
            .post(webhook)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await;
        if let Err(e) = result {
            error!(%e, "Slack webhook post request failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemoryStore;
    use std::sync::Mutex;
    use valwatch_core::UserState;

    struct FlakyTransport {
        error: Mutex<Option<DeliveryError>>,
        sent: Mutex<Vec<(ChatId, String)>>,
    }

    impl FlakyTransport {
        fn new(error: Option<DeliveryError>) -> Self {
            Self {
                error: Mutex::new(error),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for FlakyTransport {
        async fn send(
            &self,
            chat_id: ChatId,
            text: &str,
            _with_home_menu: bool,
        ) -> Result<(), DeliveryError> {
            if let Some(e) = self.error.lock().unwrap().take() {
                return Err(e);
            }
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            Ok(())
        }
    }

    fn store_with_chat(chat_id: ChatId) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::default());
        store.save(chat_id, &UserState::new()).unwrap();
        store
    }

    fn notifier(
        transport: Arc<FlakyTransport>,
        store: Arc<MemoryStore>,
    ) -> (Notifier, mpsc::UnboundedReceiver<ChatId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier::new(transport, store, tx, None), rx)
    }

    #[tokio::test]
    async fn successful_delivery() {
        let transport = Arc::new(FlakyTransport::new(None));
        let store = store_with_chat(7);
        let (notifier, _rx) = notifier(Arc::clone(&transport), Arc::clone(&store));

        assert_eq!(notifier.notify(7, "hello").await, Delivery::Delivered);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
        assert!(store.load_all().unwrap().contains_key(&7));
    }

    #[tokio::test]
    async fn blocked_user_is_torn_down() {
        let transport = Arc::new(FlakyTransport::new(Some(DeliveryError::Blocked)));
        let store = store_with_chat(7);
        let (notifier, mut rx) = notifier(transport, Arc::clone(&store));

        assert_eq!(notifier.notify(7, "hello").await, Delivery::UserGone);
        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(rx.recv().await, Some(7));
    }

    #[tokio::test]
    async fn transient_failure_changes_nothing() {
        let transport = Arc::new(FlakyTransport::new(Some(DeliveryError::Other(
            "timeout".into(),
        ))));
        let store = store_with_chat(7);
        let (notifier, mut rx) = notifier(transport, Arc::clone(&store));

        assert_eq!(notifier.notify(7, "hello").await, Delivery::Failed);
        assert!(store.load_all().unwrap().contains_key(&7));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_never_removes_users() {
        let transport = Arc::new(FlakyTransport::new(Some(DeliveryError::Blocked)));
        let store = store_with_chat(7);
        let (notifier, mut rx) = notifier(Arc::clone(&transport), Arc::clone(&store));

        notifier.broadcast(&[7, 8], "sentry news").await;
        assert!(store.load_all().unwrap().contains_key(&7));
        assert!(rx.try_recv().is_err());
        // The second chat still got its copy.
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
