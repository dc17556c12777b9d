//! Poll orchestrator: one invocation runs every check for one chat.
//!
//! Checks run sequentially in a fixed order. A single check's fetch failure
//! is logged and swallowed; the check contributes no state change and no
//! notification for that tick and is retried on the next one. Nothing
//! propagates out of [`Monitor::poll_tick`].

use std::sync::Arc;

use tracing::{info, warn};

use valwatch_client::{ChainApi, NodeApi};
use valwatch_core::{ChatId, SessionStore, UserState};

use crate::checks::{governance, price_feed, reachability, sync, validator};
use crate::notify::{Delivery, Notifier};

/// Node-specific check target; absent when no node IP is configured.
pub struct NodeTarget {
    pub ip: String,
    pub api: Arc<dyn NodeApi>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The chat's user revoked access mid-tick; the caller stops scheduling.
    UserGone,
}

pub struct Monitor {
    chain: Arc<dyn ChainApi>,
    node: Option<NodeTarget>,
    notifier: Arc<Notifier>,
    store: Arc<dyn SessionStore>,
}

impl Monitor {
    pub fn new(
        chain: Arc<dyn ChainApi>,
        node: Option<NodeTarget>,
        notifier: Arc<Notifier>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            chain,
            node,
            notifier,
            store,
        }
    }

    /// The scheduled entry point; safe to invoke once per interval.
    pub async fn poll_tick(&self, chat_id: ChatId, state: &mut UserState) -> TickOutcome {
        if self.run_chain_checks(chat_id, state).await == TickOutcome::UserGone {
            return TickOutcome::UserGone;
        }
        if self.run_node_checks(chat_id, state).await == TickOutcome::UserGone {
            return TickOutcome::UserGone;
        }

        if let Err(e) = self.store.save(chat_id, state) {
            warn!(chat_id, %e, "Failed to persist session state");
        }
        TickOutcome::Continue
    }

    async fn run_chain_checks(&self, chat_id: ChatId, state: &mut UserState) -> TickOutcome {
        let lcd_reachable = self.chain.lcd_reachable().await;
        if let Some(text) = reachability::check_lcd_reachable(state, lcd_reachable) {
            if self.deliver(chat_id, &text).await == TickOutcome::UserGone {
                return TickOutcome::UserGone;
            }
        }
        if !lcd_reachable {
            return TickOutcome::Continue;
        }

        if self.check_validators(chat_id, state).await == TickOutcome::UserGone {
            return TickOutcome::UserGone;
        }
        if self.check_price_feeds(chat_id, state).await == TickOutcome::UserGone {
            return TickOutcome::UserGone;
        }
        self.check_governance(chat_id, state).await
    }

    async fn check_validators(&self, chat_id: ChatId, state: &mut UserState) -> TickOutcome {
        // Addresses whose validators retired are removed only after the
        // iteration completes.
        let mut retired = Vec::new();

        let addresses: Vec<String> = state.nodes.keys().cloned().collect();
        for address in addresses {
            let remote = match self.chain.validator(&address).await {
                Ok(Some(validator)) => validator.snapshot(),
                Ok(None) => {
                    retired.push(address.clone());
                    if self.deliver(chat_id, &validator::retired(&address)).await
                        == TickOutcome::UserGone
                    {
                        return TickOutcome::UserGone;
                    }
                    continue;
                }
                Err(e) => {
                    info!(chat_id, address, %e, "Validator fetch failed; retrying next tick");
                    continue;
                }
            };

            let Some(local) = state.nodes.get_mut(&address) else {
                continue;
            };
            if let Some(text) = validator::diff_and_update(&address, local, &remote) {
                if self.deliver(chat_id, &text).await == TickOutcome::UserGone {
                    return TickOutcome::UserGone;
                }
            }
        }

        for address in retired {
            state.nodes.remove(&address);
            state.price_feed_healthy.remove(&address);
        }
        TickOutcome::Continue
    }

    async fn check_price_feeds(&self, chat_id: ChatId, state: &mut UserState) -> TickOutcome {
        let addresses: Vec<String> = state.nodes.keys().cloned().collect();
        for address in addresses {
            let healthy = match self.chain.prevotes(&address).await {
                Ok(prevotes) => prevotes.is_healthy(),
                Err(e) => {
                    info!(chat_id, address, %e, "Prevote fetch failed; retrying next tick");
                    continue;
                }
            };
            if let Some(text) = price_feed::check_price_feed(state, &address, healthy) {
                if self.deliver(chat_id, &text).await == TickOutcome::UserGone {
                    return TickOutcome::UserGone;
                }
            }
        }
        TickOutcome::Continue
    }

    async fn check_governance(&self, chat_id: ChatId, state: &mut UserState) -> TickOutcome {
        let proposals = match self.chain.proposals().await {
            Ok(proposals) => proposals,
            Err(e) => {
                info!(chat_id, %e, "Proposal fetch failed; retrying next tick");
                return TickOutcome::Continue;
            }
        };
        for text in governance::check_proposals(state, &proposals) {
            if self.deliver(chat_id, &text).await == TickOutcome::UserGone {
                return TickOutcome::UserGone;
            }
        }
        TickOutcome::Continue
    }

    async fn run_node_checks(&self, chat_id: ChatId, state: &mut UserState) -> TickOutcome {
        let Some(target) = &self.node else {
            return TickOutcome::Continue;
        };

        let reachable = target.api.reachable().await;
        if let Some(text) = reachability::check_node_reachable(state, reachable, &target.ip) {
            if self.deliver(chat_id, &text).await == TickOutcome::UserGone {
                return TickOutcome::UserGone;
            }
        }
        if !reachable {
            return TickOutcome::Continue;
        }

        // Catch-up and height liveness share one status fetch.
        let status = match target.api.sync_status().await {
            Ok(status) => status,
            Err(e) => {
                info!(chat_id, %e, "Node status fetch failed; retrying next tick");
                return TickOutcome::Continue;
            }
        };

        let height = status.latest_block_height;
        if let Some(text) = sync::check_catch_up(state, status.catching_up, height, &target.ip) {
            if self.deliver(chat_id, &text).await == TickOutcome::UserGone {
                return TickOutcome::UserGone;
            }
        }
        if let Some(text) = sync::check_block_height(state, height, &target.ip) {
            if self.deliver(chat_id, &text).await == TickOutcome::UserGone {
                return TickOutcome::UserGone;
            }
        }
        TickOutcome::Continue
    }

    async fn deliver(&self, chat_id: ChatId, text: &str) -> TickOutcome {
        match self.notifier.notify(chat_id, text).await {
            Delivery::UserGone => TickOutcome::UserGone,
            Delivery::Delivered | Delivery::Failed => TickOutcome::Continue,
        }
    }
}
