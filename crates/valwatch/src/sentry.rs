//! Global sentry-node sync watcher.
//!
//! Runs on its own timer, independent of the per-user poll jobs. The latches
//! are process-wide: one flip broadcasts to every registered chat. The state
//! is owned by this task alone, so no locking is involved.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use valwatch_client::SentryClient;
use valwatch_core::SentryState;

use crate::messages;
use crate::notify::Notifier;
use crate::registry::Registry;

/// Latch one sentry observation; a flip yields the broadcast text. The latch
/// starts at "not syncing", so a node first seen mid-sync alerts immediately.
pub fn check_sentry_node(state: &mut SentryState, node_ip: &str, syncing_now: bool) -> Option<String> {
    let was_syncing = state.syncing.entry(node_ip.to_string()).or_insert(false);
    if *was_syncing == syncing_now {
        return None;
    }
    *was_syncing = syncing_now;

    if syncing_now {
        Some(messages::sentry_started_syncing(node_ip))
    } else {
        Some(messages::sentry_finished_syncing(node_ip))
    }
}

/// The recurring sentry task. Never returns; the caller spawns it.
pub async fn run(
    client: SentryClient,
    nodes: Vec<String>,
    interval: Duration,
    registry: Arc<Registry>,
    notifier: Arc<Notifier>,
) {
    info!(count = nodes.len(), "Starting sentry watcher");
    let mut state = SentryState::default();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        for node_ip in &nodes {
            let syncing = match client.syncing(node_ip).await {
                Ok(syncing) => syncing,
                Err(e) => {
                    error!(node_ip, %e, "Sentry probe failed; retrying next tick");
                    continue;
                }
            };
            if let Some(text) = check_sentry_node(&mut state, node_ip, syncing) {
                notifier.broadcast(&registry.chat_ids(), &text).await;
            }
        }
    }
}
