//! Valwatch binary: wires configuration, clients, and the per-chat jobs.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use valwatch_client::{ChainApi, LcdClient, NodeApi, NodeRpcClient, SentryClient};
use valwatch_core::{Config, JsonFileStore, SessionStore};

use valwatch::messages;
use valwatch::monitor::{Monitor, NodeTarget};
use valwatch::notify::{ChatTransport, Delivery, Notifier};
use valwatch::registry::Registry;
use valwatch::scheduler::Scheduler;
use valwatch::sentry;
use valwatch::telegram::TelegramClient;

#[derive(Parser)]
#[command(name = "valwatch")]
#[command(version)]
#[command(about = "Validator node monitoring bot", long_about = None)]
struct Cli {
    /// Path of the persisted session file (overrides SESSION_PATH)
    #[arg(long)]
    session: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    valwatch_core::tracing_setup::init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(path) = cli.session {
        config.monitor.session_path = path;
    }

    if config.chain.node_ip.is_none() {
        info!("No NODE_IP configured; node-specific checks are disabled");
    }
    if !config.bot.allowed_user_ids.is_empty() {
        info!(
            allowed = ?config.bot.allowed_user_ids,
            "Users allowed to invoke protected operations"
        );
    }

    let store: Arc<dyn SessionStore> =
        Arc::new(JsonFileStore::new(&config.monitor.session_path));
    let transport: Arc<dyn ChatTransport> =
        Arc::new(TelegramClient::new(&config.bot.telegram_token));

    let (removals_tx, mut removals_rx) = mpsc::unbounded_channel();
    let notifier = Arc::new(Notifier::new(
        transport,
        Arc::clone(&store),
        removals_tx,
        config.bot.slack_webhook.clone(),
    ));

    let chain: Arc<dyn ChainApi> = Arc::new(LcdClient::new(config.chain.lcd_url()));
    let node_target = config.chain.node_rpc_url().map(|url| NodeTarget {
        ip: config.chain.node_ip.clone().unwrap_or_default(),
        api: Arc::new(NodeRpcClient::new(url)) as Arc<dyn NodeApi>,
    });

    let monitor = Arc::new(Monitor::new(
        chain,
        node_target,
        Arc::clone(&notifier),
        Arc::clone(&store),
    ));
    let scheduler = Arc::new(Scheduler::new(config.monitor.poll_interval));
    let registry = Arc::new(Registry::new(
        Arc::clone(&store),
        Arc::clone(&scheduler),
        Arc::clone(&monitor),
    ));

    // Re-attach every persisted chat and tell them about the restart. A
    // blocked user is already torn down by the fan-out; just skip the job.
    let sessions = store.load_all().context("Failed to load session store")?;
    info!(chats = sessions.len(), "Re-attaching persisted chats");
    for (chat_id, state) in sessions {
        match notifier.notify(chat_id, messages::RESTART_NOTICE).await {
            Delivery::UserGone => continue,
            Delivery::Delivered | Delivery::Failed => {
                registry.attach_existing(chat_id, state);
            }
        }
    }

    if !config.monitor.sentry_nodes.is_empty() {
        tokio::spawn(sentry::run(
            SentryClient::new(),
            config.monitor.sentry_nodes.clone(),
            config.monitor.sentry_interval,
            Arc::clone(&registry),
            Arc::clone(&notifier),
        ));
    }

    // Removal signals from the fan-out cancel the chat's recurring job.
    let removal_scheduler = Arc::clone(&scheduler);
    let removal_registry = Arc::clone(&registry);
    tokio::spawn(async move {
        while let Some(chat_id) = removals_rx.recv().await {
            removal_scheduler.remove(chat_id);
            removal_registry.forget(chat_id);
        }
    });

    info!("Valwatch bot is running ...");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received; exiting");
    Ok(())
}
