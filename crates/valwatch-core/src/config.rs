//! Environment-based configuration for the valwatch services.

use std::env;
use std::time::Duration;

/// Chain endpoints consumed by the fetchers.
#[derive(Clone, Debug)]
pub struct ChainConfig {
    /// LCD/REST host, e.g. "lcd.terra.dev" or "lcd.terra.dev:1317".
    pub lcd_host: String,
    /// Local node RPC IP. When absent, node-specific checks are disabled.
    pub node_ip: Option<String>,
}

impl ChainConfig {
    pub fn from_env() -> Self {
        Self {
            lcd_host: env::var("LCD_ENDPOINT")
                .map(|host| format!("{host}:1317"))
                .unwrap_or_else(|_| "lcd.terra.dev".into()),
            node_ip: env::var("NODE_IP").ok().filter(|ip| !ip.is_empty()),
        }
    }

    pub fn lcd_url(&self) -> String {
        format!("http://{}", self.lcd_host)
    }

    pub fn node_rpc_url(&self) -> Option<String> {
        self.node_ip.as_ref().map(|ip| format!("http://{ip}:26657"))
    }
}

/// Chat transport and mirroring configuration.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub telegram_token: String,
    pub slack_webhook: Option<String>,
    /// User ids allowed to invoke privileged operations (reserved for the
    /// voting surface).
    pub allowed_user_ids: Vec<i64>,
}

impl BotConfig {
    pub fn from_env() -> Self {
        Self {
            telegram_token: env::var("TELEGRAM_BOT_TOKEN")
                .expect("TELEGRAM_BOT_TOKEN environment variable must be set"),
            slack_webhook: env::var("SLACK_WEBHOOK").ok().filter(|url| !url.is_empty()),
            allowed_user_ids: env::var("ALLOWED_USER_IDS")
                .map(|ids| {
                    ids.split(',')
                        .filter_map(|id| id.trim().parse().ok())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Scheduling and persistence knobs.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub sentry_interval: Duration,
    /// Sentry node IPs watched by the global sentry job.
    pub sentry_nodes: Vec<String>,
    pub session_path: String,
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        Self {
            poll_interval: Duration::from_secs(
                env::var("POLL_INTERVAL_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
            ),
            sentry_interval: Duration::from_secs(
                env::var("SENTRY_INTERVAL_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            sentry_nodes: env::var("SENTRY_NODES")
                .map(|ips| {
                    ips.split(',')
                        .map(|ip| ip.trim().to_string())
                        .filter(|ip| !ip.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            session_path: env::var("SESSION_PATH")
                .unwrap_or_else(|_| "storage/session.json".into()),
        }
    }
}

/// Combined configuration for the bot process.
#[derive(Clone, Debug)]
pub struct Config {
    pub chain: ChainConfig,
    pub bot: BotConfig,
    pub monitor: MonitorConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            chain: ChainConfig::from_env(),
            bot: BotConfig::from_env(),
            monitor: MonitorConfig::from_env(),
        }
    }
}
