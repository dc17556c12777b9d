//! Common types shared across the valwatch crates.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Telegram chat identifier.
pub type ChatId = i64;

/// Bonding state of a validator, as encoded by the LCD (0/1/2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ValidatorStatus {
    Unbonded,
    Unbonding,
    Bonded,
}

impl TryFrom<u8> for ValidatorStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ValidatorStatus::Unbonded),
            1 => Ok(ValidatorStatus::Unbonding),
            2 => Ok(ValidatorStatus::Bonded),
            other => Err(format!("unknown validator status: {other}")),
        }
    }
}

impl From<ValidatorStatus> for u8 {
    fn from(status: ValidatorStatus) -> u8 {
        match status {
            ValidatorStatus::Unbonded => 0,
            ValidatorStatus::Unbonding => 1,
            ValidatorStatus::Bonded => 2,
        }
    }
}

impl fmt::Display for ValidatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidatorStatus::Unbonded => "Unbonded",
            ValidatorStatus::Unbonding => "Unbonding",
            ValidatorStatus::Bonded => "Bonded",
        };
        write!(f, "{name}")
    }
}

/// Last-known validator attributes for one monitored address.
///
/// The three fields are always replaced together; a snapshot never holds a
/// partially applied update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub status: ValidatorStatus,
    pub jailed: bool,
    /// Decimal string as reported by the LCD, e.g. "100.000000".
    pub delegator_shares: String,
}

impl NodeSnapshot {
    /// Delegator shares truncated to a whole number for display.
    pub fn shares_truncated(&self) -> i64 {
        self.delegator_shares.parse::<f64>().unwrap_or(0.0) as i64
    }
}

/// Block-height liveness state for the monitored node.
///
/// `JustStuck` and `JustRecovered` are the alerting edges; both decay on the
/// next tick, so a stall or recovery alerts exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightState {
    #[default]
    Healthy,
    JustStuck,
    Stuck,
    JustRecovered,
}

fn default_true() -> bool {
    true
}

/// Per-chat monitoring state. Owned by one chat; mutated only by that chat's
/// poll task and interactive handlers, which take the same lock.
///
/// Latch defaults are optimistic so that the very first failed observation
/// after startup still alerts, while a healthy first observation stays silent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserState {
    /// Monitored validator addresses and their last-known snapshots.
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeSnapshot>,

    #[serde(default = "default_true")]
    pub lcd_reachable: bool,

    #[serde(default = "default_true")]
    pub node_reachable: bool,

    /// Per-address price-feed health latch; an address absent from the map is
    /// considered healthy.
    #[serde(default)]
    pub price_feed_healthy: BTreeMap<String, bool>,

    #[serde(default)]
    pub catching_up: bool,

    #[serde(default)]
    pub height_state: HeightState,

    #[serde(default)]
    pub last_height: Option<u64>,

    /// Total proposal count at the last poll. `None` until first seeded, so a
    /// fresh chat is never flooded with announcements for old proposals.
    #[serde(default)]
    pub proposals_seen: Option<u64>,

    /// Proposal ids currently in their voting period, watched for resolution.
    #[serde(default)]
    pub active_proposals: BTreeSet<u64>,
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            lcd_reachable: true,
            node_reachable: true,
            price_feed_healthy: BTreeMap::new(),
            catching_up: false,
            height_state: HeightState::Healthy,
            last_height: None,
            proposals_seen: None,
            active_proposals: BTreeSet::new(),
        }
    }
}

impl UserState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the price feed for `address` was healthy at the last poll.
    pub fn price_feed_was_healthy(&self, address: &str) -> bool {
        self.price_feed_healthy.get(address).copied().unwrap_or(true)
    }
}

/// Process-wide sentry sync latches, keyed by node IP. Owned exclusively by
/// the sentry task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentryState {
    #[serde(default)]
    pub syncing: BTreeMap<String, bool>,
}
