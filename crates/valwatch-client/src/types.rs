//! Wire types for the LCD/REST and node RPC payloads, limited to the fields
//! the checks consume.

use chrono::{DateTime, Utc};
use serde::{de::Error as SerdeError, Deserialize, Deserializer};
use serde_json::Value;

use valwatch_core::{NodeSnapshot, ValidatorStatus};

/// The LCD encodes most numbers as JSON strings; accept either.
fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::String(s) => s
            .parse()
            .map_err(|_| SerdeError::custom(format!("invalid integer string: {s}"))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| SerdeError::custom("expected an unsigned integer")),
        _ => Err(SerdeError::custom("expected string or number")),
    }
}

/// LCD responses wrap the payload in `{"height": ..., "result": ...}`.
#[derive(Debug, Deserialize)]
pub(crate) struct LcdResponse<T> {
    #[serde(default, deserialize_with = "opt_u64_from_string_or_number")]
    pub height: Option<u64>,
    pub result: T,
}

fn opt_u64_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::Null => Ok(None),
        Value::String(s) => s
            .parse()
            .map(Some)
            .map_err(|_| SerdeError::custom(format!("invalid integer string: {s}"))),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| SerdeError::custom("expected an unsigned integer")),
        _ => Err(SerdeError::custom("expected string or number")),
    }
}

/// A validator record from `/staking/validators`.
#[derive(Debug, Clone, Deserialize)]
pub struct Validator {
    pub operator_address: String,
    pub status: ValidatorStatus,
    #[serde(default)]
    pub jailed: bool,
    pub delegator_shares: String,
}

impl Validator {
    /// The attribute subset cached and diffed per poll.
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            status: self.status,
            jailed: self.jailed,
            delegator_shares: self.delegator_shares.clone(),
        }
    }
}

/// Sync state from the node RPC `/status` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncInfo {
    pub catching_up: bool,
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub latest_block_height: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodeStatus {
    pub sync_info: SyncInfo,
}

/// One oracle prevote from `/oracle/voters/{address}/prevotes`.
#[derive(Debug, Clone, Deserialize)]
pub struct Prevote {
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub submit_block: u64,
}

/// A prevote listing together with the height it was reported at.
#[derive(Debug, Clone)]
pub struct PrevoteSet {
    pub height: u64,
    pub prevotes: Vec<Prevote>,
}

/// A submission older than this many blocks marks the feed unhealthy.
pub const PREVOTE_FRESHNESS_WINDOW: u64 = 10;

impl PrevoteSet {
    /// Healthy iff every prevote is within the freshness window of the
    /// reported height.
    pub fn is_healthy(&self) -> bool {
        let floor = self.height.saturating_sub(PREVOTE_FRESHNESS_WINDOW);
        self.prevotes.iter().all(|p| p.submit_block >= floor)
    }
}

/// Voting status string used by the LCD for proposals in their voting period.
pub const STATUS_VOTING_PERIOD: &str = "VotingPeriod";

/// A governance proposal from `/gov/proposals`.
#[derive(Debug, Clone, Deserialize)]
pub struct Proposal {
    #[serde(deserialize_with = "u64_from_string_or_number")]
    pub id: u64,
    pub proposal_status: String,
    pub content: ProposalContent,
    pub voting_start_time: DateTime<Utc>,
    pub voting_end_time: DateTime<Utc>,
    #[serde(default)]
    pub final_tally_result: Option<TallyResult>,
}

impl Proposal {
    pub fn is_voting(&self) -> bool {
        self.proposal_status == STATUS_VOTING_PERIOD
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalContent {
    #[serde(rename = "type")]
    pub proposal_type: String,
    pub value: ProposalValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalValue {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Final vote breakdown, kept as the LCD's decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TallyResult {
    #[serde(default)]
    pub yes: String,
    #[serde(default)]
    pub no: String,
    #[serde(default)]
    pub no_with_veto: String,
    #[serde(default)]
    pub abstain: String,
}
