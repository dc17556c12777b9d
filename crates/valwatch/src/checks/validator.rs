//! Validator attribute diff: status, jailed flag, and delegator shares.

use valwatch_core::NodeSnapshot;

use crate::messages;

/// Compare the cached snapshot against the freshly fetched one. When any of
/// the three attributes changed, render one message listing every change as
/// `old ➡️ new` and overwrite the snapshot wholesale.
pub fn diff_and_update(
    address: &str,
    local: &mut NodeSnapshot,
    remote: &NodeSnapshot,
) -> Option<String> {
    let status_changed = local.status != remote.status;
    let jailed_changed = local.jailed != remote.jailed;
    let shares_changed = local.delegator_shares != remote.delegator_shares;

    if !status_changed && !jailed_changed && !shares_changed {
        return None;
    }

    let mut text = format!("Node: *{address}*\nStatus: *{}*", local.status);
    if status_changed {
        text.push_str(&format!(" ➡️ *{}*", remote.status));
    }

    text.push_str(&format!("\nJailed: *{}*", messages::bool_text(local.jailed)));
    if jailed_changed {
        text.push_str(&format!(" ➡️ *{}*", messages::bool_text(remote.jailed)));
    }

    let local_shares = local.shares_truncated();
    text.push_str(&format!("\nDelegator Shares: *{local_shares}*"));
    if shares_changed {
        let remote_shares = remote.shares_truncated();
        let delta = remote_shares - local_shares;
        let delta = if delta < 0 {
            delta.to_string()
        } else {
            format!("+{delta}")
        };
        text.push_str(&format!(" ➡️ *{remote_shares}* (*Δ* {delta})"));
    }

    *local = remote.clone();
    Some(text)
}

/// Message for a monitored address that disappeared from the validator set.
/// The caller removes the address after its iteration completes.
pub fn retired(address: &str) -> String {
    messages::node_retired(address)
}
