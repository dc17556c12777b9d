//! Notification templates. Rendering only; no state lives here.

use valwatch_client::Proposal;

pub const LCD_UNREACHABLE: &str = "The public Lite Client Daemon (LCD) cannot be reached! 💀\n\
     Node monitoring will be restricted to node specific attributes until it is reachable again.";

pub const LCD_REACHABLE_AGAIN: &str = "The public Lite Client Daemon (LCD) is reachable again! 👌\n\
     Monitoring of publicly available node attributes resumes.";

pub fn node_unreachable(node_ip: &str) -> String {
    format!(
        "The specified Node cannot be reached! 💀\nIP: {node_ip}\n\
         Node monitoring will be restricted to publicly available node attributes \
         until it is reachable again.\n\nPlease check your node immediately!"
    )
}

pub const NODE_REACHABLE_AGAIN: &str = "The specified Node is reachable again! 👌\n\
     Monitoring of node specific attributes resumes.";

pub fn node_retired(address: &str) -> String {
    format!(
        "Node is not active anymore! 💀\nAddress: {address}\n\n\
         Please enter another Node address."
    )
}

pub fn price_feed_unhealthy(address: &str) -> String {
    format!("Price feed is not healthy anymore! 💀\nAddress: {address}")
}

pub fn price_feed_healthy_again(address: &str) -> String {
    format!("Price feed is healthy again! 👌\nAddress: {address}")
}

pub fn catching_up(node_ip: &str, height: u64) -> String {
    format!(
        "The Node is behind the latest block height and catching up! 💀\n\
         IP: {node_ip}\nCurrent block height: {height}\n\n\
         Please check your node immediately!"
    )
}

pub fn caught_up(node_ip: &str, height: u64) -> String {
    format!(
        "The node caught up to the latest block height again! 👌\n\
         IP: {node_ip}\nCurrent block height: {height}"
    )
}

pub fn height_stuck(node_ip: &str, height: u64) -> String {
    format!(
        "Block height is not increasing anymore! 💀\n\
         IP: {node_ip}\nBlock height stuck at: {height}\n\n\
         Please check your node immediately!"
    )
}

pub fn height_recovered(node_ip: &str, height: u64) -> String {
    format!(
        "Block height is increasing again! 👌\n\
         IP: {node_ip}\nBlock height now at: {height}"
    )
}

pub fn sentry_started_syncing(node_ip: &str) -> String {
    format!(
        "Your sentry node *{node_ip}* is syncing with the network...🚧\n\
         I will notify you when it's done!"
    )
}

pub fn sentry_finished_syncing(node_ip: &str) -> String {
    format!("Your sentry node *{node_ip}* is fully synced again!👌")
}

pub const RESTART_NOTICE: &str = "Hello there!\n\
     Me, your node monitoring bot, just got restarted on the server! 🤖\n\
     To make sure you have the latest features, please start a fresh chat \
     with me by typing /start.";

/// `True`/`False` capitalized for the chat templates.
pub fn bool_text(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub fn proposal_to_text(proposal: &Proposal) -> String {
    let start = proposal.voting_start_time.format("%A %B %d, %H:%M");
    let end = proposal.voting_end_time.format("%A %B %d, %H:%M");

    let mut text = format!(
        "*Title:*\n{}\n*Type:*\n{}\n*Description:*\n{}\n\n\
         *Voting Start Time:* {start} UTC\n*Voting End Time:* {end} UTC\n\n",
        proposal.content.value.title,
        proposal.content.proposal_type,
        proposal.content.value.description,
    );

    if proposal.proposal_status == "Rejected" || proposal.proposal_status == "Passed" {
        text.push_str(&format!("Result: *{}*\n\n", proposal.proposal_status));
    } else {
        text.push_str(&format!(
            "Make sure to vote on this governance proposal until *{end} UTC*!"
        ));
    }

    text
}

pub fn new_proposal(proposal: &Proposal) -> String {
    format!(
        "A new governance proposal got submitted! 📣\n\n{}",
        proposal_to_text(proposal)
    )
}

pub fn proposal_ended(proposal: &Proposal) -> String {
    let tally = proposal.final_tally_result.clone().unwrap_or_default();
    format!(
        "*‼️ This proposal has ended ‼️*\n\n{}\n\n*Results:*\n\n\
         *✅ Yes*: {}\n*❌ No*: {}\n*❌❌ No with veto*: {}\n*🤷 Abstain*: {}\n",
        proposal_to_text(proposal),
        tally.yes,
        tally.no,
        tally.no_with_veto,
        tally.abstain,
    )
}
