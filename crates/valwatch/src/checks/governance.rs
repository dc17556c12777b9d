//! Governance proposal lifecycle: new-proposal announcements and resolution
//! of proposals that left their voting period. Both run off one fetch.

use valwatch_client::Proposal;
use valwatch_core::UserState;

use crate::messages;

/// Run both governance sub-checks and return the rendered messages in order
/// (announcements first, then resolutions).
pub fn check_proposals(state: &mut UserState, proposals: &[Proposal]) -> Vec<String> {
    let mut out = announce_new(state, proposals);
    out.extend(resolve_ended(state, proposals));
    out
}

/// The proposal feed is append-only and ordered by creation, so a count
/// increase identifies the newly appended entries by index range. The first
/// poll seeds the count without announcing anything.
fn announce_new(state: &mut UserState, proposals: &[Proposal]) -> Vec<String> {
    let total = proposals.len() as u64;

    let seen = match state.proposals_seen {
        Some(seen) => seen,
        None => {
            state.proposals_seen = Some(total);
            return Vec::new();
        }
    };

    let new: Vec<String> = proposals
        .iter()
        .skip(seen as usize)
        .map(messages::new_proposal)
        .collect();

    state.proposals_seen = Some(total);
    new
}

/// Watch every proposal currently in its voting period; once a watched id is
/// no longer in the active filter, announce its final tally and stop watching
/// it. The union into the watched set is idempotent, so an id never alerts
/// twice.
fn resolve_ended(state: &mut UserState, proposals: &[Proposal]) -> Vec<String> {
    let watched: Vec<u64> = state.active_proposals.iter().copied().collect();

    for proposal in proposals.iter().filter(|p| p.is_voting()) {
        state.active_proposals.insert(proposal.id);
    }

    let mut out = Vec::new();
    for id in watched {
        let still_active = proposals.iter().any(|p| p.id == id && p.is_voting());
        if still_active {
            continue;
        }
        state.active_proposals.remove(&id);
        if let Some(past) = proposals.iter().find(|p| p.id == id) {
            out.push(messages::proposal_ended(past));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use valwatch_client::{ProposalContent, ProposalValue, TallyResult};

    fn proposal(id: u64, status: &str, title: &str) -> Proposal {
        Proposal {
            id,
            proposal_status: status.into(),
            content: ProposalContent {
                proposal_type: "gov/TextProposal".into(),
                value: ProposalValue {
                    title: title.into(),
                    description: String::new(),
                },
            },
            voting_start_time: Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap(),
            voting_end_time: Utc.with_ymd_and_hms(2020, 6, 15, 12, 0, 0).unwrap(),
            final_tally_result: Some(TallyResult {
                yes: "10".into(),
                no: "1".into(),
                no_with_veto: "0".into(),
                abstain: "2".into(),
            }),
        }
    }

    #[test]
    fn first_poll_seeds_count_silently() {
        let mut state = UserState::new();
        let feed = vec![proposal(1, "Passed", "One"), proposal(2, "Passed", "Two")];
        assert!(check_proposals(&mut state, &feed).is_empty());
        assert_eq!(state.proposals_seen, Some(2));
    }

    #[test]
    fn k_appended_proposals_yield_k_announcements() {
        let mut state = UserState::new();
        let mut feed = vec![proposal(1, "Passed", "One")];
        check_proposals(&mut state, &feed);

        feed.push(proposal(2, "Deposit", "Two"));
        feed.push(proposal(3, "Deposit", "Three"));
        let out = check_proposals(&mut state, &feed);

        assert_eq!(out.len(), 2);
        assert!(out[0].contains("Two"));
        assert!(out[1].contains("Three"));
        assert_eq!(state.proposals_seen, Some(3));

        // Unchanged feed on the next tick is silent.
        assert!(check_proposals(&mut state, &feed).is_empty());
    }

    #[test]
    fn active_proposal_resolution_reports_tally_once() {
        let mut state = UserState::new();
        let mut feed = vec![proposal(1, "VotingPeriod", "One")];
        check_proposals(&mut state, &feed);
        assert!(state.active_proposals.contains(&1));

        // Still voting: nothing to report.
        assert!(check_proposals(&mut state, &feed).is_empty());

        feed[0].proposal_status = "Passed".into();
        let out = check_proposals(&mut state, &feed);
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("This proposal has ended"));
        assert!(out[0].contains("*✅ Yes*: 10"));
        assert!(!state.active_proposals.contains(&1));

        // Resolved ids never alert again.
        assert!(check_proposals(&mut state, &feed).is_empty());
    }

    #[test]
    fn new_proposal_entering_voting_is_watched() {
        let mut state = UserState::new();
        let mut feed = vec![proposal(1, "Deposit", "One")];
        check_proposals(&mut state, &feed);

        feed[0].proposal_status = "VotingPeriod".into();
        check_proposals(&mut state, &feed);
        assert!(state.active_proposals.contains(&1));
    }
}
