//! Catch-up latch and block-height liveness, sharing one `/status` fetch.

use valwatch_core::{HeightState, UserState};

use crate::messages;

/// Latch the node's catching-up flag; a flip yields one message.
pub fn check_catch_up(
    state: &mut UserState,
    catching_up_now: bool,
    height: u64,
    node_ip: &str,
) -> Option<String> {
    match (state.catching_up, catching_up_now) {
        (false, true) => {
            state.catching_up = true;
            Some(messages::catching_up(node_ip, height))
        }
        (true, false) => {
            state.catching_up = false;
            Some(messages::caught_up(node_ip, height))
        }
        _ => None,
    }
}

/// Advance the height-liveness state machine with a fresh height reading.
///
/// Exactly one alert fires on the first non-increasing step after a healthy
/// run (`Healthy -> JustStuck`) and one on the first increasing step after
/// being stuck (`-> JustRecovered`). A recovery grants one grace tick before
/// the machine can re-enter `JustStuck`. The observed height is stored every
/// tick regardless of branch; the very first observation only seeds it.
pub fn check_block_height(state: &mut UserState, height: u64, node_ip: &str) -> Option<String> {
    let increased = match state.last_height {
        Some(last) => height > last,
        None => true,
    };
    let seeding = state.last_height.is_none();
    state.last_height = Some(height);

    if seeding {
        return None;
    }

    let (next, message) = if increased {
        match state.height_state {
            HeightState::Healthy => (HeightState::Healthy, None),
            HeightState::JustStuck | HeightState::Stuck => (
                HeightState::JustRecovered,
                Some(messages::height_recovered(node_ip, height)),
            ),
            HeightState::JustRecovered => (HeightState::Healthy, None),
        }
    } else {
        match state.height_state {
            HeightState::Healthy => (
                HeightState::JustStuck,
                Some(messages::height_stuck(node_ip, height)),
            ),
            HeightState::JustStuck | HeightState::Stuck => (HeightState::Stuck, None),
            HeightState::JustRecovered => (HeightState::Healthy, None),
        }
    };

    state.height_state = next;
    message
}
