//! Endpoint reachability latches for the public LCD and the operator's node.
//!
//! Both start optimistic, so the very first unreachable observation after
//! startup still alerts.

use valwatch_core::UserState;

use crate::messages;

/// Latch the LCD reachability observation; a flip yields one message.
pub fn check_lcd_reachable(state: &mut UserState, reachable_now: bool) -> Option<String> {
    match (state.lcd_reachable, reachable_now) {
        (true, false) => {
            state.lcd_reachable = false;
            Some(messages::LCD_UNREACHABLE.to_string())
        }
        (false, true) => {
            state.lcd_reachable = true;
            Some(messages::LCD_REACHABLE_AGAIN.to_string())
        }
        _ => None,
    }
}

/// Latch the node RPC reachability observation; a flip yields one message.
pub fn check_node_reachable(
    state: &mut UserState,
    reachable_now: bool,
    node_ip: &str,
) -> Option<String> {
    match (state.node_reachable, reachable_now) {
        (true, false) => {
            state.node_reachable = false;
            Some(messages::node_unreachable(node_ip))
        }
        (false, true) => {
            state.node_reachable = true;
            Some(messages::NODE_REACHABLE_AGAIN.to_string())
        }
        _ => None,
    }
}
