//! Oracle price-feed health latch.
//!
//! The latch is kept per monitored address: with several addresses under
//! watch, each one flips and recovers independently of the others.

use valwatch_core::UserState;

use crate::messages;

/// Latch the derived feed health for `address`; a flip yields one message
/// naming the address.
pub fn check_price_feed(state: &mut UserState, address: &str, healthy_now: bool) -> Option<String> {
    let was_healthy = state.price_feed_was_healthy(address);

    match (was_healthy, healthy_now) {
        (true, false) => {
            state.price_feed_healthy.insert(address.to_string(), false);
            Some(messages::price_feed_unhealthy(address))
        }
        (false, true) => {
            state.price_feed_healthy.insert(address.to_string(), true);
            Some(messages::price_feed_healthy_again(address))
        }
        _ => None,
    }
}
