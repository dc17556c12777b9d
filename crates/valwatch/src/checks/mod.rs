//! Per-check state machines.
//!
//! Each check is a pure transition over (latched state, freshly observed
//! value): it updates the latch on the user's state and returns zero or one
//! rendered message. Fetching and delivery stay in the orchestrator, so every
//! transition here is testable without I/O.

pub mod governance;
pub mod price_feed;
pub mod reachability;
pub mod sync;
pub mod validator;
