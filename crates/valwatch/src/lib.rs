//! Valwatch - Validator node monitoring bot.
//!
//! Per-chat recurring polls diff remote validator/node state against a cached
//! snapshot and push transition notifications to Telegram, optionally
//! mirrored to Slack.

pub mod checks;
pub mod messages;
pub mod monitor;
pub mod notify;
pub mod registry;
pub mod scheduler;
pub mod sentry;
pub mod telegram;

#[cfg(test)]
mod testutil;
