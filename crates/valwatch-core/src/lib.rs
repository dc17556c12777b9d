//! Valwatch Core - Shared types, configuration, and persistence for the
//! validator monitoring bot.

pub mod config;
pub mod error;
pub mod store;
pub mod tracing_setup;
pub mod types;

pub use config::Config;
pub use error::{DeliveryError, FetchError};
pub use store::{JsonFileStore, SessionStore};
pub use types::{ChatId, HeightState, NodeSnapshot, SentryState, UserState, ValidatorStatus};
