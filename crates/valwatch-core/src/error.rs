//! Error taxonomy shared by the fetchers and the notification fan-out.

use std::error::Error;
use std::fmt;

/// A remote fetch failed for this tick. The caller retries on the next
/// scheduled poll; there are no retries inside a single poll.
#[derive(Debug)]
pub enum FetchError {
    /// Endpoint unreachable, timed out, or otherwise failed at transport level.
    Connectivity(String),
    /// Endpoint answered with a non-success status.
    Status(u16),
    /// Endpoint answered 2xx but the payload did not parse. Treated like a
    /// connectivity failure by every check.
    Malformed(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Connectivity(e) => write!(f, "connection error: {e}"),
            FetchError::Status(code) => write!(f, "unexpected HTTP status: {code}"),
            FetchError::Malformed(e) => write!(f, "malformed payload: {e}"),
        }
    }
}

impl Error for FetchError {}

/// Failure reported by the chat transport.
#[derive(Debug)]
pub enum DeliveryError {
    /// The user blocked or deleted the bot. Fatal to that chat's monitoring:
    /// the fan-out tears down its state and cancels its job.
    Blocked,
    /// Anything else; logged and swallowed.
    Other(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::Blocked => write!(f, "bot was blocked by the user"),
            DeliveryError::Other(e) => write!(f, "delivery error: {e}"),
        }
    }
}

impl Error for DeliveryError {}
