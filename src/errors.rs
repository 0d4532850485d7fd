use std::fmt;

use thiserror::Error;

use crate::domain::entities::receipt::ReceiptStatus;

/// Opaque error reported by the platform purchase subsystem (payment queue,
/// receipt refresh). Carried through to the original caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "platform error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for PlatformError {}

#[derive(Debug, Error)]
pub enum IapError {
    /// The verification callout failed at the transport level.
    #[error("verification callout failed")]
    Transport(#[from] reqwest::Error),

    /// The verification endpoint returned an empty response body.
    #[error("verification endpoint returned no data")]
    NoData,

    /// The verification response body was not a JSON object. The original
    /// body text is preserved for diagnostics.
    #[error("verification response could not be decoded: {0}")]
    JsonDecoding(String),

    /// The verification endpoint returned a well-formed response with a
    /// non-approving (or missing) status code.
    #[error("receipt rejected by verification endpoint ({0:?})")]
    InvalidReceipt(ReceiptStatus),

    /// The local receipt cache was still empty after a refresh attempt.
    #[error("no local receipt data available after refresh")]
    NoReceiptData,

    /// The local receipt cache exists but could not be read.
    #[error("local receipt could not be read")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Platform(PlatformError),

    /// The pending request was discarded before a result was delivered,
    /// either because a newer request for the same key replaced it or
    /// because the coordinator went away.
    #[error("request dropped before completion")]
    RequestDropped,
}
