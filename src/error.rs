use thiserror::Error;

/// Failures surfaced by socket setup, wire encoding and configuration
/// loading. Dispatch itself never returns an error: decode mismatches fall
/// back to zero-equivalent values so one bad message cannot abort a poll.
#[derive(Debug, Error)]
pub enum OscError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OSC codec error: {0}")]
    Codec(#[from] rosc::OscError),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
