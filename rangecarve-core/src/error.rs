use thiserror::Error;

use crate::domain::FlowKey;

/// Why a single frame could not be turned into a transport record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported IP version {0}")]
    UnsupportedVersion(u8),

    #[error("truncated {layer}: need {need} bytes, have {have}")]
    Truncated {
        layer: &'static str,
        need: usize,
        have: usize,
    },
}

/// Why a pair of flows did not become a connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("no mirror flow for {0}")]
    IncompleteFlow(FlowKey),

    #[error("no handshake observed between {0} and {1}")]
    NoHandshakeObserved(FlowKey, FlowKey),

    #[error("both directions open with SYN: {0} and {1}")]
    AmbiguousHandshake(FlowKey, FlowKey),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("malformed Content-Range: {0}")]
    MalformedContentRange(String),

    #[error("artifact {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum CarveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("capture source: {0}")]
    Source(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, CarveError>;
