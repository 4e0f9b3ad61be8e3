use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How to pick the client side when the captured handshake does not decide it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionPolicy {
    /// Drop connections without exactly one opening SYN.
    #[default]
    Strict,
    /// Fall back to the port numbers: the side sending from the lower
    /// (service) port is the server.
    PortHint,
}

/// What an unparsable `Content-Range` header does to the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MalformedRangePolicy {
    /// Stop extracting the current connection, keep going with the others.
    #[default]
    SkipConnection,
    /// Abort the whole run.
    Abort,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarveOptions {
    /// Root of the `<file_id>/<range_id>.<ext>` tree.
    pub out_dir: PathBuf,
    pub extension: String,
    /// Flows touching any of these ports are never grouped.
    pub excluded_ports: Vec<u16>,
    pub direction: DirectionPolicy,
    pub malformed_range: MalformedRangePolicy,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("./data"),
            extension: "mp4".to_string(),
            excluded_ports: vec![443],
            direction: DirectionPolicy::Strict,
            malformed_range: MalformedRangePolicy::SkipConnection,
        }
    }
}
