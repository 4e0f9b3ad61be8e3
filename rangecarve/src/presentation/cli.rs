use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Recover files sent as HTTP range responses from a pcap capture",
    long_about = None
)]
pub struct Cli {
    /// Capture file (classic pcap, Ethernet frames)
    pub capture: Option<PathBuf>,

    /// Output root; artifacts land in <out-dir>/<total>/<range>.<ext>
    #[arg(long, default_value = "./data")]
    pub out_dir: PathBuf,

    /// Artifact file extension
    #[arg(long, default_value = "mp4")]
    pub extension: String,

    /// Never carve flows touching this port (repeatable)
    #[arg(long = "exclude-port", default_values_t = [443])]
    pub exclude_ports: Vec<u16>,

    /// How to pick the client when the handshake is not in view
    #[arg(long, value_enum, default_value_t = DirectionArg::Strict)]
    pub direction: DirectionArg,

    /// Abort the run on the first unparsable Content-Range header
    #[arg(long)]
    pub strict_ranges: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub summary_json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// Require exactly one opening SYN
    Strict,
    /// Fall back to the lower port as the server side
    PortHint,
}
