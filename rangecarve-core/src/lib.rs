#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod policy;
pub mod stats;

pub mod util {
    pub mod buf;
}

pub mod decode {
    pub mod frame;
}

pub mod flow {
    pub mod assemble;
}

pub mod extract {
    pub mod content_range;
    pub mod extractor;
}

pub mod source;
pub mod source_pcap;
pub mod store;
pub mod store_fs;

pub mod pipeline;

// Re-exports: stable API surface
pub use decode::frame::decode;
pub use domain::{ArtifactKey, Connection, FlowKey, TransportRecord};
pub use extract::extractor::{ContentExtractor, ExtractOutcome};
pub use flow::assemble::{FlowAssembler, GroupOutcome};
pub use pipeline::{carve, carve_file};
pub use policy::{CarveOptions, DirectionPolicy, MalformedRangePolicy};
pub use source::{FrameSource, MemFrameSource};
pub use source_pcap::PcapFrameSource;
pub use stats::RunSummary;
pub use store::ArtifactStore;
pub use store_fs::FsArtifactStore;
