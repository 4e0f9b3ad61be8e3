use std::path::Path;

use tracing::{debug, info, warn};

use crate::decode::frame::decode;
use crate::domain::TransportRecord;
use crate::error::{ExtractError, Result};
use crate::extract::extractor::ContentExtractor;
use crate::flow::assemble::FlowAssembler;
use crate::policy::{CarveOptions, MalformedRangePolicy};
use crate::source::FrameSource;
use crate::source_pcap::PcapFrameSource;
use crate::stats::RunSummary;
use crate::store::ArtifactStore;
use crate::store_fs::FsArtifactStore;

/// Frames between progress lines at the default log level.
const PROGRESS_EVERY: u64 = 1000;

/// Open `capture` and carve its range responses into `opts.out_dir`.
pub fn carve_file(capture: &Path, opts: Option<&CarveOptions>) -> Result<RunSummary> {
    let default_opts;
    let opts = match opts {
        Some(o) => o,
        None => {
            default_opts = CarveOptions::default();
            &default_opts
        }
    };
    let mut source = PcapFrameSource::open(capture)?;
    let store = FsArtifactStore::from_options(opts);
    carve(&mut source, &store, opts)
}

/// Decode every frame, group into connections, then extract each connection
/// in turn. Only source failures (and, under the legacy policy, malformed
/// Content-Range headers) end the run early.
pub fn carve(
    source: &mut dyn FrameSource,
    store: &dyn ArtifactStore,
    opts: &CarveOptions,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    summary.frames_expected = match source.frame_count() {
        Ok(n) => n,
        Err(e) => {
            warn!("frame count unavailable: {e}");
            None
        }
    };
    if let Some(total) = summary.frames_expected {
        info!("total: {total}");
    }

    let expected = summary.frames_expected;
    let (records, frames_read) = decode_all(source, expected, &mut summary)?;
    summary.frames_read = frames_read;
    summary.records_decoded = records.len() as u64;
    info!(
        "decoded {} of {} frame(s), dropped {}",
        summary.records_decoded,
        frames_read,
        summary.frames_dropped()
    );

    let grouped = FlowAssembler::from_options(opts).group(records);
    summary.records_excluded = grouped.excluded;
    summary.connections = grouped.connections.len() as u64;
    for e in &grouped.rejected {
        summary.note_flow_rejection(e);
    }

    let extractor = ContentExtractor::new(store);
    for conn in &grouped.connections {
        match extractor.extract(conn) {
            Ok(o) => {
                summary.connections_extracted += 1;
                summary.artifacts_opened += o.artifacts_opened;
                summary.bytes_written += o.bytes_written;
            }
            Err(e @ ExtractError::MalformedContentRange(_))
                if opts.malformed_range == MalformedRangePolicy::Abort =>
            {
                return Err(e.into());
            }
            Err(e) => {
                warn!("extraction of {} aborted: {e}", conn.server_key);
                summary.connections_aborted += 1;
            }
        }
    }

    info!(
        "done: {} connection(s), {} artifact(s) opened, {} byte(s) written",
        summary.connections, summary.artifacts_opened, summary.bytes_written
    );
    Ok(summary)
}

/// The frame counter is threaded through the loop and handed back.
fn decode_all(
    source: &mut dyn FrameSource,
    expected: Option<u64>,
    summary: &mut RunSummary,
) -> Result<(Vec<TransportRecord>, u64)> {
    let mut records = Vec::new();
    let mut index = 0u64;
    while let Some(frame) = source.next_frame()? {
        index += 1;
        if is_progress_tick(index, expected) {
            info!("frame {index}");
        } else {
            debug!("frame {index}");
        }
        match decode(&frame) {
            Ok(r) => records.push(r),
            Err(e) => {
                debug!("frame {index} dropped: {e}");
                summary.note_decode_failure(&e);
            }
        }
    }
    Ok((records, index))
}

fn is_progress_tick(index: u64, expected: Option<u64>) -> bool {
    index == 1 || index % PROGRESS_EVERY == 0 || expected == Some(index)
}
