use std::fmt::Debug;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, Linktype, PcapBlockOwned, PcapError};
use tracing::{debug, warn};

use crate::error::{CarveError, Result};
use crate::source::FrameSource;

const READ_BUFFER: usize = 1 << 16;
// Upper bound for a single record; snap lengths above this are not seen in practice.
const MAX_READ_BUFFER: usize = 1 << 26;

/// Frames from a classic (libpcap) capture file.
pub struct PcapFrameSource {
    path: PathBuf,
    reader: Reader<File>,
    count: Option<u64>,
}

/// A legacy reader and the current size of its buffer, which grows on demand.
struct Reader<R: Read> {
    inner: LegacyPcapReader<R>,
    capacity: usize,
}

impl PcapFrameSource {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            reader: open_reader(path)?,
            count: None,
        })
    }
}

impl FrameSource for PcapFrameSource {
    /// Counts with a separate pass over the file; the read position of this
    /// source is not affected.
    fn frame_count(&mut self) -> Result<Option<u64>> {
        if let Some(n) = self.count {
            return Ok(Some(n));
        }
        let mut reader = open_reader(&self.path)?;
        let mut n = 0u64;
        while next_packet(&mut reader, &self.path)?.is_some() {
            n += 1;
        }
        debug!("{}: {} frame(s)", self.path.display(), n);
        self.count = Some(n);
        Ok(Some(n))
    }

    fn next_frame(&mut self) -> Result<Option<Vec<u8>>> {
        next_packet(&mut self.reader, &self.path)
    }
}

fn source_err(origin: &Path, what: &str, e: impl Debug) -> CarveError {
    CarveError::Source(format!("{}: {what}: {e:?}", origin.display()))
}

fn open_reader(path: &Path) -> Result<Reader<File>> {
    let file = File::open(path)?;
    let inner = LegacyPcapReader::new(READ_BUFFER, file)
        .map_err(|e| source_err(path, "not a pcap file", e))?;
    Ok(Reader {
        inner,
        capacity: READ_BUFFER,
    })
}

fn next_packet<R: Read>(reader: &mut Reader<R>, origin: &Path) -> Result<Option<Vec<u8>>> {
    loop {
        match reader.inner.next() {
            Ok((offset, block)) => {
                let frame = match block {
                    PcapBlockOwned::Legacy(b) => Some(b.data.to_vec()),
                    PcapBlockOwned::LegacyHeader(hdr) => {
                        if hdr.network != Linktype::ETHERNET {
                            warn!(
                                "{}: link type {:?} is not Ethernet, frames are decoded as Ethernet II",
                                origin.display(),
                                hdr.network
                            );
                        }
                        None
                    }
                    PcapBlockOwned::NG(_) => {
                        return Err(CarveError::Source(format!(
                            "{}: pcapng blocks are not supported",
                            origin.display()
                        )));
                    }
                };
                reader.inner.consume(offset);
                if frame.is_some() {
                    return Ok(frame);
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader
                    .inner
                    .refill()
                    .map_err(|e| source_err(origin, "refill", e))?;
            }
            Err(PcapError::BufferTooSmall) => {
                let wanted = reader.capacity * 2;
                if wanted > MAX_READ_BUFFER {
                    return Err(CarveError::Source(format!(
                        "{}: record larger than {MAX_READ_BUFFER} bytes",
                        origin.display()
                    )));
                }
                reader.inner.grow(wanted);
                reader.capacity = wanted;
                debug!("{}: read buffer grown to {wanted} bytes", origin.display());
                reader
                    .inner
                    .refill()
                    .map_err(|e| source_err(origin, "refill", e))?;
            }
            Err(e) => return Err(source_err(origin, "read", e)),
        }
    }
}
