use std::io::Write;

use tracing::{debug, info};

use super::content_range::{is_response_start, parse_response};
use crate::domain::{ArtifactKey, Connection, TransportRecord};
use crate::error::ExtractError;
use crate::store::ArtifactStore;

/// Counters for one connection's extraction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub artifacts_opened: u64,
    pub fragments: u64,
    pub duplicates: u64,
    pub bytes_written: u64,
}

enum State<'s> {
    Idle,
    Writing {
        handle: Box<dyn Write + 's>,
        key: ArtifactKey,
    },
}

impl State<'_> {
    /// Flush and release the open handle, if any.
    fn close(self, store: &dyn ArtifactStore) -> Result<(), ExtractError> {
        if let State::Writing { mut handle, key } = self {
            handle.flush().map_err(|source| ExtractError::Output {
                path: store.locate(&key),
                source,
            })?;
        }
        Ok(())
    }
}

/// Reassembles range responses found in a connection's server segments.
pub struct ContentExtractor<'s> {
    store: &'s dyn ArtifactStore,
}

impl<'s> ContentExtractor<'s> {
    pub fn new(store: &'s dyn ArtifactStore) -> Self {
        Self { store }
    }

    /// Walk the server-to-client segments once. Any handle still open is
    /// released when this returns, whether by success or by error.
    pub fn extract(&self, conn: &Connection) -> Result<ExtractOutcome, ExtractError> {
        let mut out = ExtractOutcome::default();
        let mut state = State::Idle;
        let mut prev: Option<&TransportRecord> = None;

        for seg in &conn.server_segments {
            let retransmit = prev.is_some_and(|p| p.seq == seg.seq && !p.payload.is_empty());
            prev = Some(seg);

            if seg.payload.is_empty() {
                continue;
            }
            if retransmit {
                out.duplicates += 1;
                continue;
            }

            if is_response_start(&seg.payload) {
                let resp = parse_response(&seg.payload)?;
                state.close(self.store)?;
                let mut handle = self.store.open_append(&resp.key)?;
                self.write(handle.as_mut(), &resp.key, resp.body)?;
                debug!(
                    "{} starts {} ({} body bytes)",
                    conn.server_key,
                    resp.key,
                    resp.body.len()
                );
                out.artifacts_opened += 1;
                out.bytes_written += resp.body.len() as u64;
                state = State::Writing {
                    handle,
                    key: resp.key,
                };
                continue;
            }

            match &mut state {
                State::Idle => {}
                State::Writing { handle, key } => {
                    self.write(handle.as_mut(), key, &seg.payload)?;
                    out.fragments += 1;
                    out.bytes_written += seg.payload.len() as u64;
                }
            }
        }

        state.close(self.store)?;
        if out.artifacts_opened > 0 {
            info!(
                "{}: {} artifact(s), {} fragment(s), {} bytes",
                conn.server_key, out.artifacts_opened, out.fragments, out.bytes_written
            );
        }
        Ok(out)
    }

    fn write(&self, handle: &mut dyn Write, key: &ArtifactKey, bytes: &[u8]) -> Result<(), ExtractError> {
        handle
            .write_all(bytes)
            .map_err(|source| ExtractError::Output {
                path: self.store.locate(key),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlowKey;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;
    use std::net::Ipv4Addr;
    use std::rc::Rc;

    type Shared = Rc<RefCell<HashMap<ArtifactKey, Vec<u8>>>>;

    #[derive(Default)]
    struct MemStore {
        files: Shared,
        opens: RefCell<Vec<ArtifactKey>>,
        flushes: Rc<RefCell<u32>>,
    }

    struct MemWriter {
        key: ArtifactKey,
        files: Shared,
        flushes: Rc<RefCell<u32>>,
    }

    impl Write for MemWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.files
                .borrow_mut()
                .entry(self.key.clone())
                .or_default()
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            *self.flushes.borrow_mut() += 1;
            Ok(())
        }
    }

    impl ArtifactStore for MemStore {
        fn open_append(&self, key: &ArtifactKey) -> Result<Box<dyn Write + '_>, ExtractError> {
            self.opens.borrow_mut().push(key.clone());
            Ok(Box::new(MemWriter {
                key: key.clone(),
                files: Rc::clone(&self.files),
                flushes: Rc::clone(&self.flushes),
            }))
        }

        fn locate(&self, key: &ArtifactKey) -> String {
            key.to_string()
        }
    }

    impl MemStore {
        fn get(&self, file_id: &str, range_id: &str) -> Option<Vec<u8>> {
            self.files
                .borrow()
                .get(&ArtifactKey {
                    file_id: file_id.into(),
                    range_id: range_id.into(),
                })
                .cloned()
        }
    }

    fn key(sp: u16, dp: u16) -> FlowKey {
        FlowKey {
            src_addr: Ipv4Addr::new(10, 0, 0, 2),
            dst_addr: Ipv4Addr::new(10, 0, 0, 1),
            src_port: sp,
            dst_port: dp,
        }
    }

    fn seg(seq: u32, payload: &[u8]) -> TransportRecord {
        let k = key(80, 5000);
        TransportRecord {
            src_addr: k.src_addr,
            dst_addr: k.dst_addr,
            src_port: k.src_port,
            dst_port: k.dst_port,
            seq,
            flags: 0x18,
            payload: payload.to_vec(),
        }
    }

    fn conn(server_segments: Vec<TransportRecord>) -> Connection {
        let server_key = key(80, 5000);
        Connection {
            client_key: server_key.mirror(),
            server_key,
            client_segments: Vec::new(),
            server_segments,
        }
    }

    const HEAD_0_2: &[u8] = b"HTTP/1.1 206 Partial Content\r\nContent-Range: bytes 0-2/6\r\n\r\nabc";
    const HEAD_3_5: &[u8] = b"HTTP/1.1 206 Partial Content\r\nContent-Range: bytes 3-5/6\r\n\r\nDEF";

    #[test]
    fn header_then_continuation() {
        let store = MemStore::default();
        let c = conn(vec![seg(1, HEAD_0_2), seg(64, b"def")]);
        let out = ContentExtractor::new(&store).extract(&c).unwrap();
        assert_eq!(store.get("6", "0-2").unwrap(), b"abcdef");
        assert_eq!(out.artifacts_opened, 1);
        assert_eq!(out.fragments, 1);
        assert_eq!(out.bytes_written, 6);
    }

    #[test]
    fn new_header_supersedes_open_artifact() {
        let store = MemStore::default();
        let c = conn(vec![seg(1, HEAD_0_2), seg(64, HEAD_3_5), seg(128, b"ghi")]);
        ContentExtractor::new(&store).extract(&c).unwrap();
        assert_eq!(store.get("6", "0-2").unwrap(), b"abc");
        assert_eq!(store.get("6", "3-5").unwrap(), b"DEFghi");
        // one flush when superseded, one at the end
        assert_eq!(*store.flushes.borrow(), 2);
    }

    #[test]
    fn data_before_any_header_is_ignored() {
        let store = MemStore::default();
        let c = conn(vec![seg(1, b"stray"), seg(2, b"")]);
        let out = ContentExtractor::new(&store).extract(&c).unwrap();
        assert!(store.files.borrow().is_empty());
        assert_eq!(out, ExtractOutcome::default());
    }

    #[test]
    fn retransmission_contributes_nothing() {
        let store = MemStore::default();
        let c = conn(vec![seg(1, HEAD_0_2), seg(64, b"def"), seg(64, b"def"), seg(67, b"g")]);
        let out = ContentExtractor::new(&store).extract(&c).unwrap();
        assert_eq!(store.get("6", "0-2").unwrap(), b"abcdefg");
        assert_eq!(out.duplicates, 1);
    }

    #[test]
    fn same_sequence_after_empty_segment_is_kept() {
        let store = MemStore::default();
        let c = conn(vec![seg(1, HEAD_0_2), seg(64, b""), seg(64, b"def")]);
        ContentExtractor::new(&store).extract(&c).unwrap();
        assert_eq!(store.get("6", "0-2").unwrap(), b"abcdef");
    }

    #[test]
    fn malformed_range_stops_and_releases_handle() {
        let store = MemStore::default();
        let bad: &[u8] = b"HTTP/1.1 206 Partial Content\r\nContent-Range: bytes 0-2\r\n\r\nxyz";
        let c = conn(vec![seg(1, HEAD_0_2), seg(64, bad), seg(128, b"late")]);
        let err = ContentExtractor::new(&store).extract(&c).unwrap_err();
        assert!(matches!(err, ExtractError::MalformedContentRange(_)));
        assert_eq!(store.get("6", "0-2").unwrap(), b"abc");
        assert_eq!(store.opens.borrow().len(), 1);
    }

    #[test]
    fn reopening_a_range_appends() {
        let store = MemStore::default();
        let c = conn(vec![seg(1, HEAD_0_2), seg(64, HEAD_0_2)]);
        let out = ContentExtractor::new(&store).extract(&c).unwrap();
        assert_eq!(store.get("6", "0-2").unwrap(), b"abcabc");
        assert_eq!(out.artifacts_opened, 2);
    }
}
