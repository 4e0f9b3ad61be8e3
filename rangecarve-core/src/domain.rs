// rangecarve_core/src/domain.rs
use std::fmt;
use std::net::Ipv4Addr;

/// TCP flags value of a bare SYN (first segment of the client handshake).
pub const SYN: u8 = 0x02;

/// One decoded TCP segment. Built once by the frame decoder and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRecord {
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub flags: u8,
    pub payload: Vec<u8>,
}

impl TransportRecord {
    pub fn key(&self) -> FlowKey {
        FlowKey {
            src_addr: self.src_addr,
            dst_addr: self.dst_addr,
            src_port: self.src_port,
            dst_port: self.dst_port,
        }
    }

    #[inline]
    pub fn is_syn(&self) -> bool {
        self.flags == SYN
    }
}

/// One direction of a TCP flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl FlowKey {
    /// The opposite direction of the same connection.
    pub fn mirror(&self) -> FlowKey {
        FlowKey {
            src_addr: self.dst_addr,
            dst_addr: self.src_addr,
            src_port: self.dst_port,
            dst_port: self.src_port,
        }
    }

    pub fn is_mirror_of(&self, other: &FlowKey) -> bool {
        self.mirror() == *other
    }

    pub fn touches_port(&self, port: u16) -> bool {
        self.src_port == port || self.dst_port == port
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.src_addr, self.src_port, self.dst_addr, self.dst_port
        )
    }
}

/// Identity of a mirror pair regardless of which direction was seen first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairKey(FlowKey, FlowKey);

impl PairKey {
    pub fn of(key: &FlowKey) -> Self {
        let mirror = key.mirror();
        if *key <= mirror {
            PairKey(*key, mirror)
        } else {
            PairKey(mirror, *key)
        }
    }
}

/// A resolved bidirectional connection. Both segment lists are ascending by
/// sequence number.
#[derive(Clone, Debug)]
pub struct Connection {
    pub client_key: FlowKey,
    pub server_key: FlowKey,
    pub client_segments: Vec<TransportRecord>,
    pub server_segments: Vec<TransportRecord>,
}

/// Output artifact identity taken from a `Content-Range` header:
/// `file_id` is the total size, `range_id` the byte range.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub file_id: String,
    pub range_id: String,
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.file_id, self.range_id)
    }
}
