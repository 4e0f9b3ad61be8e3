use std::net::Ipv4Addr;

use crate::domain::TransportRecord;
use crate::error::DecodeError;
use crate::util::buf::{be16, be32, quad, sub, tail, u8_at};

/// Length of the Ethernet II header that precedes the IP packet.
pub const ETH_HEADER_LEN: usize = 14;

// IPv4 header offsets
const IP_TOTAL_LEN: usize = 2;
const IP_SRC: usize = 12;
const IP_DST: usize = 16;

// TCP header offsets
const TCP_SRC_PORT: usize = 0;
const TCP_DST_PORT: usize = 2;
const TCP_SEQ: usize = 4;
const TCP_DATA_OFF: usize = 12;
const TCP_FLAGS: usize = 13;

/// Decode one Ethernet/IPv4/TCP frame.
///
/// The TCP segment is bounded by the IP total-length field, so link-layer
/// padding after the packet never leaks into the payload. Anything but
/// IPv4 is rejected with [`DecodeError::UnsupportedVersion`].
pub fn decode(frame: &[u8]) -> Result<TransportRecord, DecodeError> {
    let ip = tail(frame, ETH_HEADER_LEN, "ethernet")?;

    let vihl = u8_at(ip, 0, "ip")?;
    let version = vihl >> 4;
    if version != 4 {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let ip_header_len = ((vihl & 0x0f) as usize) * 4;
    let total_len = be16(ip, IP_TOTAL_LEN, "ip")? as usize;
    let src_addr = Ipv4Addr::from(quad(ip, IP_SRC, "ip")?);
    let dst_addr = Ipv4Addr::from(quad(ip, IP_DST, "ip")?);

    let tcp = sub(ip, ip_header_len, total_len, "ip")?;

    let src_port = be16(tcp, TCP_SRC_PORT, "tcp")?;
    let dst_port = be16(tcp, TCP_DST_PORT, "tcp")?;
    let seq = be32(tcp, TCP_SEQ, "tcp")?;
    let tcp_header_len = ((u8_at(tcp, TCP_DATA_OFF, "tcp")? >> 4) as usize) * 4;
    let flags = u8_at(tcp, TCP_FLAGS, "tcp")?;
    let payload = tail(tcp, tcp_header_len, "tcp")?;

    Ok(TransportRecord {
        src_addr,
        dst_addr,
        src_port,
        dst_port,
        seq,
        flags,
        payload: payload.to_vec(),
    })
}
