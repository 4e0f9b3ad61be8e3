#![allow(dead_code)]

use std::net::Ipv4Addr;

pub const SYN: u8 = 0x02;
pub const SYN_ACK: u8 = 0x12;
pub const ACK: u8 = 0x10;
pub const PSH_ACK: u8 = 0x18;

pub type Endpoint = (Ipv4Addr, u16);

pub fn ep(a: [u8; 4], port: u16) -> Endpoint {
    (Ipv4Addr::from(a), port)
}

/// Ethernet II + IPv4 (no options) + TCP (no options) around `payload`.
pub fn tcp_frame(from: Endpoint, to: Endpoint, seq: u32, flags: u8, payload: &[u8]) -> Vec<u8> {
    let total = 20 + 20 + payload.len();
    let mut f = Vec::with_capacity(14 + total);
    f.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x02, 0x02, 0, 0, 0, 0, 0x01, 0x08, 0x00]);

    f.push(0x45);
    f.push(0);
    f.extend_from_slice(&(total as u16).to_be_bytes());
    f.extend_from_slice(&[0, 0, 0x40, 0, 64, 6, 0, 0]);
    f.extend_from_slice(&from.0.octets());
    f.extend_from_slice(&to.0.octets());

    f.extend_from_slice(&from.1.to_be_bytes());
    f.extend_from_slice(&to.1.to_be_bytes());
    f.extend_from_slice(&seq.to_be_bytes());
    f.extend_from_slice(&0u32.to_be_bytes());
    f.push(5 << 4);
    f.push(flags);
    f.extend_from_slice(&[0xff, 0xff, 0, 0, 0, 0]);

    f.extend_from_slice(payload);
    f
}

/// Same frame with the IP version nibble set to 6.
pub fn ipv6_frame(payload: &[u8]) -> Vec<u8> {
    let mut f = tcp_frame(ep([1, 1, 1, 1], 1), ep([2, 2, 2, 2], 2), 0, ACK, payload);
    f[14] = 0x60;
    f
}

/// Little-endian microsecond classic pcap with an Ethernet link type.
pub fn pcap_bytes(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (i, f) in frames.iter().enumerate() {
        out.extend_from_slice(&(1_700_000_000u32 + i as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(f.len() as u32).to_le_bytes());
        out.extend_from_slice(&(f.len() as u32).to_le_bytes());
        out.extend_from_slice(f);
    }
    out
}

pub const CLIENT: [u8; 4] = [10, 0, 0, 1];
pub const SERVER: [u8; 4] = [10, 0, 0, 2];

/// The three-segment download: SYN, a header segment carrying "abc",
/// and a continuation carrying "def".
pub fn abcdef_download() -> Vec<Vec<u8>> {
    let c = ep(CLIENT, 5000);
    let s = ep(SERVER, 80);
    let head = b"HTTP/1.1 206 Partial Content\r\nContent-Range: bytes 0-2/6\r\n\r\nabc";
    vec![
        tcp_frame(c, s, 1000, SYN, b""),
        tcp_frame(s, c, 7000, SYN_ACK, b""),
        tcp_frame(c, s, 1001, PSH_ACK, b"GET /v.mp4 HTTP/1.1\r\nRange: bytes=0-2\r\n\r\n"),
        tcp_frame(s, c, 7001, PSH_ACK, head),
        tcp_frame(s, c, 7001 + head.len() as u32, PSH_ACK, b"def"),
    ]
}
