//! Bounds-checked big-endian accessors. Every read either succeeds or reports
//! how many bytes the layer needed; none of them can panic.

use crate::error::DecodeError;

#[inline]
fn truncated(layer: &'static str, need: usize, have: usize) -> DecodeError {
    DecodeError::Truncated { layer, need, have }
}

pub fn sub<'a>(
    buf: &'a [u8],
    start: usize,
    end: usize,
    layer: &'static str,
) -> Result<&'a [u8], DecodeError> {
    if start > end {
        return Err(truncated(layer, start, end));
    }
    buf.get(start..end)
        .ok_or_else(|| truncated(layer, end, buf.len()))
}

pub fn tail<'a>(buf: &'a [u8], start: usize, layer: &'static str) -> Result<&'a [u8], DecodeError> {
    buf.get(start..)
        .ok_or_else(|| truncated(layer, start, buf.len()))
}

#[inline]
pub fn u8_at(buf: &[u8], off: usize, layer: &'static str) -> Result<u8, DecodeError> {
    buf.get(off)
        .copied()
        .ok_or_else(|| truncated(layer, off + 1, buf.len()))
}

#[inline]
pub fn be16(buf: &[u8], off: usize, layer: &'static str) -> Result<u16, DecodeError> {
    let b = sub(buf, off, off + 2, layer)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

#[inline]
pub fn be32(buf: &[u8], off: usize, layer: &'static str) -> Result<u32, DecodeError> {
    let b = sub(buf, off, off + 4, layer)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[inline]
pub fn quad(buf: &[u8], off: usize, layer: &'static str) -> Result<[u8; 4], DecodeError> {
    let b = sub(buf, off, off + 4, layer)?;
    Ok([b[0], b[1], b[2], b[3]])
}
