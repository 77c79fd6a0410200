//! Bounds checked access to individual bits of a byte array. Bit `pos` lives in byte `pos / 8`
//! and is addressed most significant bit first, so bit 0 is `0x80` of the first byte.

use crate::error::{Error, Result};

fn locate(len: usize, pos: usize) -> Option<(usize, u8)> {
    let byte = pos / 8;
    if byte >= len {
        return None;
    }
    Some((byte, 0x80 >> (pos % 8)))
}

/// Read bit `pos`, or [None] if it lies outside of `bytes`.
pub fn get(bytes: &[u8], pos: usize) -> Option<bool> {
    locate(bytes.len(), pos).map(|(byte, mask)| bytes[byte] & mask != 0)
}

/// Set bit `pos`, leaving `bytes` untouched if it is out of range.
pub fn set(bytes: &mut [u8], pos: usize) -> Result<()> {
    let (byte, mask) =
        locate(bytes.len(), pos).ok_or(Error::InvalidArgument("bit position out of range"))?;
    bytes[byte] |= mask;
    Ok(())
}

/// Clear bit `pos`, leaving `bytes` untouched if it is out of range.
pub fn clear(bytes: &mut [u8], pos: usize) -> Result<()> {
    let (byte, mask) =
        locate(bytes.len(), pos).ok_or(Error::InvalidArgument("bit position out of range"))?;
    bytes[byte] &= !mask;
    Ok(())
}
