//! Field codecs for MAVLink v2 message payloads.
//!
//! All multi-byte integers are little-endian (MAVLink wire order), unlike
//! the big-endian layout a Mevo+-style protocol would use.

use crate::error::{FrameError, FrameResult};

// ---------------------------------------------------------------------------
// Read helpers
// ---------------------------------------------------------------------------

/// Read a little-endian unsigned 16-bit integer.
pub fn read_u16(data: &[u8], offset: usize) -> FrameResult<u16> {
    check_len(data, offset, 2, "UINT16")?;
    Ok(u16::from_le_bytes([data[offset], data[offset + 1]]))
}

/// Read a little-endian signed 32-bit integer.
pub fn read_i32(data: &[u8], offset: usize) -> FrameResult<i32> {
    check_len(data, offset, 4, "INT32")?;
    Ok(i32::from_le_bytes(data[offset..offset + 4].try_into().unwrap()))
}

/// Read a little-endian unsigned 32-bit integer.
pub fn read_u32(data: &[u8], offset: usize) -> FrameResult<u32> {
    check_len(data, offset, 4, "UINT32")?;
    Ok(u32::from_le_bytes(data[offset..offset + 4].try_into().unwrap()))
}

/// Read a little-endian IEEE-754 single-precision float.
pub fn read_f32(data: &[u8], offset: usize) -> FrameResult<f32> {
    check_len(data, offset, 4, "FLOAT")?;
    Ok(f32::from_le_bytes(data[offset..offset + 4].try_into().unwrap()))
}

/// Read a fixed-width, NUL-padded ASCII field, trimmed at the first NUL.
pub fn read_fixed_str(data: &[u8], offset: usize, width: usize) -> FrameResult<String> {
    check_len(data, offset, width, "FIXED_STR")?;
    let raw = &data[offset..offset + width];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
}

// ---------------------------------------------------------------------------
// Write helpers
// ---------------------------------------------------------------------------

/// Write a little-endian unsigned 16-bit integer.
pub fn write_u16(buf: &mut Vec<u8>, val: u16) {
    buf.extend_from_slice(&val.to_le_bytes());
}

/// Write a little-endian signed 32-bit integer.
pub fn write_i32(buf: &mut Vec<u8>, val: i32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

/// Write a little-endian unsigned 32-bit integer.
pub fn write_u32(buf: &mut Vec<u8>, val: u32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

/// Write a little-endian IEEE-754 single-precision float.
pub fn write_f32(buf: &mut Vec<u8>, val: f32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

/// Write a fixed-width, NUL-padded ASCII field. Truncates if `s` is longer
/// than `width`.
pub fn write_fixed_str(buf: &mut Vec<u8>, s: &str, width: usize) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(width);
    buf.extend_from_slice(&bytes[..n]);
    buf.extend(std::iter::repeat_n(0u8, width - n));
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

fn check_len(data: &[u8], offset: usize, need: usize, name: &'static str) -> FrameResult<()> {
    if data.len() < offset + need {
        Err(FrameError::payload_too_short(name, offset + need, data.len()))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_round_trip() {
        for val in [0u16, 1, 0xFFFF, 0x8000] {
            let mut buf = Vec::new();
            write_u16(&mut buf, val);
            assert_eq!(read_u16(&buf, 0).unwrap(), val);
        }
    }

    #[test]
    fn i32_round_trip() {
        for val in [0i32, 1, -1, i32::MAX, i32::MIN] {
            let mut buf = Vec::new();
            write_i32(&mut buf, val);
            assert_eq!(read_i32(&buf, 0).unwrap(), val);
        }
    }

    #[test]
    fn u32_round_trip() {
        for val in [0u32, 1, u32::MAX, 12345] {
            let mut buf = Vec::new();
            write_u32(&mut buf, val);
            assert_eq!(read_u32(&buf, 0).unwrap(), val);
        }
    }

    #[test]
    fn f32_round_trip() {
        for val in [0.0f32, 1.5, -2.75, f32::MAX] {
            let mut buf = Vec::new();
            write_f32(&mut buf, val);
            assert_eq!(read_f32(&buf, 0).unwrap(), val);
        }
    }

    #[test]
    fn fixed_str_round_trip() {
        let mut buf = Vec::new();
        write_fixed_str(&mut buf, "Intel", 16);
        assert_eq!(buf.len(), 16);
        assert_eq!(read_fixed_str(&buf, 0, 16).unwrap(), "Intel");
    }

    #[test]
    fn fixed_str_truncates() {
        let mut buf = Vec::new();
        write_fixed_str(&mut buf, "this-name-is-too-long-for-the-field", 8);
        assert_eq!(buf.len(), 8);
        assert_eq!(read_fixed_str(&buf, 0, 8).unwrap(), "this-nam");
    }

    #[test]
    fn fixed_str_empty() {
        let mut buf = Vec::new();
        write_fixed_str(&mut buf, "", 4);
        assert_eq!(buf, vec![0, 0, 0, 0]);
        assert_eq!(read_fixed_str(&buf, 0, 4).unwrap(), "");
    }

    #[test]
    fn payload_too_short() {
        let data = [0u8; 1];
        assert!(matches!(
            read_u32(&data, 0),
            Err(FrameError::PayloadTooShort { .. })
        ));
    }
}
