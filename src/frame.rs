//! MAVLink v2 frame parsing, encoding, and checksum.
//!
//! Wire format (unsigned frames only — signing is out of scope):
//! ```text
//! FD LEN INCOMPAT COMPAT SEQ SYSID COMPID MSGID(3) PAYLOAD... CRC(2)
//! ```
//! The checksum is CRC-16/MCRF4XX computed over every byte from `LEN`
//! through the end of `PAYLOAD`, seeded with the per-message `CRC_EXTRA`
//! byte (see [`crc_extra`]).

use crate::error::{FrameError, FrameResult};

const MAGIC: u8 = 0xFD;
const HEADER_LEN: usize = 9; // LEN, INCOMPAT, COMPAT, SEQ, SYSID, COMPID, MSGID(3)
const MIN_FRAME_LEN: usize = 1 + HEADER_LEN + 2; // magic + header + crc, zero payload

const INCOMPAT_SIGNED: u8 = 0x01;

/// A parsed MAVLink v2 frame with header fields split out and the checksum
/// already verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub seq: u8,
    pub sys_id: u8,
    pub comp_id: u8,
    pub msg_id: u32,
    pub payload: Vec<u8>,
}

impl RawFrame {
    /// Parse a single complete wire frame (magic byte through checksum).
    pub fn parse(wire: &[u8]) -> FrameResult<Self> {
        if wire.len() < MIN_FRAME_LEN {
            return Err(FrameError::FrameTooShort { len: wire.len() });
        }
        if wire[0] != MAGIC {
            return Err(FrameError::BadMagic { got: wire[0] });
        }

        let len = wire[1] as usize;
        let incompat_flags = wire[2];
        let compat_flags = wire[3];
        let seq = wire[4];
        let sys_id = wire[5];
        let comp_id = wire[6];
        let msg_id = wire[7] as u32 | (wire[8] as u32) << 8 | (wire[9] as u32) << 16;

        if incompat_flags & INCOMPAT_SIGNED != 0 {
            return Err(FrameError::SignedFrameUnsupported);
        }
        let _ = compat_flags;

        let payload_start = 1 + HEADER_LEN;
        let payload_end = payload_start + len;
        if wire.len() < payload_end + 2 {
            return Err(FrameError::FrameTooShort { len: wire.len() });
        }

        let payload = wire[payload_start..payload_end].to_vec();
        let crc_received = u16::from_le_bytes([wire[payload_end], wire[payload_end + 1]]);

        let extra = crc_extra(msg_id).ok_or(FrameError::UnknownMessageId(msg_id))?;
        let crc_computed = compute_crc(&wire[1..payload_end], extra);

        if crc_received != crc_computed {
            return Err(FrameError::ChecksumMismatch {
                expected: crc_received,
                computed: crc_computed,
            });
        }

        Ok(RawFrame {
            seq,
            sys_id,
            comp_id,
            msg_id,
            payload,
        })
    }

    /// Encode this frame into a complete wire frame, ready for UDP send.
    ///
    /// Returns `None` if the message id has no known `CRC_EXTRA` (cannot
    /// happen for frames built from [`crate::message::Command`]).
    pub fn encode(&self) -> Option<Vec<u8>> {
        let extra = crc_extra(self.msg_id)?;
        let mut wire = Vec::with_capacity(1 + HEADER_LEN + self.payload.len() + 2);
        wire.push(MAGIC);
        wire.push(self.payload.len() as u8);
        wire.push(0); // incompat_flags
        wire.push(0); // compat_flags
        wire.push(self.seq);
        wire.push(self.sys_id);
        wire.push(self.comp_id);
        wire.push((self.msg_id & 0xFF) as u8);
        wire.push(((self.msg_id >> 8) & 0xFF) as u8);
        wire.push(((self.msg_id >> 16) & 0xFF) as u8);
        wire.extend_from_slice(&self.payload);

        let crc = compute_crc(&wire[1..], extra);
        wire.extend_from_slice(&crc.to_le_bytes());
        Some(wire)
    }
}

/// CRC-16/MCRF4XX accumulate step (the MAVLink checksum algorithm).
fn crc_accumulate(data: u8, crc: u16) -> u16 {
    let mut tmp = (data as u16) ^ (crc & 0xFF);
    tmp = (tmp ^ (tmp << 4)) & 0xFF;
    (crc >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4)
}

fn compute_crc(bytes: &[u8], extra: u8) -> u16 {
    let mut crc = 0xFFFFu16;
    for &b in bytes {
        crc = crc_accumulate(b, crc);
    }
    crc_accumulate(extra, crc)
}

/// Per-message `CRC_EXTRA` seed byte, derived from the MAVLink common
/// dialect's field layout for each message. Messages outside the camera
/// protocol subset this server speaks are not listed; frames for them fail
/// checksum verification with `UnknownMessageId` and are dropped.
pub fn crc_extra(msg_id: u32) -> Option<u8> {
    use crate::message::ids::*;
    Some(match msg_id {
        HEARTBEAT => 50,
        COMMAND_LONG => 152,
        COMMAND_ACK => 143,
        CAMERA_INFORMATION => 92,
        CAMERA_SETTINGS => 146,
        STORAGE_INFORMATION => 179,
        VIDEO_STREAM_INFORMATION => 109,
        SET_VIDEO_STREAM_SETTINGS => 239,
        PARAM_EXT_REQUEST_READ => 243,
        PARAM_EXT_REQUEST_LIST => 88,
        PARAM_EXT_VALUE => 243,
        PARAM_EXT_SET => 78,
        PARAM_EXT_ACK => 132,
        _ => return None,
    })
}

/// Byte-at-a-time MAVLink v2 frame parser: accepts one byte at a time
/// from a UDP datagram's payload.
///
/// Feed it every byte of an inbound datagram in order; it buffers until it
/// has a complete frame by length, then attempts parse+checksum. A bad
/// checksum or unknown message id resets the parser and resumes scanning
/// for the next `0xFD` magic byte rather than aborting the whole datagram,
/// since MAVLink datagrams can carry more than one message back to back.
pub struct FrameParser {
    buf: Vec<u8>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self { buf: Vec::with_capacity(280) }
    }

    /// Feed one byte. Returns `Some(frame)` once a complete, checksum-valid
    /// frame has been assembled. Invalid frames are discarded silently and
    /// this returns `None` for them: MAVLink is best-effort over UDP, so a
    /// bad frame is a silent drop, never a propagated error.
    pub fn push_byte(&mut self, byte: u8) -> Option<RawFrame> {
        if self.buf.is_empty() && byte != MAGIC {
            return None; // scanning for the next frame start
        }
        self.buf.push(byte);

        if self.buf.len() < 2 {
            return None; // need LEN byte yet
        }
        let len = self.buf[1] as usize;
        let total = 1 + HEADER_LEN + len + 2;
        if self.buf.len() < total {
            return None;
        }

        let frame = RawFrame::parse(&self.buf[..total]).ok();
        self.buf.drain(..total);
        frame
    }

    /// Feed an entire datagram's payload, returning every frame decoded
    /// from it in order. A single datagram can carry multiple messages.
    pub fn push_bytes(&mut self, data: &[u8]) -> Vec<RawFrame> {
        data.iter().filter_map(|&b| self.push_byte(b)).collect()
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ids::HEARTBEAT;

    fn heartbeat_frame(seq: u8) -> RawFrame {
        RawFrame {
            seq,
            sys_id: 1,
            comp_id: 100,
            msg_id: HEARTBEAT,
            payload: vec![0, 0, 0, 0, 6, 8, 0, 4, 3],
        }
    }

    #[test]
    fn round_trip() {
        let original = heartbeat_frame(7);
        let wire = original.encode().unwrap();
        let parsed = RawFrame::parse(&wire).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn bad_magic() {
        let mut wire = heartbeat_frame(0).encode().unwrap();
        wire[0] = 0x00;
        assert!(matches!(RawFrame::parse(&wire), Err(FrameError::BadMagic { .. })));
    }

    #[test]
    fn bad_checksum() {
        let mut wire = heartbeat_frame(0).encode().unwrap();
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        assert!(matches!(
            RawFrame::parse(&wire),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn too_short() {
        assert!(matches!(
            RawFrame::parse(&[0xFD, 0x00]),
            Err(FrameError::FrameTooShort { .. })
        ));
    }

    #[test]
    fn unknown_message_id() {
        let mut frame = heartbeat_frame(0);
        frame.msg_id = 0xABCDEF;
        // encode() can't produce a frame for an id with no crc_extra.
        assert!(frame.encode().is_none());
    }

    #[test]
    fn parser_single_frame() {
        let wire = heartbeat_frame(1).encode().unwrap();
        let mut parser = FrameParser::new();
        let mut out = None;
        for &b in &wire[..wire.len() - 1] {
            assert!(parser.push_byte(b).is_none());
        }
        out = parser.push_byte(*wire.last().unwrap());
        assert_eq!(out, Some(heartbeat_frame(1)));
    }

    #[test]
    fn parser_resyncs_on_garbage_prefix() {
        let wire = heartbeat_frame(2).encode().unwrap();
        let mut data = vec![0x00, 0xFF, 0x42];
        data.extend_from_slice(&wire);
        let mut parser = FrameParser::new();
        let frames = parser.push_bytes(&data);
        assert_eq!(frames, vec![heartbeat_frame(2)]);
    }

    #[test]
    fn parser_multiple_frames_in_one_datagram() {
        let mut data = heartbeat_frame(1).encode().unwrap();
        data.extend(heartbeat_frame(2).encode().unwrap());
        let mut parser = FrameParser::new();
        let frames = parser.push_bytes(&data);
        assert_eq!(frames, vec![heartbeat_frame(1), heartbeat_frame(2)]);
    }

    #[test]
    fn parser_preserved_across_datagram_boundary() {
        let wire = heartbeat_frame(3).encode().unwrap();
        let mut parser = FrameParser::new();
        let mid = wire.len() / 2;
        assert!(parser.push_bytes(&wire[..mid]).is_empty());
        let frames = parser.push_bytes(&wire[mid..]);
        assert_eq!(frames, vec![heartbeat_frame(3)]);
    }
}
