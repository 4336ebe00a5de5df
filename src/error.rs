use thiserror::Error;

/// Errors raised while parsing or encoding a MAVLink v2 frame.
///
/// Frame-level problems are never fatal to the server: MAVLink is
/// best-effort over UDP, so a bad frame just means the datagram (or the
/// remainder of it) is silently dropped.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FrameError {
    #[error("frame too short ({len} bytes, minimum 12)")]
    FrameTooShort { len: usize },

    #[error("bad magic byte (expected 0xFD, got 0x{got:02X})")]
    BadMagic { got: u8 },

    #[error("checksum mismatch (expected 0x{expected:04X}, computed 0x{computed:04X})")]
    ChecksumMismatch { expected: u16, computed: u16 },

    #[error("unknown message id {0}")]
    UnknownMessageId(u32),

    #[error("payload too short for {msg}: need {need} bytes, got {got}")]
    PayloadTooShort {
        msg: &'static str,
        need: usize,
        got: usize,
    },

    #[error("signed frames are not supported")]
    SignedFrameUnsupported,
}

impl FrameError {
    pub(crate) fn payload_too_short(msg: &'static str, need: usize, got: usize) -> Self {
        Self::PayloadTooShort { msg, need, got }
    }
}

pub type FrameResult<T> = std::result::Result<T, FrameError>;

/// Errors surfaced by the parameter store / camera device path.
///
/// These are the errors the GCS actually sees, by way of a `PARAM_EXT_ACK`
/// carrying `PARAM_ACK_FAILED` or a `COMMAND_ACK` carrying
/// `MAV_RESULT_FAILED` — see `handlers.rs`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter {0:?}")]
    UnknownParam(String),

    #[error("parameter {0:?} has never been set")]
    Missing(String),

    #[error("value type does not match schema for {0:?}")]
    BadType(String),

    #[error("value not in the supported set for {0:?}")]
    Unsupported(String),

    #[error("device rejected set of {0:?}: {1}")]
    DeviceError(String, String),
}

pub type ParamResult<T> = std::result::Result<T, ParamError>;

/// Errors from the component registry. Never surfaced to the GCS;
/// `add()` hands this back to the embedder.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("all six camera component slots are occupied")]
    OutOfSlots,
}

/// Top-level server error: wraps lower-level error types plus I/O failures
/// from the socket/config collaborators.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("config error: {0}")]
    Config(String),

    #[error("send failed: {0}")]
    SendFailed(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
