//! Typed MAVLink message payloads: decode for GCS→device traffic, encode
//! for device→GCS traffic (C6).
//!
//! Field layout within each payload follows MAVLink wire convention:
//! fields are grouped largest-first (u32/float, then u16, then u8, then
//! fixed-width char arrays), which keeps every struct alignment-free to
//! decode with the byte-offset helpers in `codec.rs`.

use crate::codec::*;
use crate::error::{FrameError, FrameResult};
use crate::frame::RawFrame;

/// Wire message IDs for the subset of the MAVLink common dialect this
/// server speaks.
pub mod ids {
    pub const HEARTBEAT: u32 = 0;
    pub const COMMAND_LONG: u32 = 76;
    pub const COMMAND_ACK: u32 = 77;
    pub const CAMERA_INFORMATION: u32 = 259;
    pub const CAMERA_SETTINGS: u32 = 260;
    pub const STORAGE_INFORMATION: u32 = 261;
    pub const VIDEO_STREAM_INFORMATION: u32 = 269;
    pub const SET_VIDEO_STREAM_SETTINGS: u32 = 1001;
    pub const PARAM_EXT_REQUEST_READ: u32 = 320;
    pub const PARAM_EXT_REQUEST_LIST: u32 = 321;
    pub const PARAM_EXT_VALUE: u32 = 322;
    pub const PARAM_EXT_SET: u32 = 323;
    pub const PARAM_EXT_ACK: u32 = 324;
}

/// `COMMAND_LONG.command` values this server acts on.
pub mod mav_cmd {
    pub const REQUEST_CAMERA_INFORMATION: u16 = 521;
    pub const REQUEST_CAMERA_SETTINGS: u16 = 522;
    pub const REQUEST_STORAGE_INFORMATION: u16 = 525;
    pub const REQUEST_VIDEO_STREAM_INFORMATION: u16 = 2504;
}

pub mod mav_result {
    pub const ACCEPTED: u8 = 0;
    pub const FAILED: u8 = 4;
}

pub mod param_ack {
    pub const ACCEPTED: u8 = 0;
    pub const FAILED: u8 = 2;
}

const PARAM_ID_WIDTH: usize = 16;
const PARAM_VALUE_WIDTH: usize = 128;
const VENDOR_WIDTH: usize = 32;
const CAM_URI_WIDTH: usize = 140;
const STREAM_URI_WIDTH: usize = 160;

// ---------------------------------------------------------------------------
// Inbound (decoded GCS → device)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CommandLong {
    pub target_system: u8,
    pub target_component: u8,
    pub command: u16,
    pub confirmation: u8,
    pub param1: f32,
    pub param2: f32,
}

impl CommandLong {
    fn decode(p: &[u8]) -> FrameResult<Self> {
        Ok(Self {
            param1: read_f32(p, 0)?,
            param2: read_f32(p, 4)?,
            command: read_u16(p, 28)?,
            target_system: *p.get(30).ok_or(FrameError::payload_too_short("COMMAND_LONG", 31, p.len()))?,
            target_component: *p.get(31).ok_or(FrameError::payload_too_short("COMMAND_LONG", 32, p.len()))?,
            confirmation: *p.get(32).ok_or(FrameError::payload_too_short("COMMAND_LONG", 33, p.len()))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetVideoStreamSettings {
    pub target_system: u8,
    pub target_component: u8,
    pub camera_id: u8,
    pub resolution_h: u16,
    pub resolution_v: u16,
}

impl SetVideoStreamSettings {
    fn decode(p: &[u8]) -> FrameResult<Self> {
        Ok(Self {
            resolution_h: read_u16(p, 8)?,
            resolution_v: read_u16(p, 10)?,
            target_system: *p.get(12).ok_or(FrameError::payload_too_short("SET_VIDEO_STREAM_SETTINGS", 13, p.len()))?,
            target_component: *p.get(13).ok_or(FrameError::payload_too_short("SET_VIDEO_STREAM_SETTINGS", 14, p.len()))?,
            camera_id: *p.get(14).ok_or(FrameError::payload_too_short("SET_VIDEO_STREAM_SETTINGS", 15, p.len()))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamExtRequestRead {
    pub target_system: u8,
    pub target_component: u8,
    pub param_id: String,
}

impl ParamExtRequestRead {
    fn decode(p: &[u8]) -> FrameResult<Self> {
        Ok(Self {
            target_system: *p.get(2).ok_or(FrameError::payload_too_short("PARAM_EXT_REQUEST_READ", 3, p.len()))?,
            target_component: *p.get(3).ok_or(FrameError::payload_too_short("PARAM_EXT_REQUEST_READ", 4, p.len()))?,
            param_id: read_fixed_str(p, 4, PARAM_ID_WIDTH)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamExtRequestList {
    pub target_system: u8,
    pub target_component: u8,
}

impl ParamExtRequestList {
    fn decode(p: &[u8]) -> FrameResult<Self> {
        Ok(Self {
            target_system: *p.get(0).ok_or(FrameError::payload_too_short("PARAM_EXT_REQUEST_LIST", 1, p.len()))?,
            target_component: *p.get(1).ok_or(FrameError::payload_too_short("PARAM_EXT_REQUEST_LIST", 2, p.len()))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamExtSet {
    pub target_system: u8,
    pub target_component: u8,
    pub param_id: String,
    pub param_value: [u8; PARAM_VALUE_WIDTH],
    pub param_type: u8,
}

impl ParamExtSet {
    fn decode(p: &[u8]) -> FrameResult<Self> {
        let need = 3 + PARAM_ID_WIDTH + PARAM_VALUE_WIDTH;
        if p.len() < need {
            return Err(FrameError::payload_too_short("PARAM_EXT_SET", need, p.len()));
        }
        let mut param_value = [0u8; PARAM_VALUE_WIDTH];
        let value_off = 3 + PARAM_ID_WIDTH;
        param_value.copy_from_slice(&p[value_off..value_off + PARAM_VALUE_WIDTH]);
        Ok(Self {
            target_system: p[0],
            target_component: p[1],
            param_id: read_fixed_str(p, 3, PARAM_ID_WIDTH)?,
            param_value,
            param_type: p[2],
        })
    }
}

/// Decoded GCS → device traffic.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    CommandLong(CommandLong),
    SetVideoStreamSettings(SetVideoStreamSettings),
    ParamExtRequestRead(ParamExtRequestRead),
    ParamExtRequestList(ParamExtRequestList),
    ParamExtSet(ParamExtSet),
}

impl Message {
    /// Decode a message from an already-CRC-validated frame. Returns `None`
    /// for message ids this server does not act on: unknown message ids
    /// are dropped silently.
    pub fn decode(frame: &RawFrame) -> Option<FrameResult<Message>> {
        use ids::*;
        let p = &frame.payload;
        Some(match frame.msg_id {
            COMMAND_LONG => CommandLong::decode(p).map(Message::CommandLong),
            SET_VIDEO_STREAM_SETTINGS => {
                SetVideoStreamSettings::decode(p).map(Message::SetVideoStreamSettings)
            }
            PARAM_EXT_REQUEST_READ => {
                ParamExtRequestRead::decode(p).map(Message::ParamExtRequestRead)
            }
            PARAM_EXT_REQUEST_LIST => {
                ParamExtRequestList::decode(p).map(Message::ParamExtRequestList)
            }
            PARAM_EXT_SET => ParamExtSet::decode(p).map(Message::ParamExtSet),
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Outbound (encoded device → GCS)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Heartbeat {
    pub custom_mode: u32,
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub system_status: u8,
}

impl Heartbeat {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9);
        write_u32(&mut buf, self.custom_mode);
        buf.push(self.mav_type);
        buf.push(self.autopilot);
        buf.push(self.base_mode);
        buf.push(self.system_status);
        buf.push(3); // mavlink_version
        buf
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraInformation {
    pub time_boot_ms: u32,
    pub firmware_version: u32,
    pub focal_length: f32,
    pub sensor_size_h: f32,
    pub sensor_size_v: f32,
    pub flags: u32,
    pub resolution_h: u16,
    pub resolution_v: u16,
    pub cam_definition_version: u16,
    pub vendor_name: String,
    pub model_name: String,
    pub lens_id: u8,
    pub cam_definition_uri: String,
}

impl CameraInformation {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(235);
        write_u32(&mut buf, self.time_boot_ms);
        write_u32(&mut buf, self.firmware_version);
        write_f32(&mut buf, self.focal_length);
        write_f32(&mut buf, self.sensor_size_h);
        write_f32(&mut buf, self.sensor_size_v);
        write_u32(&mut buf, self.flags);
        write_u16(&mut buf, self.resolution_h);
        write_u16(&mut buf, self.resolution_v);
        write_u16(&mut buf, self.cam_definition_version);
        write_fixed_str(&mut buf, &self.vendor_name, VENDOR_WIDTH);
        write_fixed_str(&mut buf, &self.model_name, VENDOR_WIDTH);
        buf.push(self.lens_id);
        write_fixed_str(&mut buf, &self.cam_definition_uri, CAM_URI_WIDTH);
        buf
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub time_boot_ms: u32,
    pub focal_length: f32,
    pub aperture: f32,
    pub mode_id: u8,
    pub camera_device_id: u8,
}

impl CameraSettings {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(14);
        write_u32(&mut buf, self.time_boot_ms);
        write_f32(&mut buf, self.focal_length);
        write_f32(&mut buf, self.aperture);
        buf.push(self.mode_id);
        buf.push(self.camera_device_id);
        buf
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageInformation {
    pub time_boot_ms: u32,
    pub storage_id: u8,
    pub storage_count: u8,
    pub status: u8,
    pub total_capacity: f32,
    pub used_capacity: f32,
    pub available_capacity: f32,
    pub read_speed: f32,
    pub write_speed: f32,
}

impl StorageInformation {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(27);
        write_u32(&mut buf, self.time_boot_ms);
        write_f32(&mut buf, self.total_capacity);
        write_f32(&mut buf, self.used_capacity);
        write_f32(&mut buf, self.available_capacity);
        write_f32(&mut buf, self.read_speed);
        write_f32(&mut buf, self.write_speed);
        buf.push(self.storage_id);
        buf.push(self.storage_count);
        buf.push(self.status);
        buf
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoStreamInformation {
    pub stream_id: u8,
    pub count: u8,
    pub framerate: f32,
    pub resolution_h: u16,
    pub resolution_v: u16,
    pub bitrate: u32,
    pub rotation: u16,
    pub hfov: u16,
    pub uri: String,
}

impl VideoStreamInformation {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(178);
        write_u32(&mut buf, self.bitrate);
        write_f32(&mut buf, self.framerate);
        write_u16(&mut buf, self.resolution_h);
        write_u16(&mut buf, self.resolution_v);
        write_u16(&mut buf, self.rotation);
        write_u16(&mut buf, self.hfov);
        buf.push(self.stream_id);
        buf.push(self.count);
        write_fixed_str(&mut buf, &self.uri, STREAM_URI_WIDTH);
        buf
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandAck {
    pub command: u16,
    pub result: u8,
    pub progress: u8,
    pub target_system: u8,
    pub target_component: u8,
}

impl CommandAck {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10);
        write_i32(&mut buf, 0); // result_param2, unused
        write_u16(&mut buf, self.command);
        buf.push(self.result);
        buf.push(self.progress);
        buf.push(self.target_system);
        buf.push(self.target_component);
        buf
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamExtValue {
    pub param_id: String,
    pub param_value: [u8; PARAM_VALUE_WIDTH],
    pub param_type: u8,
    pub param_count: u16,
    pub param_index: u16,
}

impl ParamExtValue {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(149);
        write_u16(&mut buf, self.param_count);
        write_u16(&mut buf, self.param_index);
        write_fixed_str(&mut buf, &self.param_id, PARAM_ID_WIDTH);
        buf.extend_from_slice(&self.param_value);
        buf.push(self.param_type);
        buf
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamExtAck {
    pub param_id: String,
    pub param_value: [u8; PARAM_VALUE_WIDTH],
    pub param_type: u8,
    pub param_result: u8,
}

impl ParamExtAck {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(146);
        write_fixed_str(&mut buf, &self.param_id, PARAM_ID_WIDTH);
        buf.extend_from_slice(&self.param_value);
        buf.push(self.param_type);
        buf.push(self.param_result);
        buf
    }
}

/// Encoded device → GCS traffic. Each variant knows its own message id and
/// payload layout; [`Command::into_frame`] is the single place that turns
/// one into a wire-ready [`RawFrame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Heartbeat(Heartbeat),
    CameraInformation(CameraInformation),
    CameraSettings(CameraSettings),
    StorageInformation(StorageInformation),
    VideoStreamInformation(VideoStreamInformation),
    CommandAck(CommandAck),
    ParamExtValue(ParamExtValue),
    ParamExtAck(ParamExtAck),
}

impl Command {
    fn msg_id(&self) -> u32 {
        use ids::*;
        match self {
            Command::Heartbeat(_) => HEARTBEAT,
            Command::CameraInformation(_) => CAMERA_INFORMATION,
            Command::CameraSettings(_) => CAMERA_SETTINGS,
            Command::StorageInformation(_) => STORAGE_INFORMATION,
            Command::VideoStreamInformation(_) => VIDEO_STREAM_INFORMATION,
            Command::CommandAck(_) => COMMAND_ACK,
            Command::ParamExtValue(_) => PARAM_EXT_VALUE,
            Command::ParamExtAck(_) => PARAM_EXT_ACK,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            Command::Heartbeat(m) => m.encode(),
            Command::CameraInformation(m) => m.encode(),
            Command::CameraSettings(m) => m.encode(),
            Command::StorageInformation(m) => m.encode(),
            Command::VideoStreamInformation(m) => m.encode(),
            Command::CommandAck(m) => m.encode(),
            Command::ParamExtValue(m) => m.encode(),
            Command::ParamExtAck(m) => m.encode(),
        }
    }

    /// Build the wire-ready frame for this command, stamped with the
    /// server's own `(sys_id, comp_id)` and the next outbound sequence
    /// number.
    pub fn into_frame(self, seq: u8, sys_id: u8, comp_id: u8) -> RawFrame {
        RawFrame {
            seq,
            sys_id,
            comp_id,
            msg_id: self.msg_id(),
            payload: self.payload(),
        }
    }
}
