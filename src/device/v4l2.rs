//! V4L2 device plugin (C4). Scans `/dev/video*` nodes and wraps each one
//! in a [`CameraDevice`] backed by the `v4l` crate's ioctl surface.

use v4l::control::Value;
use v4l::framesize::FrameSizeEnum;
use v4l::prelude::*;
use v4l::video::Capture;

use crate::device::{CameraDevice, CameraInfo, DeviceState, Format, FrameSize, Mode, Stream};
use crate::error::{ParamError, ParamResult};
use crate::param::{ParamSchema, ParamType, ParamValue};

/// Parameter names that reconfigure the capture pipeline rather than
/// living only in the store.
const IMAGE_SIZE: &str = "image-size";
const PIXEL_FORMAT: &str = "pixel-format";
const SCENE_MODE: &str = "scene-mode";
const VIDEO_SIZE: &str = "video-size";
const VIDEO_FORMAT: &str = "video-format";

/// A V4L2-backed camera. Formats and sizes are captured at construction
/// time via `enum_formats`/`enum_framesizes`; the underlying `v4l::Device`
/// handle is kept open for later `setParam`/`getParam` ioctl dispatch.
pub struct V4l2Device {
    path: String,
    info: CameraInfo,
    streams: Vec<Stream>,
    mode: Mode,
    state: DeviceState,
    device: Device,
}

impl V4l2Device {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `image-size`/`video-size` values pack `width` and `height` into a
    /// single `u32`, high half first.
    fn unpack_size(packed: u32) -> (u32, u32) {
        (packed >> 16, packed & 0xffff)
    }

    fn set_format(&mut self, name: &str, value: ParamValue) -> ParamResult<()> {
        let current = self
            .device
            .format()
            .map_err(|e| ParamError::DeviceError(name.to_string(), e.to_string()))?;
        let fourcc = match name {
            PIXEL_FORMAT | VIDEO_FORMAT => v4l::FourCC::new(&value.as_u32().to_le_bytes()),
            _ => current.fourcc,
        };
        let (width, height) = match name {
            IMAGE_SIZE | VIDEO_SIZE => Self::unpack_size(value.as_u32()),
            _ => (current.width, current.height),
        };
        let requested = v4l::Format::new(width, height, fourcc);
        self.device
            .set_format(&requested)
            .map_err(|e| ParamError::DeviceError(name.to_string(), e.to_string()))?;
        Ok(())
    }

    fn set_scene_mode(&mut self, value: ParamValue) -> ParamResult<()> {
        let id = self
            .device
            .query_controls()
            .map_err(|e| ParamError::DeviceError(SCENE_MODE.to_string(), e.to_string()))?
            .into_iter()
            .find(|d| d.name.to_lowercase().contains("scene"))
            .map(|d| d.id)
            .ok_or_else(|| {
                ParamError::DeviceError(SCENE_MODE.to_string(), "device has no scene control".to_string())
            })?;
        self.device
            .set_controls(vec![v4l::Control {
                id,
                value: Value::Integer(value.as_u32() as i64),
            }])
            .map_err(|e| ParamError::DeviceError(SCENE_MODE.to_string(), e.to_string()))
    }
}

/// Build the camera info + single-stream format list for a just-opened
/// V4L2 node.
fn build_from_caps(device: Device, path: &str, card: String, driver: String, formats: Vec<Format>) -> V4l2Device {
    let info = CameraInfo {
        vendor_name: driver,
        model_name: card,
        firmware_version: 0,
        focal_length: 0.0,
        sensor_size_h: 0.0,
        sensor_size_v: 0.0,
        resolution_h: formats
            .first()
            .and_then(|f| f.frame_sizes.last())
            .map(|fs| fs.width as u16)
            .unwrap_or(0),
        resolution_v: formats
            .first()
            .and_then(|f| f.frame_sizes.last())
            .map(|fs| fs.height as u16)
            .unwrap_or(0),
        lens_id: 0,
        flags: 0,
        cam_definition_version: 1,
        cam_definition_uri: String::new(),
    };
    V4l2Device {
        path: path.to_string(),
        streams: vec![Stream::new(0, formats)],
        info,
        mode: Mode::Preview,
        state: DeviceState::new(),
        device,
    }
}

impl CameraDevice for V4l2Device {
    fn info(&self) -> &CameraInfo {
        &self.info
    }

    fn streams(&self) -> &[Stream] {
        &self.streams
    }

    fn streams_mut(&mut self) -> &mut [Stream] {
        &mut self.streams
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn get_param(&self, schema: &ParamSchema, name: &str) -> ParamResult<ParamValue> {
        self.state.params.get_current(schema, name)
    }

    fn list_params(&self, schema: &ParamSchema) -> Vec<(&'static str, ParamValue)> {
        self.state.params.list_current(schema)
    }

    fn set_param(
        &mut self,
        schema: &ParamSchema,
        name: &str,
        value: ParamValue,
        declared_type: ParamType,
    ) -> ParamResult<()> {
        match name {
            IMAGE_SIZE | VIDEO_SIZE | PIXEL_FORMAT | VIDEO_FORMAT => self.set_format(name, value)?,
            SCENE_MODE => self.set_scene_mode(value)?,
            _ => {}
        }
        self.state.params.set_current(schema, name, value, declared_type)
    }
}

/// Discovers `/dev/video*` nodes. `list_devices` returns URIs;
/// `create_device` opens one.
pub struct V4l2Plugin;

impl V4l2Plugin {
    pub fn list_devices() -> Vec<String> {
        let mut found = Vec::new();
        let entries = match std::fs::read_dir("/dev") {
            Ok(e) => e,
            Err(e) => {
                log::warn!("v4l2 plugin: failed to scan /dev: {e}");
                return found;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("video") {
                found.push(format!("/dev/{name}"));
            }
        }
        found.sort();
        found
    }

    pub fn create_device(uri: &str) -> Option<V4l2Device> {
        let dev = match Device::with_path(uri) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("v4l2 plugin: failed to open {uri}: {e}");
                return None;
            }
        };
        let caps = match dev.query_caps() {
            Ok(c) => c,
            Err(e) => {
                log::warn!("v4l2 plugin: query_caps failed for {uri}: {e}");
                return None;
            }
        };

        let mut frame_sizes_by_format: Vec<Format> = Vec::new();
        if let Ok(format_iter) = dev.enum_formats() {
            for fmt_desc in format_iter {
                let mut sizes = Vec::new();
                if let Ok(size_iter) = dev.enum_framesizes(fmt_desc.fourcc) {
                    for entry in size_iter {
                        match entry.size {
                            FrameSizeEnum::Discrete(d) => {
                                sizes.push(FrameSize::new(d.width, d.height));
                            }
                            FrameSizeEnum::Stepwise(s) => {
                                sizes.push(FrameSize::new(s.max_width, s.max_height));
                            }
                        }
                    }
                }
                if !sizes.is_empty() {
                    frame_sizes_by_format.push(Format {
                        pixel_format: format!("{:?}", fmt_desc.fourcc),
                        frame_sizes: sizes,
                    });
                }
            }
        }

        if frame_sizes_by_format.is_empty() {
            log::warn!("v4l2 plugin: {uri} advertised no usable formats");
            return None;
        }

        Some(build_from_caps(dev, uri, caps.card, caps.driver, frame_sizes_by_format))
    }
}
