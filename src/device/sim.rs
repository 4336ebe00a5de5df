//! Simulated camera plugin (C4): a static device list standing in for a
//! Gazebo-fed virtual camera, used in tests and when no V4L2 hardware is
//! present.

use crate::device::{CameraDevice, CameraInfo, DeviceState, Format, FrameSize, Mode, Stream};
use crate::error::ParamResult;
use crate::param::{ParamSchema, ParamType, ParamValue};

pub struct GazeboSimDevice {
    info: CameraInfo,
    streams: Vec<Stream>,
    mode: Mode,
    state: DeviceState,
}

impl GazeboSimDevice {
    pub fn new() -> Self {
        let formats = vec![Format {
            pixel_format: "I420".to_string(),
            frame_sizes: vec![
                FrameSize::new(640, 480),
                FrameSize::new(1280, 720),
                FrameSize::new(1920, 1080),
            ],
        }];
        Self {
            info: CameraInfo {
                vendor_name: "Gazebo".to_string(),
                model_name: "SimCam".to_string(),
                firmware_version: 1,
                focal_length: 2.8,
                sensor_size_h: 3.6,
                sensor_size_v: 2.7,
                resolution_h: 1920,
                resolution_v: 1080,
                lens_id: 0,
                flags: 0,
                cam_definition_version: 1,
                cam_definition_uri: String::new(),
            },
            streams: vec![Stream::new(0, formats)],
            mode: Mode::Preview,
            state: DeviceState::new(),
        }
    }
}

impl Default for GazeboSimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDevice for GazeboSimDevice {
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
        self.state.params.set_current(schema, name, value, declared_type)
    }
}

/// Discovers the fixed list of simulated cameras: a single static
/// Gazebo feed, standing in for real hardware in tests and no-capture
/// environments.
pub struct SimPlugin;

impl SimPlugin {
    pub fn list_devices() -> Vec<String> {
        vec!["gazebo://sim0".to_string()]
    }

    pub fn create_device(uri: &str) -> Option<GazeboSimDevice> {
        if uri == "gazebo://sim0" {
            Some(GazeboSimDevice::new())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_one_static_device() {
        assert_eq!(SimPlugin::list_devices(), vec!["gazebo://sim0"]);
    }

    #[test]
    fn creates_known_device_only() {
        assert!(SimPlugin::create_device("gazebo://sim0").is_some());
        assert!(SimPlugin::create_device("gazebo://nope").is_none());
    }

    #[test]
    fn info_matches_construction() {
        let dev = GazeboSimDevice::new();
        assert_eq!(dev.info().vendor_name, "Gazebo");
        assert_eq!(dev.streams().len(), 1);
    }
}
