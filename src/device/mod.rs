//! Camera Device abstraction (C3): the uniform surface over real and
//! simulated cameras that the dispatcher and handlers call through.

pub mod resolver;
pub mod sim;
#[cfg(feature = "v4l2")]
pub mod v4l2;

use crate::error::ParamResult;
use crate::param::{ParamSchema, ParamStore, ParamType, ParamValue};

/// Operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Preview = 0,
    Still = 1,
    Video = 2,
}

/// Static per-device record. Immutable after device init.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInfo {
    pub vendor_name: String,
    pub model_name: String,
    pub firmware_version: u32,
    pub focal_length: f32,
    pub sensor_size_h: f32,
    pub sensor_size_v: f32,
    pub resolution_h: u16,
    pub resolution_v: u16,
    pub lens_id: u8,
    pub flags: u32,
    pub cam_definition_version: u16,
    pub cam_definition_uri: String,
}

/// `(width, height)` in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A pixel format with the non-empty ordered list of sizes it supports.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    pub pixel_format: String,
    pub frame_sizes: Vec<FrameSize>,
}

/// A non-owning index pair into a [`Stream`]'s own `formats` list,
/// modeled this way rather than as a pointer so moving the owning
/// `Stream` stays safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSizeRef {
    pub format_idx: usize,
    pub size_idx: usize,
}

/// A video stream a device can serve.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub id: u8,
    pub is_streaming: bool,
    pub formats: Vec<Format>,
    pub sel_frame_size: Option<FrameSizeRef>,
}

impl Stream {
    pub fn new(id: u8, formats: Vec<Format>) -> Self {
        Self {
            id,
            is_streaming: false,
            formats,
            sel_frame_size: None,
        }
    }

    pub fn selected_size(&self) -> Option<FrameSize> {
        self.sel_frame_size
            .map(|r| self.formats[r.format_idx].frame_sizes[r.size_idx])
    }
}

/// Polymorphic handle over a real or simulated camera.
pub trait CameraDevice {
    fn info(&self) -> &CameraInfo;
    fn streams(&self) -> &[Stream];
    fn streams_mut(&mut self) -> &mut [Stream];

    fn mode(&self) -> Mode;
    fn set_mode(&mut self, mode: Mode);

    fn get_param_type(&self, schema: &ParamSchema, name: &str) -> Option<ParamType> {
        schema.lookup(name).map(|(_, ty)| ty)
    }

    fn get_param(&self, schema: &ParamSchema, name: &str) -> ParamResult<ParamValue>;

    /// List the current value of every parameter that has one, in schema
    /// order.
    fn list_params(&self, schema: &ParamSchema) -> Vec<(&'static str, ParamValue)>;

    /// Validate against the schema, dispatch to a per-parameter setter
    /// (device-side effects for image-size, pixel-format, scene-mode,
    /// video-size, video-format; store-only for the rest), and on success
    /// update the parameter store.
    fn set_param(
        &mut self,
        schema: &ParamSchema,
        name: &str,
        value: ParamValue,
        declared_type: ParamType,
    ) -> ParamResult<()>;
}

/// Shared plumbing every [`CameraDevice`] implementation composes: the
/// parameter store plus the schema it validates against.
pub struct DeviceState {
    pub schema: ParamSchema,
    pub params: ParamStore,
}

impl DeviceState {
    pub fn new() -> Self {
        Self {
            schema: ParamSchema::standard(),
            params: ParamStore::new(),
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}
