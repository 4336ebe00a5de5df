//! Handlers (C9): one function per supported command/message, each
//! producing the replies to send — encoding and addressing stays here;
//! actual socket I/O belongs to `server.rs`.

use crate::device::resolver;
use crate::message::{
    mav_cmd, mav_result, param_ack, CameraInformation, CameraSettings, CommandAck, CommandLong,
    Command, ParamExtAck, ParamExtRequestList, ParamExtRequestRead, ParamExtSet,
    SetVideoStreamSettings, StorageInformation, VideoStreamInformation,
};
use crate::param::{ParamSchema, ParamType, ParamValue};
use crate::registry::ComponentRegistry;
use crate::rtsp::RtspUriProvider;

/// Where a reply goes: back to the datagram's source peer, or out on the
/// configured broadcast address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dest {
    Peer,
    Broadcast,
}

/// A reply plus whether it's contingent on the previous reply in the
/// batch actually reaching the wire. Only `REQUEST_CAMERA_INFORMATION`'s
/// ack uses the contingent form: if the outbound send fails, the ack is
/// logged and skipped rather than sent anyway.
///
/// Each variant carries the component ID of the camera that produced the
/// reply, so the outbound frame is stamped with that camera's own
/// `comp_id` rather than the server's single configured one — the same
/// per-component addressing `heartbeat::sweep` uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Always(Command, Dest, u8),
    IfPreviousSent(Command, Dest, u8),
}

/// Collaborators a handler needs beyond the registry: the server's own
/// system id (for ack addressing) and the RTSP URI provider.
pub struct HandlerCtx<'a> {
    pub system_id: u8,
    pub rtsp: &'a dyn RtspUriProvider,
    pub rtsp_server_addr: Option<&'a str>,
}

fn ack(command: u16, result: u8, ctx_system_id: u8, target_component: u8) -> Command {
    Command::CommandAck(CommandAck {
        command,
        result,
        progress: 255,
        target_system: ctx_system_id,
        target_component,
    })
}

pub fn handle_request_camera_information(
    ctx: &HandlerCtx,
    cmd: &CommandLong,
    registry: &ComponentRegistry,
) -> Vec<Reply> {
    if cmd.param1 != 1.0 {
        return vec![Reply::Always(
            ack(mav_cmd::REQUEST_CAMERA_INFORMATION, mav_result::ACCEPTED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        )];
    }
    let Some(device) = registry.lookup(cmd.target_component) else {
        return vec![Reply::Always(
            ack(mav_cmd::REQUEST_CAMERA_INFORMATION, mav_result::FAILED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        )];
    };
    let info = device.info();
    let info_cmd = Command::CameraInformation(CameraInformation {
        time_boot_ms: 0,
        firmware_version: info.firmware_version,
        focal_length: info.focal_length,
        sensor_size_h: info.sensor_size_h,
        sensor_size_v: info.sensor_size_v,
        flags: info.flags,
        resolution_h: info.resolution_h,
        resolution_v: info.resolution_v,
        cam_definition_version: info.cam_definition_version,
        vendor_name: info.vendor_name.clone(),
        model_name: info.model_name.clone(),
        lens_id: info.lens_id,
        cam_definition_uri: info.cam_definition_uri.clone(),
    });
    vec![
        Reply::Always(info_cmd, Dest::Peer, cmd.target_component),
        Reply::IfPreviousSent(
            ack(mav_cmd::REQUEST_CAMERA_INFORMATION, mav_result::ACCEPTED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        ),
    ]
}

pub fn handle_request_camera_settings(
    ctx: &HandlerCtx,
    cmd: &CommandLong,
    registry: &ComponentRegistry,
) -> Vec<Reply> {
    if cmd.param1 != 1.0 {
        return vec![Reply::Always(
            ack(mav_cmd::REQUEST_CAMERA_SETTINGS, mav_result::ACCEPTED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        )];
    }
    let Some(_device) = registry.lookup(cmd.target_component) else {
        return vec![Reply::Always(
            ack(mav_cmd::REQUEST_CAMERA_SETTINGS, mav_result::FAILED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        )];
    };
    // mode is hard-coded to 1 — see DESIGN.md (placeholder telemetry).
    let settings = Command::CameraSettings(CameraSettings {
        time_boot_ms: 0,
        focal_length: 0.0,
        aperture: 0.0,
        mode_id: 1,
        camera_device_id: cmd.target_component,
    });
    vec![
        Reply::Always(settings, Dest::Peer, cmd.target_component),
        Reply::Always(
            ack(mav_cmd::REQUEST_CAMERA_SETTINGS, mav_result::ACCEPTED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        ),
    ]
}

pub fn handle_request_storage_information(
    ctx: &HandlerCtx,
    cmd: &CommandLong,
    registry: &ComponentRegistry,
) -> Vec<Reply> {
    if cmd.param1 != 1.0 {
        return vec![Reply::Always(
            ack(mav_cmd::REQUEST_STORAGE_INFORMATION, mav_result::ACCEPTED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        )];
    }
    let Some(_device) = registry.lookup(cmd.target_component) else {
        return vec![Reply::Always(
            ack(mav_cmd::REQUEST_STORAGE_INFORMATION, mav_result::FAILED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        )];
    };
    // Placeholder capacity values — see DESIGN.md.
    let storage = Command::StorageInformation(StorageInformation {
        time_boot_ms: 0,
        storage_id: 1,
        storage_count: 1,
        status: 2, // STORAGE_STATUS_READY / formatted
        total_capacity: 50.0,
        used_capacity: 0.0,
        available_capacity: 50.0,
        read_speed: 128.0,
        write_speed: 128.0,
    });
    vec![
        Reply::Always(storage, Dest::Peer, cmd.target_component),
        Reply::Always(
            ack(mav_cmd::REQUEST_STORAGE_INFORMATION, mav_result::ACCEPTED, ctx.system_id, cmd.target_component),
            Dest::Peer,
            cmd.target_component,
        ),
    ]
}

/// No ack is sent for this command.
pub fn handle_request_video_stream_information(
    ctx: &HandlerCtx,
    cmd: &CommandLong,
    registry: &mut ComponentRegistry,
) -> Vec<Reply> {
    let action = cmd.param2;
    if action != 1.0 {
        return vec![];
    }
    let camera_id = cmd.param1 as u8;
    let Some(device) = registry.lookup_mut(cmd.target_component) else {
        return vec![];
    };

    let mut replies = Vec::new();
    for stream in device.streams_mut() {
        if camera_id != 0 && stream.id != camera_id {
            continue;
        }
        let (size, suffix) = match stream.selected_size() {
            Some(sel) => (sel, format!("?width={}&height={}", sel.width, sel.height)),
            None => {
                let r = resolver::resolve(stream, u32::MAX, u32::MAX);
                match r.map(|r| stream.formats[r.format_idx].frame_sizes[r.size_idx]) {
                    Some(sel) => (sel, String::new()),
                    None => continue,
                }
            }
        };
        let uri = ctx.rtsp.get_rtsp_uri(ctx.rtsp_server_addr, stream.id, &suffix);
        replies.push(Reply::Always(
            Command::VideoStreamInformation(VideoStreamInformation {
                stream_id: stream.id,
                count: 1,
                framerate: 30.0,
                resolution_h: size.width as u16,
                resolution_v: size.height as u16,
                bitrate: 0,
                rotation: 0,
                hfov: 0,
                uri,
            }),
            Dest::Peer,
            cmd.target_component,
        ));
    }
    replies
}

/// No reply.
pub fn handle_set_video_stream_settings(
    msg: &SetVideoStreamSettings,
    registry: &mut ComponentRegistry,
) {
    let Some(device) = registry.lookup_mut(msg.target_component) else {
        log::debug!("SET_VIDEO_STREAM_SETTINGS: unknown component {}", msg.target_component);
        return;
    };
    let Some(stream) = device.streams_mut().iter_mut().find(|s| s.id == msg.camera_id) else {
        log::debug!("SET_VIDEO_STREAM_SETTINGS: unknown stream {}", msg.camera_id);
        return;
    };
    if msg.resolution_h == 0 || msg.resolution_v == 0 {
        stream.sel_frame_size = None;
        return;
    }
    stream.sel_frame_size = resolver::resolve(stream, msg.resolution_h as u32, msg.resolution_v as u32);
}

pub fn handle_param_ext_request_read(
    msg: &ParamExtRequestRead,
    registry: &ComponentRegistry,
) -> Vec<Reply> {
    let Some(device) = registry.lookup(msg.target_component) else {
        return vec![];
    };
    let schema = ParamSchema::standard();
    match device.get_param(&schema, &msg.param_id) {
        Ok(value) => {
            let ty = schema.lookup(&msg.param_id).map(|(_, t)| t).unwrap();
            vec![Reply::Always(
                Command::ParamExtValue(crate::message::ParamExtValue {
                    param_id: msg.param_id.clone(),
                    param_value: value.0,
                    param_type: ty.wire_value(),
                    param_count: 1,
                    param_index: 0,
                }),
                Dest::Peer,
                msg.target_component,
            )]
        }
        Err(_) => vec![Reply::Always(
            Command::ParamExtAck(ParamExtAck {
                param_id: msg.param_id.clone(),
                param_value: ParamValue::from_u8(0).0,
                param_type: 0,
                param_result: param_ack::FAILED,
            }),
            Dest::Peer,
            msg.target_component,
        )],
    }
}

pub fn handle_param_ext_request_list(
    msg: &ParamExtRequestList,
    registry: &ComponentRegistry,
) -> Vec<Reply> {
    let Some(device) = registry.lookup(msg.target_component) else {
        return vec![];
    };
    let schema = ParamSchema::standard();
    let entries = device.list_params(&schema);
    let count = entries.len() as u16;
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (name, value))| {
            let ty = schema.lookup(name).map(|(_, t)| t).unwrap();
            Reply::Always(
                Command::ParamExtValue(crate::message::ParamExtValue {
                    param_id: name.to_string(),
                    param_value: value.0,
                    param_type: ty.wire_value(),
                    param_count: count,
                    param_index: idx as u16,
                }),
                Dest::Peer,
                msg.target_component,
            )
        })
        .collect()
}

pub fn handle_param_ext_set(msg: &ParamExtSet, registry: &mut ComponentRegistry) -> Vec<Reply> {
    let Some(device) = registry.lookup_mut(msg.target_component) else {
        return vec![];
    };
    let schema = ParamSchema::standard();

    // The type the GCS actually declared on the wire, not the schema's
    // type for this name — `ParamStore::set_current` is the one that
    // checks the two against each other and fails the request if they
    // disagree.
    let Some(declared_type) = ParamType::from_wire_value(msg.param_type) else {
        return vec![Reply::Always(
            Command::ParamExtAck(ParamExtAck {
                param_id: msg.param_id.clone(),
                param_value: msg.param_value,
                param_type: msg.param_type,
                param_result: param_ack::FAILED,
            }),
            Dest::Peer,
            msg.target_component,
        )];
    };

    let value = ParamValue::from_bytes(msg.param_value);
    match device.set_param(&schema, &msg.param_id, value, declared_type) {
        Ok(()) => vec![Reply::Always(
            Command::ParamExtAck(ParamExtAck {
                param_id: msg.param_id.clone(),
                param_value: msg.param_value,
                param_type: declared_type.wire_value(),
                param_result: param_ack::ACCEPTED,
            }),
            Dest::Peer,
            msg.target_component,
        )],
        Err(e) => {
            log::warn!("PARAM_EXT_SET {:?} rejected: {e}", msg.param_id);
            let current = device
                .get_param(&schema, &msg.param_id)
                .unwrap_or_else(|_| ParamValue::from_u8(0));
            vec![Reply::Always(
                Command::ParamExtAck(ParamExtAck {
                    param_id: msg.param_id.clone(),
                    param_value: current.0,
                    param_type: declared_type.wire_value(),
                    param_result: param_ack::FAILED,
                }),
                Dest::Peer,
                msg.target_component,
            )]
        }
    }
}
