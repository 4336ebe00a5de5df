//! Command Dispatcher (C8): feeds inbound bytes through the codec, filters
//! `COMMAND_LONG` traffic to this server's configured system/component
//! range, and routes decoded messages to their handler.

use std::collections::HashMap;
use std::net::SocketAddr;

use crate::frame::FrameParser;
use crate::handlers::{self, HandlerCtx, Reply};
use crate::message::{mav_cmd, Message};
use crate::registry::{ComponentRegistry, MAV_COMP_ID_CAMERA, MAV_COMP_ID_CAMERA6};

/// Routes one UDP endpoint's traffic across however many peers are
/// talking to it, keeping one codec parser per peer so that byte-order
/// decoding is preserved per-connection.
pub struct Dispatcher {
    system_id: u8,
    parsers: HashMap<SocketAddr, FrameParser>,
}

impl Dispatcher {
    pub fn new(system_id: u8) -> Self {
        Self {
            system_id,
            parsers: HashMap::new(),
        }
    }

    /// Entry point: `on_datagram(peer_addr, payload)`.
    pub fn on_datagram(
        &mut self,
        ctx: &HandlerCtx,
        peer_addr: SocketAddr,
        payload: &[u8],
        registry: &mut ComponentRegistry,
    ) -> Vec<Reply> {
        let parser = self.parsers.entry(peer_addr).or_default();
        let frames = parser.push_bytes(payload);

        let mut replies = Vec::new();
        for frame in frames {
            let Some(decoded) = Message::decode(&frame) else {
                log::debug!("dispatcher: unhandled message id {} from {peer_addr}", frame.msg_id);
                continue;
            };
            let message = match decoded {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("dispatcher: decode failed for msgid {}: {e}", frame.msg_id);
                    continue;
                }
            };
            replies.extend(self.dispatch_message(ctx, message, registry));
        }
        replies
    }

    fn dispatch_message(
        &self,
        ctx: &HandlerCtx,
        message: Message,
        registry: &mut ComponentRegistry,
    ) -> Vec<Reply> {
        match message {
            Message::CommandLong(cmd) => {
                if cmd.target_system != self.system_id {
                    return vec![];
                }
                if !(MAV_COMP_ID_CAMERA..=MAV_COMP_ID_CAMERA6).contains(&cmd.target_component) {
                    return vec![];
                }
                match cmd.command {
                    mav_cmd::REQUEST_CAMERA_INFORMATION => {
                        handlers::handle_request_camera_information(ctx, &cmd, registry)
                    }
                    mav_cmd::REQUEST_CAMERA_SETTINGS => {
                        handlers::handle_request_camera_settings(ctx, &cmd, registry)
                    }
                    mav_cmd::REQUEST_STORAGE_INFORMATION => {
                        handlers::handle_request_storage_information(ctx, &cmd, registry)
                    }
                    mav_cmd::REQUEST_VIDEO_STREAM_INFORMATION => {
                        handlers::handle_request_video_stream_information(ctx, &cmd, registry)
                    }
                    other => {
                        log::debug!("dispatcher: unhandled COMMAND_LONG command {other}");
                        vec![]
                    }
                }
            }
            Message::SetVideoStreamSettings(msg) => {
                handlers::handle_set_video_stream_settings(&msg, registry);
                vec![]
            }
            Message::ParamExtRequestRead(msg) => {
                handlers::handle_param_ext_request_read(&msg, registry)
            }
            Message::ParamExtRequestList(msg) => {
                handlers::handle_param_ext_request_list(&msg, registry)
            }
            Message::ParamExtSet(msg) => handlers::handle_param_ext_set(&msg, registry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::sim::GazeboSimDevice;
    use crate::handlers::Dest;
    use crate::message::{ids, mav_result, Command};
    use crate::rtsp::DefaultRtspUriProvider;

    fn ctx(rtsp: &DefaultRtspUriProvider) -> HandlerCtx<'_> {
        HandlerCtx {
            system_id: 1,
            rtsp,
            rtsp_server_addr: None,
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:14550".parse().unwrap()
    }

    #[test]
    fn filters_wrong_target_system() {
        let mut dispatcher = Dispatcher::new(1);
        let mut registry = ComponentRegistry::new();
        let comp_id = registry.add(Box::new(GazeboSimDevice::new())).unwrap();
        let rtsp = DefaultRtspUriProvider;
        let c = ctx(&rtsp);

        let request = build_command_long(2, comp_id, mav_cmd::REQUEST_CAMERA_INFORMATION, 1.0, 0.0);
        let replies = dispatcher.on_datagram(&c, peer(), &request, &mut registry);
        assert!(replies.is_empty());
    }

    #[test]
    fn camera_info_round_trip_produces_info_then_ack() {
        let mut dispatcher = Dispatcher::new(1);
        let mut registry = ComponentRegistry::new();
        let comp_id = registry.add(Box::new(GazeboSimDevice::new())).unwrap();
        let rtsp = DefaultRtspUriProvider;
        let c = ctx(&rtsp);

        let request = build_command_long(1, comp_id, mav_cmd::REQUEST_CAMERA_INFORMATION, 1.0, 0.0);
        let replies = dispatcher.on_datagram(&c, peer(), &request, &mut registry);
        assert_eq!(replies.len(), 2);
        assert!(matches!(replies[0], Reply::Always(Command::CameraInformation(_), Dest::Peer, id) if id == comp_id));
        match &replies[1] {
            Reply::IfPreviousSent(Command::CommandAck(ack), Dest::Peer, id) => {
                assert_eq!(ack.result, mav_result::ACCEPTED);
                assert_eq!(*id, comp_id);
            }
            other => panic!("unexpected second reply: {other:?}"),
        }
    }

    fn build_command_long(target_system: u8, target_component: u8, command: u16, param1: f32, param2: f32) -> Vec<u8> {
        use crate::codec::{write_f32, write_u16};
        let mut payload = Vec::new();
        write_f32(&mut payload, param1);
        write_f32(&mut payload, param2);
        for _ in 0..5 {
            write_f32(&mut payload, 0.0);
        }
        write_u16(&mut payload, command);
        payload.push(target_system);
        payload.push(target_component);
        payload.push(0); // confirmation

        let frame = crate::frame::RawFrame {
            seq: 0,
            sys_id: 255,
            comp_id: 190,
            msg_id: ids::COMMAND_LONG,
            payload,
        };
        frame.encode().unwrap()
    }
}
