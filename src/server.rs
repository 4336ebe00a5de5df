//! Server Lifecycle (C11): config load, socket open, timer registration,
//! shutdown. Wires the dispatcher, registry, heartbeat emitter, and RTSP
//! collaborator together around a main-loop handle passed into the
//! constructor rather than a process-wide static, so tests can inject a
//! fake one.

use std::cell::Cell;
use std::net::{SocketAddr, UdpSocket};
use std::rc::Rc;
use std::time::Duration;

use crate::config::MavlinkConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{CoreError, CoreResult};
use crate::handlers::{Dest, HandlerCtx, Reply};
use crate::heartbeat;
use crate::mainloop::{MainLoop, TimeoutHandle};
use crate::message::Command;
use crate::registry::ComponentRegistry;
use crate::rtsp::{DefaultRtspUriProvider, RtspUriProvider};

const HEARTBEAT_INTERVAL_MS: u64 = 1000;
const MAX_DATAGRAM: usize = 1024;

pub struct Server<M: MainLoop> {
    config: MavlinkConfig,
    mainloop: M,
    dispatcher: Dispatcher,
    registry: ComponentRegistry,
    rtsp: Box<dyn RtspUriProvider>,
    socket: Option<UdpSocket>,
    heartbeat_handle: Option<TimeoutHandle>,
    heartbeat_due: Rc<Cell<bool>>,
    seq: u8,
    running: bool,
}

impl<M: MainLoop> Server<M> {
    pub fn new(config: MavlinkConfig, mainloop: M) -> Self {
        Self {
            dispatcher: Dispatcher::new(config.system_id),
            config,
            mainloop,
            registry: ComponentRegistry::new(),
            rtsp: Box::new(DefaultRtspUriProvider),
            socket: None,
            heartbeat_handle: None,
            heartbeat_due: Rc::new(Cell::new(false)),
            seq: 0,
            running: false,
        }
    }

    pub fn set_rtsp_provider(&mut self, provider: Box<dyn RtspUriProvider>) {
        self.rtsp = provider;
    }

    /// Exposed so the embedder can `add`/`remove` devices before `start()`
    /// — registry mutation outside serving is the embedder's
    /// responsibility.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Idempotent: opens the broadcast-enabled UDP socket and installs the
    /// heartbeat timer.
    pub fn start(&mut self) -> CoreResult<()> {
        if self.running {
            return Ok(());
        }
        let socket = UdpSocket::bind(("0.0.0.0", self.config.port))?;
        socket.set_broadcast(true)?;
        socket.set_read_timeout(Some(Duration::from_millis(HEARTBEAT_INTERVAL_MS)))?;
        self.socket = Some(socket);

        let due = self.heartbeat_due.clone();
        let handle = self
            .mainloop
            .add_timeout(HEARTBEAT_INTERVAL_MS, Box::new(move || due.set(true)));
        self.heartbeat_handle = Some(handle);
        self.running = true;
        Ok(())
    }

    /// Idempotent: cancels the heartbeat timer. Socket closure happens on
    /// drop, not by an explicit close call here.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        if let Some(handle) = self.heartbeat_handle.take() {
            self.mainloop.del_timeout(handle);
        }
        self.socket = None;
        self.running = false;
    }

    /// Block for up to the heartbeat interval waiting on an inbound
    /// datagram, dispatch it if one arrived, then fire any due timers.
    /// This is the system's only blocking point.
    pub fn run_once(&mut self) -> CoreResult<()> {
        if !self.running {
            return Ok(());
        }
        let mut buf = [0u8; MAX_DATAGRAM];
        let socket = self.socket.as_ref().expect("running implies an open socket");
        let received = socket.recv_from(&mut buf);

        match received {
            Ok((len, peer)) => self.handle_datagram(peer, &buf[..len]),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => return Err(CoreError::Io(e)),
        }

        self.mainloop.fire_due();
        if self.heartbeat_due.replace(false) {
            self.emit_heartbeats();
        }
        Ok(())
    }

    fn handle_datagram(&mut self, peer: SocketAddr, payload: &[u8]) {
        let ctx = HandlerCtx {
            system_id: self.config.system_id,
            rtsp: self.rtsp.as_ref(),
            rtsp_server_addr: self.config.rtsp_server_addr.as_deref(),
        };
        let replies = self
            .dispatcher
            .on_datagram(&ctx, peer, payload, &mut self.registry);
        self.send_replies(replies, peer);
    }

    fn send_replies(&mut self, replies: Vec<Reply>, peer: SocketAddr) {
        let mut last_sent = true;
        for reply in replies {
            let (command, dest, comp_id, contingent) = match reply {
                Reply::Always(c, d, comp_id) => (c, d, comp_id, false),
                Reply::IfPreviousSent(c, d, comp_id) => (c, d, comp_id, true),
            };
            if contingent && !last_sent {
                log::warn!("skipping reply: previous send in this batch failed");
                continue;
            }
            let target = match dest {
                Dest::Peer => peer,
                Dest::Broadcast => self.broadcast_addr(),
            };
            last_sent = self.send_command(command, comp_id, target);
        }
    }

    fn emit_heartbeats(&mut self) {
        let broadcast = self.broadcast_addr();
        for (comp_id, command) in heartbeat::sweep(&self.registry) {
            self.send_command(command, comp_id, broadcast);
        }
    }

    fn broadcast_addr(&self) -> SocketAddr {
        format!("{}:{}", self.config.broadcast_addr, self.config.port)
            .parse()
            .unwrap_or_else(|_| ([255, 255, 255, 255], self.config.port).into())
    }

    fn send_command(&mut self, command: Command, comp_id: u8, dest: SocketAddr) -> bool {
        let frame = command.into_frame(self.seq, self.config.system_id, comp_id);
        self.seq = self.seq.wrapping_add(1);
        let Some(wire) = frame.encode() else {
            log::error!("send_command: no CRC_EXTRA for msgid {}", frame.msg_id);
            return false;
        };
        let Some(socket) = self.socket.as_ref() else {
            return false;
        };
        match socket.send_to(&wire, dest) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("send to {dest} failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::sim::GazeboSimDevice;
    use crate::mainloop::StdMainLoop;

    #[test]
    fn start_is_idempotent() {
        let mut server = Server::new(
            MavlinkConfig {
                port: 0, // ephemeral port, avoids clashing with a real daemon in CI
                ..MavlinkConfig::default()
            },
            StdMainLoop::new(),
        );
        server.start().unwrap();
        assert!(server.is_running());
        server.start().unwrap();
        assert!(server.is_running());
        server.stop();
        assert!(!server.is_running());
        server.stop();
        assert!(!server.is_running());
    }

    #[test]
    fn registry_accepts_devices_before_start() {
        let mut server = Server::new(
            MavlinkConfig { port: 0, ..MavlinkConfig::default() },
            StdMainLoop::new(),
        );
        let id = server.registry_mut().add(Box::new(GazeboSimDevice::new())).unwrap();
        assert_eq!(id, 100);
    }
}
