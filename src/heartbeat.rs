//! Heartbeat Emitter (C10): periodic per-component heartbeat broadcast.

use crate::message::{Command, Heartbeat};
use crate::registry::ComponentRegistry;

const MAV_TYPE_GENERIC: u8 = 0;
const MAV_AUTOPILOT_INVALID: u8 = 8;
const MAV_MODE_PREFLIGHT: u8 = 0;
const MAV_STATE_ACTIVE: u8 = 4;

/// One `HEARTBEAT` command per currently-bound component.
/// Pure: building the commands is separate from sending them so the
/// timer-tick callback (owned by the main loop) only has to hand each one
/// to the socket.
pub fn sweep(registry: &ComponentRegistry) -> Vec<(u8, Command)> {
    registry
        .bound_ids()
        .into_iter()
        .map(|comp_id| {
            (
                comp_id,
                Command::Heartbeat(Heartbeat {
                    custom_mode: 0,
                    mav_type: MAV_TYPE_GENERIC,
                    autopilot: MAV_AUTOPILOT_INVALID,
                    base_mode: MAV_MODE_PREFLIGHT,
                    system_status: MAV_STATE_ACTIVE,
                }),
            )
        })
        .collect()
}
