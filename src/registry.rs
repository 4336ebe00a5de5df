//! Component Registry (C7): assigns MAVLink component IDs to devices and
//! looks devices up by ID.

use crate::device::CameraDevice;
use crate::error::RegistryError;

/// First camera component ID: camera components use IDs 100-105,
/// `MAV_COMP_ID_CAMERA` through `MAV_COMP_ID_CAMERA6`.
pub const MAV_COMP_ID_CAMERA: u8 = 100;
pub const MAV_COMP_ID_CAMERA6: u8 = 105;
const SLOT_COUNT: usize = (MAV_COMP_ID_CAMERA6 - MAV_COMP_ID_CAMERA + 1) as usize;

/// Binds up to six camera devices to the fixed `CAMERA..CAMERA6`
/// component-ID range, first-free ascending.
pub struct ComponentRegistry {
    slots: [Option<Box<dyn CameraDevice>>; SLOT_COUNT],
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Bind `device` at the first unbound slot, returning its assigned
    /// component ID, or `OutOfSlots` if all six are occupied.
    pub fn add(&mut self, device: Box<dyn CameraDevice>) -> Result<u8, RegistryError> {
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(device);
                return Ok(MAV_COMP_ID_CAMERA + idx as u8);
            }
        }
        Err(RegistryError::OutOfSlots)
    }

    /// Unbind whatever device currently occupies `component_id`. No-op if
    /// the ID is out of range or already unbound.
    pub fn remove(&mut self, component_id: u8) {
        if let Some(idx) = Self::slot_index(component_id) {
            self.slots[idx] = None;
        }
    }

    pub fn lookup(&self, component_id: u8) -> Option<&dyn CameraDevice> {
        let idx = Self::slot_index(component_id)?;
        self.slots[idx].as_deref()
    }

    pub fn lookup_mut(&mut self, component_id: u8) -> Option<&mut (dyn CameraDevice + 'static)> {
        let idx = Self::slot_index(component_id)?;
        self.slots[idx].as_deref_mut()
    }

    /// All bound `(component_id, device)` pairs, ascending by ID — used by
    /// the heartbeat emitter's sweep.
    pub fn bound_ids(&self) -> Vec<u8> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|_| MAV_COMP_ID_CAMERA + idx as u8))
            .collect()
    }

    fn slot_index(component_id: u8) -> Option<usize> {
        if (MAV_COMP_ID_CAMERA..=MAV_COMP_ID_CAMERA6).contains(&component_id) {
            Some((component_id - MAV_COMP_ID_CAMERA) as usize)
        } else {
            None
        }
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::sim::GazeboSimDevice;

    fn device() -> Box<dyn CameraDevice> {
        Box::new(GazeboSimDevice::new())
    }

    #[test]
    fn assigns_ascending_then_out_of_slots() {
        let mut reg = ComponentRegistry::new();
        let expected = [100, 101, 102, 103, 104, 105];
        for &id in &expected {
            assert_eq!(reg.add(device()).unwrap(), id);
        }
        assert!(matches!(reg.add(device()), Err(RegistryError::OutOfSlots)));
    }

    #[test]
    fn remove_frees_slot_for_reassignment() {
        let mut reg = ComponentRegistry::new();
        for _ in 0..6 {
            reg.add(device()).unwrap();
        }
        reg.remove(102); // CAMERA3
        assert_eq!(reg.add(device()).unwrap(), 102);
    }

    #[test]
    fn lookup_outside_range_is_none() {
        let mut reg = ComponentRegistry::new();
        reg.add(device()).unwrap();
        assert!(reg.lookup(99).is_none());
        assert!(reg.lookup(106).is_none());
        assert!(reg.lookup(100).is_some());
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut reg = ComponentRegistry::new();
        reg.add(device()).unwrap();
        reg.remove(105);
        assert!(reg.lookup(100).is_some());
    }
}
