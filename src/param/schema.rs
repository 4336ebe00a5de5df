//! Parameter Schema (C1): the static name ↔ (id, type) registry.

/// Scalar type tag for a parameter's opaque wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Uint8,
    Int32,
    Uint32,
    Real32,
}

impl ParamType {
    /// Byte width of the scalar this type carries within the 128-byte
    /// opaque value buffer.
    pub fn byte_width(self) -> usize {
        match self {
            ParamType::Uint8 => 1,
            ParamType::Int32 | ParamType::Uint32 | ParamType::Real32 => 4,
        }
    }

    /// `MAV_PARAM_EXT_TYPE` wire value.
    pub fn wire_value(self) -> u8 {
        match self {
            ParamType::Uint8 => 1,
            ParamType::Uint32 => 5,
            ParamType::Int32 => 6,
            ParamType::Real32 => 9,
        }
    }

    /// Inverse of [`ParamType::wire_value`]. `None` for a byte the
    /// `MAV_PARAM_EXT_TYPE` enum doesn't define or that this server
    /// doesn't carry a schema entry for.
    pub fn from_wire_value(v: u8) -> Option<Self> {
        match v {
            1 => Some(ParamType::Uint8),
            5 => Some(ParamType::Uint32),
            6 => Some(ParamType::Int32),
            9 => Some(ParamType::Real32),
            _ => None,
        }
    }
}

struct Entry {
    name: &'static str,
    id: u32,
    ty: ParamType,
}

/// Static registry mapping parameter name to `(id, type)`. The closed set
/// of names and their insertion order are fixed at build time: the
/// table is an explicit `const` array, not a lazily-built structure
/// whose order could depend on initialization timing.
pub struct ParamSchema {
    entries: &'static [Entry],
}

use ParamType::*;

static ENTRIES: &[Entry] = &[
    Entry { name: "camera-mode", id: 0, ty: Uint32 },
    Entry { name: "brightness", id: 1, ty: Uint32 },
    Entry { name: "contrast", id: 2, ty: Uint32 },
    Entry { name: "saturation", id: 3, ty: Uint32 },
    Entry { name: "hue", id: 4, ty: Int32 },
    Entry { name: "wb-mode", id: 5, ty: Uint32 },
    Entry { name: "gamma", id: 6, ty: Uint32 },
    Entry { name: "gain", id: 7, ty: Uint32 },
    Entry { name: "power-mode", id: 8, ty: Uint32 },
    Entry { name: "wb-temp", id: 9, ty: Uint32 },
    Entry { name: "sharpness", id: 10, ty: Uint32 },
    Entry { name: "backlight", id: 11, ty: Uint32 },
    Entry { name: "exp-mode", id: 12, ty: Uint32 },
    Entry { name: "exp-absolute", id: 13, ty: Int32 },
    Entry { name: "image-size", id: 14, ty: Uint32 },
    Entry { name: "image-format", id: 15, ty: Uint32 },
    Entry { name: "pixel-format", id: 16, ty: Uint32 },
    Entry { name: "scene-mode", id: 17, ty: Uint32 },
    Entry { name: "video-size", id: 18, ty: Uint32 },
    Entry { name: "video-format", id: 19, ty: Uint32 },
    Entry { name: "video-snapshot", id: 20, ty: Uint8 },
];

impl ParamSchema {
    /// The fixed, build-time schema shared by every camera device.
    pub fn standard() -> Self {
        Self { entries: ENTRIES }
    }

    pub fn lookup(&self, name: &str) -> Option<(u32, ParamType)> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| (e.id, e.ty))
    }

    pub fn lookup_by_id(&self, id: u32) -> Option<&'static str> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.name)
    }

    /// Entries in insertion order, stable across runs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32, ParamType)> + '_ {
        self.entries.iter().map(|e| (e.name, e.id, e.ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijection() {
        let schema = ParamSchema::standard();
        for (name, id, _ty) in schema.iter() {
            let (looked_id, _) = schema.lookup(name).unwrap();
            assert_eq!(looked_id, id);
            assert_eq!(schema.lookup_by_id(id), Some(name));
        }
    }

    #[test]
    fn unknown_name_and_id() {
        let schema = ParamSchema::standard();
        assert!(schema.lookup("not-a-param").is_none());
        assert!(schema.lookup_by_id(9999).is_none());
    }

    #[test]
    fn iteration_order_is_insertion_order() {
        let schema = ParamSchema::standard();
        let names: Vec<_> = schema.iter().map(|(n, _, _)| n).collect();
        assert_eq!(names.first(), Some(&"camera-mode"));
        assert_eq!(names.last(), Some(&"video-snapshot"));
    }

    #[test]
    fn wire_value_round_trips() {
        for ty in [ParamType::Uint8, ParamType::Int32, ParamType::Uint32, ParamType::Real32] {
            assert_eq!(ParamType::from_wire_value(ty.wire_value()), Some(ty));
        }
    }

    #[test]
    fn unknown_wire_value_is_none() {
        assert!(ParamType::from_wire_value(0).is_none());
        assert!(ParamType::from_wire_value(255).is_none());
    }
}
