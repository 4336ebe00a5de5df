//! Parameter Store (C2): per-camera current-value map plus per-key
//! supported-value sets.

use std::collections::HashMap;

use crate::error::{ParamError, ParamResult};
use crate::param::schema::{ParamSchema, ParamType};

const VALUE_WIDTH: usize = 128;

/// Opaque 128-byte parameter value carrier. Only the
/// leading bytes are meaningful; how many depends on the schema's
/// `ParamType` for the name this value is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamValue(pub [u8; VALUE_WIDTH]);

impl ParamValue {
    pub fn from_bytes(bytes: [u8; VALUE_WIDTH]) -> Self {
        Self(bytes)
    }

    pub fn from_u8(v: u8) -> Self {
        let mut buf = [0u8; VALUE_WIDTH];
        buf[0] = v;
        Self(buf)
    }

    pub fn from_u32(v: u32) -> Self {
        let mut buf = [0u8; VALUE_WIDTH];
        buf[..4].copy_from_slice(&v.to_le_bytes());
        Self(buf)
    }

    pub fn from_i32(v: i32) -> Self {
        let mut buf = [0u8; VALUE_WIDTH];
        buf[..4].copy_from_slice(&v.to_le_bytes());
        Self(buf)
    }

    pub fn from_f32(v: f32) -> Self {
        let mut buf = [0u8; VALUE_WIDTH];
        buf[..4].copy_from_slice(&v.to_le_bytes());
        Self(buf)
    }

    pub fn as_u8(&self) -> u8 {
        self.0[0]
    }

    pub fn as_u32(&self) -> u32 {
        u32::from_le_bytes(self.0[..4].try_into().unwrap())
    }

    pub fn as_i32(&self) -> i32 {
        i32::from_le_bytes(self.0[..4].try_into().unwrap())
    }

    pub fn as_f32(&self) -> f32 {
        f32::from_le_bytes(self.0[..4].try_into().unwrap())
    }

    /// Compare only the bytes the declared type actually uses, since the
    /// remainder of the 128-byte buffer is padding: comparison and
    /// assignment operate on the scalar type, never the whole buffer.
    pub fn scalar_eq(&self, other: &ParamValue, ty: ParamType) -> bool {
        let width = ty.byte_width();
        self.0[..width] == other.0[..width]
    }
}

/// Per-camera current-value map plus per-key supported-value sets.
/// Iteration order for [`ParamStore::list_current`] is the schema's
/// insertion order, not store insertion order.
pub struct ParamStore {
    current: HashMap<String, (ParamValue, ParamType)>,
    supported: HashMap<String, Vec<ParamValue>>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self {
            current: HashMap::new(),
            supported: HashMap::new(),
        }
    }

    pub fn set_current(
        &mut self,
        schema: &ParamSchema,
        name: &str,
        value: ParamValue,
        declared_type: ParamType,
    ) -> ParamResult<()> {
        let (_, schema_type) = schema
            .lookup(name)
            .ok_or_else(|| ParamError::UnknownParam(name.to_string()))?;
        if declared_type != schema_type {
            return Err(ParamError::BadType(name.to_string()));
        }
        if let Some(allowed) = self.supported.get(name) {
            if !allowed.is_empty() && !allowed.iter().any(|v| v.scalar_eq(&value, schema_type)) {
                return Err(ParamError::Unsupported(name.to_string()));
            }
        }
        self.current.insert(name.to_string(), (value, schema_type));
        Ok(())
    }

    pub fn get_current(&self, schema: &ParamSchema, name: &str) -> ParamResult<ParamValue> {
        if schema.lookup(name).is_none() {
            return Err(ParamError::UnknownParam(name.to_string()));
        }
        self.current
            .get(name)
            .map(|(v, _)| *v)
            .ok_or_else(|| ParamError::Missing(name.to_string()))
    }

    pub fn set_supported(&mut self, name: &str, value: ParamValue) {
        self.supported.entry(name.to_string()).or_default().push(value);
    }

    /// Ordered `(name, value)` pairs for every currently-set parameter, in
    /// the schema's insertion order.
    pub fn list_current(&self, schema: &ParamSchema) -> Vec<(&'static str, ParamValue)> {
        schema
            .iter()
            .filter_map(|(name, _, _)| self.current.get(name).map(|(v, _)| (name, *v)))
            .collect()
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}
