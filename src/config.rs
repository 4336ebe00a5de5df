//! `[mavlink]` configuration section: defaults, parsing, and the
//! out-of-range-falls-back-to-default validation the server applies to
//! `system_id`/`component_id`.

use serde::Deserialize;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::registry::MAV_COMP_ID_CAMERA;

const DEFAULT_PORT: u16 = 14550;
const DEFAULT_SYSTEM_ID: u8 = 1;
const DEFAULT_BROADCAST_ADDR: &str = "255.255.255.255";

#[derive(Debug, Deserialize, Default)]
struct RawConfigFile {
    mavlink: Option<RawMavlinkConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct RawMavlinkConfig {
    port: Option<u16>,
    system_id: Option<u8>,
    component_id: Option<u8>,
    rtsp_server_addr: Option<String>,
    broadcast_addr: Option<String>,
}

/// Validated `[mavlink]` settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MavlinkConfig {
    pub port: u16,
    pub system_id: u8,
    pub component_id: u8,
    pub rtsp_server_addr: Option<String>,
    pub broadcast_addr: String,
}

impl Default for MavlinkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            system_id: DEFAULT_SYSTEM_ID,
            component_id: MAV_COMP_ID_CAMERA,
            rtsp_server_addr: None,
            broadcast_addr: DEFAULT_BROADCAST_ADDR.to_string(),
        }
    }
}

impl MavlinkConfig {
    /// Load from a TOML file on disk. A missing `[mavlink]` table, or a
    /// missing file entirely at an empty path, yields all defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if path.as_os_str().is_empty() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse from TOML source text, applying the same validation `load`
    /// does. Exposed separately so tests don't need a temp file.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let raw: RawConfigFile =
            toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))?;
        let mav = raw.mavlink.unwrap_or_default();
        let defaults = Self::default();

        let system_id = mav
            .system_id
            .filter(|&id| id > 1 && id < 255)
            .unwrap_or_else(|| {
                if let Some(bad) = mav.system_id {
                    log::warn!("system_id {bad} out of range (1, 255), using default");
                }
                defaults.system_id
            });

        let component_id = mav
            .component_id
            .filter(|&id| id > 1 && id < 255)
            .unwrap_or_else(|| {
                if let Some(bad) = mav.component_id {
                    log::warn!("component_id {bad} out of range (1, 255), using default");
                }
                defaults.component_id
            });

        Ok(Self {
            port: mav.port.unwrap_or(defaults.port),
            system_id,
            component_id,
            rtsp_server_addr: mav.rtsp_server_addr,
            broadcast_addr: mav.broadcast_addr.unwrap_or(defaults.broadcast_addr),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_on_empty_section() {
        let cfg = MavlinkConfig::parse("").unwrap();
        assert_eq!(cfg, MavlinkConfig::default());
    }

    #[test]
    fn reads_all_fields() {
        let cfg = MavlinkConfig::parse(
            r#"
            [mavlink]
            port = 15000
            system_id = 5
            component_id = 101
            rtsp_server_addr = "192.168.1.10"
            broadcast_addr = "192.168.1.255"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port, 15000);
        assert_eq!(cfg.system_id, 5);
        assert_eq!(cfg.component_id, 101);
        assert_eq!(cfg.rtsp_server_addr.as_deref(), Some("192.168.1.10"));
        assert_eq!(cfg.broadcast_addr, "192.168.1.255");
    }

    #[test]
    fn out_of_range_ids_fall_back_to_default() {
        let cfg = MavlinkConfig::parse(
            r#"
            [mavlink]
            system_id = 255
            component_id = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.system_id, DEFAULT_SYSTEM_ID);
        assert_eq!(cfg.component_id, MAV_COMP_ID_CAMERA);
    }
}
