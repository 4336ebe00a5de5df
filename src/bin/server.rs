//! Process entry point: no argument-parsing framework, just an
//! optional config path.
//!
//! Usage: mav-camera-server [config.toml]

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mav_camera_server::config::MavlinkConfig;
use mav_camera_server::device::sim::SimPlugin;
#[cfg(feature = "v4l2")]
use mav_camera_server::device::v4l2::V4l2Plugin;
use mav_camera_server::device::CameraDevice;
use mav_camera_server::mainloop::StdMainLoop;
use mav_camera_server::Server;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> mav_camera_server::CoreResult<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_default();
    let config = MavlinkConfig::load(&config_path)?;

    let mainloop = StdMainLoop::new();
    let mut server = Server::new(config, mainloop);

    for uri in discover_devices() {
        match open_device(&uri) {
            Some(device) => match server.registry_mut().add(device) {
                Ok(comp_id) => log::info!("registered {uri} as component {comp_id}"),
                Err(e) => log::warn!("could not register {uri}: {e}"),
            },
            None => log::warn!("discovery listed {uri} but it failed to open"),
        }
    }

    server.start()?;
    log::info!("mav-camera-server listening");

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = running.clone();
    ctrlc::set_handler(move || running_handler.store(false, Ordering::SeqCst))
        .expect("failed to install SIGINT handler");

    while running.load(Ordering::SeqCst) {
        server.run_once()?;
    }

    log::info!("shutting down");
    server.stop();
    // Let a heartbeat in flight land before the socket drops.
    std::thread::sleep(Duration::from_millis(10));
    Ok(())
}

/// Non-fatal discovery across every compiled-in plugin: a plugin that
/// fails to enumerate devices is logged and skipped, not fatal.
fn discover_devices() -> Vec<String> {
    let mut uris = SimPlugin::list_devices();
    #[cfg(feature = "v4l2")]
    uris.extend(V4l2Plugin::list_devices());
    uris
}

fn open_device(uri: &str) -> Option<Box<dyn CameraDevice>> {
    #[cfg(feature = "v4l2")]
    if let Some(dev) = V4l2Plugin::create_device(uri) {
        return Some(Box::new(dev));
    }
    SimPlugin::create_device(uri).map(|d| Box::new(d) as Box<dyn CameraDevice>)
}
