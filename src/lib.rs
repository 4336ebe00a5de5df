pub mod codec;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod handlers;
pub mod heartbeat;
pub mod mainloop;
pub mod message;
pub mod param;
pub mod registry;
pub mod rtsp;
pub mod server;

pub use config::MavlinkConfig;
pub use error::{CoreError, CoreResult, ParamError, ParamResult, RegistryError};
pub use frame::{FrameParser, RawFrame};
pub use message::{Command, Message};
pub use registry::ComponentRegistry;
pub use server::Server;
