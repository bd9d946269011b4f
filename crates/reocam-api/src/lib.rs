// reocam-api: Async Rust client for the Reolink camera/NVR HTTP command API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod request;
pub mod transport;

pub use client::DeviceClient;
pub use error::Error;
pub use models::{CommandResponse, DeviceErrorBody, Token};
pub use request::CommandRequest;
pub use transport::{TlsMode, TransportConfig};
