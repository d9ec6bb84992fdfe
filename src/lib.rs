#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod commands;
pub mod constants;
mod driver;
mod error;
mod frame;
pub mod gpio;
pub mod settings;
pub mod status;
mod transport;

pub use commands::{Command, Memory, NvramParam};
pub use driver::MCP2210;
pub use error::{DeviceError, Error};
pub use frame::Frame;
pub use transport::{HidTransport, StdDelay};
