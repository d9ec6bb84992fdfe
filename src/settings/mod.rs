//! Typed views of the MCP2210 configuration.
//!
//! The MCP2210 holds two copies of its SPI and chip settings: the runtime copy, which
//! takes effect immediately, and the NVRAM copy loaded at power-up. Select between
//! them with [`Memory`](crate::Memory). The USB key parameters and descriptor strings
//! exist only in NVRAM and take effect at the next enumeration.
//!
//! Each group of settings has a plain struct returned when reading from the device
//! and a `*Changes` builder used to modify it. Changes are applied by reading the
//! current settings, altering only the requested fields, and writing the result back.
//!
//! The byte-level accessors these types are built on are methods of
//! [`Frame`](crate::Frame), for use with [`MCP2210::exchange`](crate::MCP2210::exchange).

mod chip;
mod common;
mod spi;
mod usb;

pub use chip::{AccessControl, ChipSettings, ChipSettingsChanges, Gp6CounterMode, PinFunction};
pub use common::{DeviceString, Password, SpiDelay};
pub use spi::{SpiSettings, SpiSettingsChanges};
pub use usb::{UsbKeyLayout, UsbKeySettings, UsbKeySettingsChanges, UsbKeyView, UsbKeyViewMut};
