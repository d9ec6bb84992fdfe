//! GP pin numbering, GPIO levels and directions.

mod common;
mod values;

pub use common::{GpPin, GpioDirection, LogicLevel, PinMask};
pub use values::{GpioChanges, GpioState};
