use embedded_hal::delay::DelayNs;
use log::debug;

use super::MCP2210;
use crate::commands::Command;
use crate::error::Error;
use crate::frame::Frame;
use crate::gpio::{GpioChanges, GpioState};
use crate::transport::HidTransport;

impl<D: HidTransport, T: DelayNs> MCP2210<D, T> {
    ////////////////////////////////////////////////////////////////////////////////
    // GPIO
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the level and direction of every GP pin.
    ///
    /// Pins assigned to chip select or a dedicated function still report a level.
    ///
    /// # Datasheet
    ///
    /// See sections 3.2.6 (Get GPIO Current Pin Value) and 3.2.8 (Get GPIO Current
    /// Pin Direction).
    pub fn gpio_read(&mut self) -> Result<GpioState, Error> {
        let mut frame = Frame::new();
        self.exchange(&mut frame, Command::GpioValueGet)?;
        let levels = frame.gpio_pins();

        frame.clear();
        self.exchange(&mut frame, Command::GpioDirectionGet)?;
        let directions = frame.gpio_pins();

        Ok(GpioState { levels, directions })
    }

    /// Change GPIO pin levels and directions.
    ///
    /// Levels are written before directions, so a pin switched to output starts at the
    /// requested level. Only the reports with requested changes are read and written.
    ///
    /// Only pins assigned to GPIO in the chip settings are affected by the changes.
    ///
    /// # Datasheet
    ///
    /// See sections 3.2.7 (Set GPIO Current Pin Value) and 3.2.9 (Set GPIO Current
    /// Pin Direction).
    pub fn gpio_write(&mut self, changes: &GpioChanges) -> Result<(), Error> {
        debug!("applying GPIO changes {changes:?}");
        if changes.changes_levels() {
            let mut frame = Frame::new();
            self.exchange(&mut frame, Command::GpioValueGet)?;
            changes.apply_levels(&mut frame);
            frame.as_bytes_mut()[1..4].fill(0);
            self.exchange(&mut frame, Command::GpioValueSet)?;
        }
        if changes.changes_directions() {
            let mut frame = Frame::new();
            self.exchange(&mut frame, Command::GpioDirectionGet)?;
            changes.apply_directions(&mut frame);
            frame.as_bytes_mut()[1..4].fill(0);
            self.exchange(&mut frame, Command::GpioDirectionSet)?;
        }
        Ok(())
    }
}
