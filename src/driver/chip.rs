use embedded_hal::delay::DelayNs;

use super::MCP2210;
use crate::commands::{Command, Memory, NvramParam};
use crate::error::Error;
use crate::frame::Frame;
use crate::settings::{ChipSettings, ChipSettingsChanges, Password};
use crate::transport::HidTransport;

impl<D: HidTransport, T: DelayNs> MCP2210<D, T> {
    ////////////////////////////////////////////////////////////////////////////////
    // Chip settings
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the chip settings: pin functions, power-up GPIO state and access control.
    ///
    /// # Datasheet
    ///
    /// See section 3.2.4 (Get Chip Settings) and section 3.1.4 (Get NVRAM Chip
    /// Settings).
    pub fn read_chip_settings(&mut self, memory: Memory) -> Result<ChipSettings, Error> {
        let frame = self.read_settings_frame(memory, Command::ChipGet, NvramParam::ChipSettings)?;
        ChipSettings::from_frame(&frame)
    }

    /// Change the chip settings.
    ///
    /// The current settings are read first, so fields without a requested change
    /// keep their value.
    ///
    /// <div class="warning">
    ///
    /// The password bytes are written along with the settings. When the access
    /// control level is (or becomes) [`AccessControl::Password`] and no new password
    /// is given, the password written is whatever the read returned in those bytes.
    ///
    /// </div>
    ///
    /// [`AccessControl::Password`]: crate::settings::AccessControl::Password
    ///
    /// # Datasheet
    ///
    /// See section 3.2.3 (Set Chip Settings) and section 3.1.3 (Set NVRAM Chip
    /// Settings).
    pub fn change_chip_settings(
        &mut self,
        memory: Memory,
        changes: &ChipSettingsChanges,
    ) -> Result<(), Error> {
        let mut frame =
            self.read_settings_frame(memory, Command::ChipGet, NvramParam::ChipSettings)?;
        changes.apply_to_frame(&mut frame);
        self.write_settings_frame(&mut frame, memory, Command::ChipSet, NvramParam::ChipSettings)
    }

    /// Replace every chip setting, along with the access password.
    ///
    /// Unlike [`MCP2210::change_chip_settings`] this does not read the settings first.
    /// `password` only takes effect when `settings.access_control` is
    /// [`AccessControl::Password`].
    ///
    /// [`AccessControl::Password`]: crate::settings::AccessControl::Password
    pub fn write_chip_settings(
        &mut self,
        memory: Memory,
        settings: &ChipSettings,
        password: &Password,
    ) -> Result<(), Error> {
        let mut frame = Frame::new();
        settings.apply_to_frame(&mut frame);
        frame.set_chip_password(password.as_bytes());
        self.write_settings_frame(&mut frame, memory, Command::ChipSet, NvramParam::ChipSettings)
    }
}
