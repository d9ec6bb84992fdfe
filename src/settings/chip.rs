use bit_field::BitField;
use log::debug;

use crate::Error;
use crate::constants::PASSWORD_LEN;
use crate::frame::Frame;
use crate::gpio::{GpPin, GpioDirection, LogicLevel, PinMask};
use crate::settings::Password;

const PIN_FUNCTIONS: usize = 4;
const DEFAULT_OUTPUT: usize = 13;
const DEFAULT_DIRECTION: usize = 15;
const OTHER_SETTINGS: usize = 17;
const ACCESS_CONTROL: usize = 18;
const PASSWORD: usize = 19;

/// # Chip settings fields
///
/// Use with the Get/Set Chip Settings commands and the chip settings NVRAM
/// sub-command, which share one layout.
impl Frame {
    /// Raw function code of `pin`: 0 GPIO, 1 chip select, 2 dedicated function.
    pub fn chip_pin_function(&self, pin: GpPin) -> u8 {
        self.as_bytes()[PIN_FUNCTIONS + pin.number() as usize]
    }

    /// Change the raw function code of `pin`.
    pub fn set_chip_pin_function(&mut self, pin: GpPin, function: u8) {
        self.as_bytes_mut()[PIN_FUNCTIONS + pin.number() as usize] = function;
    }

    /// Power-up output level of `pin`.
    pub fn chip_default_output(&self, pin: GpPin) -> bool {
        self.pin_bit(DEFAULT_OUTPUT, pin)
    }

    /// Change the power-up output level of `pin`.
    pub fn set_chip_default_output(&mut self, pin: GpPin, value: bool) {
        self.set_pin_bit(DEFAULT_OUTPUT, pin, value);
    }

    /// Power-up direction bit of `pin`, set for input.
    pub fn chip_default_direction(&self, pin: GpPin) -> bool {
        self.pin_bit(DEFAULT_DIRECTION, pin)
    }

    /// Change the power-up direction bit of `pin`.
    pub fn set_chip_default_direction(&mut self, pin: GpPin, value: bool) {
        self.set_pin_bit(DEFAULT_DIRECTION, pin, value);
    }

    /// Whether USB remote wake-up is enabled.
    pub fn chip_remote_wakeup(&self) -> bool {
        self.as_bytes()[OTHER_SETTINGS].get_bit(4)
    }

    /// Enable or disable USB remote wake-up.
    pub fn set_chip_remote_wakeup(&mut self, enabled: bool) {
        self.as_bytes_mut()[OTHER_SETTINGS].set_bit(4, enabled);
    }

    /// Raw GP6 interrupt counter mode, bits 1 to 3 of the other-settings byte.
    pub fn chip_gp6_mode(&self) -> u8 {
        self.as_bytes()[OTHER_SETTINGS].get_bits(1..=3)
    }

    /// Change the raw GP6 interrupt counter mode. Only the low three bits are used.
    pub fn set_chip_gp6_mode(&mut self, mode: u8) {
        self.as_bytes_mut()[OTHER_SETTINGS].set_bits(1..=3, mode & 0b111);
    }

    /// Whether the MCP2210 keeps the SPI bus between transfers.
    pub fn chip_no_spi_release(&self) -> bool {
        self.as_bytes()[OTHER_SETTINGS].get_bit(0)
    }

    /// Change whether the MCP2210 keeps the SPI bus between transfers.
    pub fn set_chip_no_spi_release(&mut self, value: bool) {
        self.as_bytes_mut()[OTHER_SETTINGS].set_bit(0, value);
    }

    /// Raw access control level.
    pub fn chip_access_control(&self) -> u8 {
        self.as_bytes()[ACCESS_CONTROL]
    }

    /// Change the raw access control level.
    pub fn set_chip_access_control(&mut self, level: u8) {
        self.as_bytes_mut()[ACCESS_CONTROL] = level;
    }

    /// The new password field of a Set Chip Settings request.
    pub fn chip_password(&self) -> [u8; PASSWORD_LEN] {
        let mut password = [0u8; PASSWORD_LEN];
        password.copy_from_slice(&self.as_bytes()[PASSWORD..PASSWORD + PASSWORD_LEN]);
        password
    }

    /// Write exactly 8 password bytes.
    pub fn set_chip_password(&mut self, password: &[u8; PASSWORD_LEN]) {
        self.as_bytes_mut()[PASSWORD..PASSWORD + PASSWORD_LEN].copy_from_slice(password);
    }
}

/// Function assigned to a GP pin.
///
/// The dedicated function differs per pin, see [`GpPin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinFunction {
    /// General purpose input or output.
    Gpio,
    /// SPI chip select.
    ChipSelect,
    /// The pin's dedicated function.
    Dedicated,
}

impl TryFrom<u8> for PinFunction {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Gpio),
            0x01 => Ok(Self::ChipSelect),
            0x02 => Ok(Self::Dedicated),
            value => Err(Error::InvalidSettingValue {
                setting: "pin function",
                value,
            }),
        }
    }
}

impl From<PinFunction> for u8 {
    fn from(value: PinFunction) -> Self {
        match value {
            PinFunction::Gpio => 0x00,
            PinFunction::ChipSelect => 0x01,
            PinFunction::Dedicated => 0x02,
        }
    }
}

/// What the GP6 interrupt counter counts when GP6 is set to its dedicated function.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Gp6CounterMode {
    /// Counting disabled.
    #[default]
    None,
    /// Count falling edges.
    FallingEdges,
    /// Count rising edges.
    RisingEdges,
    /// Count low pulses.
    LowPulses,
    /// Count high pulses.
    HighPulses,
}

impl TryFrom<u8> for Gp6CounterMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b000 => Ok(Self::None),
            0b001 => Ok(Self::FallingEdges),
            0b010 => Ok(Self::RisingEdges),
            0b011 => Ok(Self::LowPulses),
            0b100 => Ok(Self::HighPulses),
            value => Err(Error::InvalidSettingValue {
                setting: "GP6 counter mode",
                value,
            }),
        }
    }
}

impl From<Gp6CounterMode> for u8 {
    fn from(value: Gp6CounterMode) -> Self {
        match value {
            Gp6CounterMode::None => 0b000,
            Gp6CounterMode::FallingEdges => 0b001,
            Gp6CounterMode::RisingEdges => 0b010,
            Gp6CounterMode::LowPulses => 0b011,
            Gp6CounterMode::HighPulses => 0b100,
        }
    }
}

/// Protection of the NVRAM chip settings.
///
/// ## Datasheet
///
/// See section 1.5.1 (Chip Settings Protection).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AccessControl {
    /// Settings can be changed freely.
    #[default]
    None,
    /// Settings can be changed after sending the password.
    Password,
    /// Settings are permanently locked.
    ///
    /// <div class="warning">
    ///
    /// This cannot be undone.
    ///
    /// </div>
    Locked,
}

impl TryFrom<u8> for AccessControl {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::None),
            0x40 => Ok(Self::Password),
            0x80 => Ok(Self::Locked),
            value => Err(Error::InvalidSettingValue {
                setting: "access control",
                value,
            }),
        }
    }
}

impl From<AccessControl> for u8 {
    fn from(value: AccessControl) -> Self {
        match value {
            AccessControl::None => 0x00,
            AccessControl::Password => 0x40,
            AccessControl::Locked => 0x80,
        }
    }
}

/// GP pin functions, power-up GPIO state and miscellaneous chip settings.
///
/// The password is write-only and so does not appear here.
///
/// ## Datasheet
///
/// See section 3.2.3 (Set Chip Settings) and section 3.2.4 (Get Chip Settings), table
/// 3-32 and table 3-34.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSettings {
    /// Function of each pin, GP0 first.
    pub pin_functions: [PinFunction; 9],
    /// Power-up output levels. Set bits are high.
    pub default_output: PinMask,
    /// Power-up directions. Set bits are inputs.
    pub default_direction: PinMask,
    /// USB remote wake-up.
    pub remote_wakeup: bool,
    /// GP6 interrupt counter mode.
    pub gp6_counter_mode: Gp6CounterMode,
    /// Keep the SPI bus between transfers rather than releasing it.
    pub no_spi_release: bool,
    /// NVRAM chip settings protection.
    pub access_control: AccessControl,
}

impl ChipSettings {
    /// Function of `pin`.
    pub fn pin_function(&self, pin: GpPin) -> PinFunction {
        self.pin_functions[pin.number() as usize]
    }

    /// Power-up level of `pin`.
    pub fn default_level(&self, pin: GpPin) -> LogicLevel {
        self.default_output.is_set(pin).into()
    }

    /// Power-up direction of `pin`.
    pub fn default_direction(&self, pin: GpPin) -> GpioDirection {
        self.default_direction.is_set(pin).into()
    }

    pub(crate) fn from_frame(frame: &Frame) -> Result<Self, Error> {
        let mut pin_functions = [PinFunction::Gpio; 9];
        for (function, pin) in pin_functions.iter_mut().zip(GpPin::ALL) {
            *function = frame.chip_pin_function(pin).try_into()?;
        }
        Ok(Self {
            pin_functions,
            default_output: frame.pin_mask(DEFAULT_OUTPUT),
            default_direction: frame.pin_mask(DEFAULT_DIRECTION),
            remote_wakeup: frame.chip_remote_wakeup(),
            gp6_counter_mode: frame.chip_gp6_mode().try_into()?,
            no_spi_release: frame.chip_no_spi_release(),
            access_control: frame.chip_access_control().try_into()?,
        })
    }

    pub(crate) fn apply_to_frame(&self, frame: &mut Frame) {
        for (function, pin) in self.pin_functions.iter().zip(GpPin::ALL) {
            frame.set_chip_pin_function(pin, (*function).into());
        }
        frame.set_pin_mask(DEFAULT_OUTPUT, self.default_output);
        frame.set_pin_mask(DEFAULT_DIRECTION, self.default_direction);
        frame.set_chip_remote_wakeup(self.remote_wakeup);
        frame.set_chip_gp6_mode(self.gp6_counter_mode.into());
        frame.set_chip_no_spi_release(self.no_spi_release);
        frame.set_chip_access_control(self.access_control.into());
    }
}

/// Changes to be applied to the chip settings.
///
/// Settings that are not changed keep their current value.
///
/// Changing the NVRAM settings of a password-protected chip requires sending the
/// password first with [`MCP2210::send_password`].
///
/// [`MCP2210::send_password`]: crate::MCP2210::send_password
#[derive(Debug, Default, Clone, Copy)]
pub struct ChipSettingsChanges {
    pin_functions: [Option<PinFunction>; 9],
    default_levels: [Option<LogicLevel>; 9],
    default_directions: [Option<GpioDirection>; 9],
    remote_wakeup: Option<bool>,
    gp6_counter_mode: Option<Gp6CounterMode>,
    no_spi_release: Option<bool>,
    access_control: Option<AccessControl>,
    new_password: Option<Password>,
}

impl ChipSettingsChanges {
    /// Create an empty set of changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the function of `pin`.
    pub fn with_pin_function(&mut self, pin: GpPin, function: PinFunction) -> &mut Self {
        self.pin_functions[pin.number() as usize] = Some(function);
        self
    }

    /// Change the power-up output level of `pin`.
    pub fn with_default_level(&mut self, pin: GpPin, level: LogicLevel) -> &mut Self {
        self.default_levels[pin.number() as usize] = Some(level);
        self
    }

    /// Change the power-up direction of `pin`.
    pub fn with_default_direction(&mut self, pin: GpPin, direction: GpioDirection) -> &mut Self {
        self.default_directions[pin.number() as usize] = Some(direction);
        self
    }

    /// Enable or disable USB remote wake-up.
    pub fn with_remote_wakeup(&mut self, enabled: bool) -> &mut Self {
        self.remote_wakeup = Some(enabled);
        self
    }

    /// Change the GP6 interrupt counter mode.
    pub fn with_gp6_counter_mode(&mut self, mode: Gp6CounterMode) -> &mut Self {
        self.gp6_counter_mode = Some(mode);
        self
    }

    /// Keep (true) or release (false) the SPI bus between transfers.
    pub fn with_no_spi_release(&mut self, value: bool) -> &mut Self {
        self.no_spi_release = Some(value);
        self
    }

    /// Change the settings protection level.
    ///
    /// Protection only applies to the NVRAM settings. When moving to
    /// [`AccessControl::Password`], set the password as well with
    /// [`with_new_password`](Self::with_new_password).
    pub fn with_access_control(&mut self, level: AccessControl) -> &mut Self {
        self.access_control = Some(level);
        self
    }

    /// Set the password written alongside the settings.
    pub fn with_new_password(&mut self, password: Password) -> &mut Self {
        self.new_password = Some(password);
        self
    }

    /// Write the requested changes into a previously read settings frame.
    pub(crate) fn apply_to_frame(&self, frame: &mut Frame) {
        debug!("applying chip settings changes {self:?}");
        for pin in GpPin::ALL {
            let n = pin.number() as usize;
            if let Some(function) = self.pin_functions[n] {
                frame.set_chip_pin_function(pin, function.into());
            }
            if let Some(level) = self.default_levels[n] {
                frame.set_chip_default_output(pin, level.into());
            }
            if let Some(direction) = self.default_directions[n] {
                frame.set_chip_default_direction(pin, direction.into());
            }
        }
        if let Some(enabled) = self.remote_wakeup {
            frame.set_chip_remote_wakeup(enabled);
        }
        if let Some(mode) = self.gp6_counter_mode {
            frame.set_chip_gp6_mode(mode.into());
        }
        if let Some(value) = self.no_spi_release {
            frame.set_chip_no_spi_release(value);
        }
        if let Some(level) = self.access_control {
            frame.set_chip_access_control(level.into());
        }
        if let Some(password) = self.new_password {
            frame.set_chip_password(password.as_bytes());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Chip settings as shipped: every pin a chip select except GP6-GP8.
    fn factory_frame() -> Frame {
        let mut bytes = [0u8; 64];
        bytes[0] = 0x20;
        bytes[4..13].copy_from_slice(&[1, 1, 1, 1, 1, 1, 2, 0, 0]);
        bytes[13..15].copy_from_slice(&[0xFF, 0x01]);
        bytes[15..17].copy_from_slice(&[0xFF, 0x01]);
        bytes[17] = 0b0001_0010;
        Frame::from_bytes(bytes)
    }

    #[test]
    fn decode_factory_settings() {
        let settings = ChipSettings::from_frame(&factory_frame()).unwrap();
        assert_eq!(settings.pin_function(GpPin::Gp0), PinFunction::ChipSelect);
        assert_eq!(settings.pin_function(GpPin::Gp6), PinFunction::Dedicated);
        assert_eq!(settings.pin_function(GpPin::Gp8), PinFunction::Gpio);
        assert_eq!(settings.default_level(GpPin::Gp8), LogicLevel::High);
        assert_eq!(settings.default_direction(GpPin::Gp3), GpioDirection::Input);
        assert!(settings.remote_wakeup);
        assert_eq!(settings.gp6_counter_mode, Gp6CounterMode::FallingEdges);
        assert!(!settings.no_spi_release);
        assert_eq!(settings.access_control, AccessControl::None);
    }

    #[test]
    fn settings_reencode_identically() {
        let frame = factory_frame();
        let settings = ChipSettings::from_frame(&frame).unwrap();
        let mut out = Frame::new();
        out.as_bytes_mut()[0] = 0x20;
        settings.apply_to_frame(&mut out);
        assert_eq!(out, frame);
    }

    #[test]
    fn other_settings_bits_are_independent() {
        let mut frame = Frame::new();
        frame.set_chip_gp6_mode(0b111);
        assert_eq!(frame.as_bytes()[17], 0b0000_1110);
        frame.set_chip_no_spi_release(true);
        frame.set_chip_remote_wakeup(true);
        assert_eq!(frame.as_bytes()[17], 0b0001_1111);
        frame.set_chip_gp6_mode(0);
        assert_eq!(frame.as_bytes()[17], 0b0001_0001);
        assert!(frame.chip_remote_wakeup());
        assert!(frame.chip_no_spi_release());
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut frame = factory_frame();
        frame.set_chip_access_control(0x41);
        assert!(matches!(
            ChipSettings::from_frame(&frame),
            Err(Error::InvalidSettingValue {
                setting: "access control",
                value: 0x41
            })
        ));
        let mut frame = factory_frame();
        frame.set_chip_pin_function(GpPin::Gp2, 3);
        assert!(ChipSettings::from_frame(&frame).is_err());
    }

    #[test]
    fn changes_with_password() {
        let mut frame = factory_frame();
        let mut changes = ChipSettingsChanges::new();
        changes
            .with_pin_function(GpPin::Gp7, PinFunction::Dedicated)
            .with_default_level(GpPin::Gp0, LogicLevel::Low)
            .with_access_control(AccessControl::Password)
            .with_new_password("secret".parse().unwrap());
        changes.apply_to_frame(&mut frame);

        assert_eq!(frame.chip_pin_function(GpPin::Gp7), 2);
        assert_eq!(&frame.as_bytes()[13..15], &[0xFE, 0x01]);
        assert_eq!(frame.chip_access_control(), 0x40);
        assert_eq!(&frame.chip_password(), b"secret\0\0");
        assert_eq!(&frame.as_bytes()[19..27], b"secret\0\0");
        // Untouched.
        assert_eq!(frame.chip_gp6_mode(), 1);
    }
}
