//! SPI transfer settings.

use embedded_hal::spi::{MODE_0, MODE_1, MODE_2, MODE_3, Mode};
use log::debug;

use crate::Error;
use crate::constants::{MAX_BIT_RATE, MIN_BIT_RATE};
use crate::frame::Frame;
use crate::gpio::{GpPin, PinMask};
use crate::settings::SpiDelay;

const BIT_RATE: usize = 4;
const IDLE_CS: usize = 8;
const ACTIVE_CS: usize = 10;
const CS_TO_DATA_DELAY: usize = 12;
const DATA_TO_CS_DELAY: usize = 14;
const BYTE_DELAY: usize = 16;
const TRANSACTION_SIZE: usize = 18;
const MODE: usize = 20;

/// # SPI settings fields
///
/// Use with the Get/Set SPI Transfer Settings commands and the SPI NVRAM sub-command,
/// which share one layout.
impl Frame {
    /// SPI bit rate in bits per second.
    pub fn spi_bit_rate(&self) -> u32 {
        self.u32_at(BIT_RATE)
    }

    /// Change the SPI bit rate.
    pub fn set_spi_bit_rate(&mut self, bit_rate: u32) {
        self.set_u32_at(BIT_RATE, bit_rate);
    }

    /// Chip-select level of `pin` while no transaction is running.
    pub fn spi_idle_cs(&self, pin: GpPin) -> bool {
        self.pin_bit(IDLE_CS, pin)
    }

    /// Change the idle chip-select level of `pin`.
    pub fn set_spi_idle_cs(&mut self, pin: GpPin, value: bool) {
        self.set_pin_bit(IDLE_CS, pin, value);
    }

    /// Chip-select level of `pin` during a transaction.
    pub fn spi_active_cs(&self, pin: GpPin) -> bool {
        self.pin_bit(ACTIVE_CS, pin)
    }

    /// Change the active chip-select level of `pin`.
    pub fn set_spi_active_cs(&mut self, pin: GpPin, value: bool) {
        self.set_pin_bit(ACTIVE_CS, pin, value);
    }

    /// Delay between asserting chip select and the first data byte.
    pub fn spi_cs_to_data_delay(&self) -> SpiDelay {
        SpiDelay::from_units(self.u16_at(CS_TO_DATA_DELAY))
    }

    /// Change the chip-select to data delay.
    pub fn set_spi_cs_to_data_delay(&mut self, delay: SpiDelay) {
        self.set_u16_at(CS_TO_DATA_DELAY, delay.units());
    }

    /// Delay between the last data byte and releasing chip select.
    pub fn spi_data_to_cs_delay(&self) -> SpiDelay {
        SpiDelay::from_units(self.u16_at(DATA_TO_CS_DELAY))
    }

    /// Change the data to chip-select delay.
    pub fn set_spi_data_to_cs_delay(&mut self, delay: SpiDelay) {
        self.set_u16_at(DATA_TO_CS_DELAY, delay.units());
    }

    /// Delay between consecutive data bytes.
    pub fn spi_byte_delay(&self) -> SpiDelay {
        SpiDelay::from_units(self.u16_at(BYTE_DELAY))
    }

    /// Change the delay between data bytes.
    pub fn set_spi_byte_delay(&mut self, delay: SpiDelay) {
        self.set_u16_at(BYTE_DELAY, delay.units());
    }

    /// Number of bytes in one SPI transaction.
    pub fn spi_transaction_size(&self) -> u16 {
        self.u16_at(TRANSACTION_SIZE)
    }

    /// Change the number of bytes in one SPI transaction.
    pub fn set_spi_transaction_size(&mut self, size: u16) {
        self.set_u16_at(TRANSACTION_SIZE, size);
    }

    /// Raw SPI mode, 0 to 3.
    pub fn spi_mode(&self) -> u8 {
        self.as_bytes()[MODE]
    }

    /// Change the raw SPI mode.
    pub fn set_spi_mode(&mut self, mode: u8) {
        self.as_bytes_mut()[MODE] = mode;
    }
}

/// Convert the MCP2210 SPI mode number to the embedded-hal mode.
pub(crate) fn mode_from_byte(value: u8) -> Result<Mode, Error> {
    match value {
        0 => Ok(MODE_0),
        1 => Ok(MODE_1),
        2 => Ok(MODE_2),
        3 => Ok(MODE_3),
        value => Err(Error::InvalidSettingValue {
            setting: "SPI mode",
            value,
        }),
    }
}

/// Convert an embedded-hal mode to the MCP2210 SPI mode number.
pub(crate) fn mode_to_byte(mode: Mode) -> u8 {
    use embedded_hal::spi::{Phase, Polarity};
    match (mode.polarity, mode.phase) {
        (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => 0,
        (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => 1,
        (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => 2,
        (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => 3,
    }
}

/// SPI transfer settings.
///
/// The MCP2210 keeps two copies of these: the runtime settings used for transfers, and
/// the power-up defaults in NVRAM. Both have the same layout.
///
/// The transaction size is significant: the MCP2210 holds chip select active until
/// that many bytes have been clocked, so it must match the length of the buffer
/// handed to [`MCP2210::spi_transfer`].
///
/// [`MCP2210::spi_transfer`]: crate::MCP2210::spi_transfer
///
/// ## Datasheet
///
/// See section 3.2.1 (Set SPI Transfer Settings) and section 3.2.2 (Get SPI Transfer
/// Settings), table 3-28 and table 3-30.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiSettings {
    /// Bit rate in bits per second.
    pub bit_rate: u32,
    /// Chip-select pin levels while idle. Set bits are high.
    pub idle_cs: PinMask,
    /// Chip-select pin levels during a transaction. Set bits are high.
    pub active_cs: PinMask,
    /// Delay between asserting chip select and the first data byte.
    pub cs_to_data_delay: SpiDelay,
    /// Delay between the last data byte and releasing chip select.
    pub data_to_cs_delay: SpiDelay,
    /// Delay between consecutive data bytes.
    pub byte_delay: SpiDelay,
    /// Bytes per transaction.
    pub transaction_size: u16,
    /// Clock polarity and phase.
    pub mode: Mode,
}

impl SpiSettings {
    /// Decode the settings from a Get SPI Settings or NVRAM SPI response.
    pub(crate) fn from_frame(frame: &Frame) -> Result<Self, Error> {
        Ok(Self {
            bit_rate: frame.spi_bit_rate(),
            idle_cs: frame.pin_mask(IDLE_CS),
            active_cs: frame.pin_mask(ACTIVE_CS),
            cs_to_data_delay: frame.spi_cs_to_data_delay(),
            data_to_cs_delay: frame.spi_data_to_cs_delay(),
            byte_delay: frame.spi_byte_delay(),
            transaction_size: frame.spi_transaction_size(),
            mode: mode_from_byte(frame.spi_mode())?,
        })
    }

    /// Write every field into `frame`.
    pub(crate) fn apply_to_frame(&self, frame: &mut Frame) {
        frame.set_spi_bit_rate(self.bit_rate);
        frame.set_pin_mask(IDLE_CS, self.idle_cs);
        frame.set_pin_mask(ACTIVE_CS, self.active_cs);
        frame.set_spi_cs_to_data_delay(self.cs_to_data_delay);
        frame.set_spi_data_to_cs_delay(self.data_to_cs_delay);
        frame.set_spi_byte_delay(self.byte_delay);
        frame.set_spi_transaction_size(self.transaction_size);
        frame.set_spi_mode(mode_to_byte(self.mode));
    }
}

/// Changes to be applied to the SPI transfer settings.
///
/// Settings that are not changed keep their current value. Build the changes and
/// pass them to [`MCP2210::change_spi_settings`].
///
/// ```rust
/// # use mcp2210_hal::settings::{SpiDelay, SpiSettingsChanges};
/// # fn main() -> Result<(), mcp2210_hal::Error> {
/// let mut changes = SpiSettingsChanges::new();
/// changes
///     .with_bit_rate(1_000_000)?
///     .with_transaction_size(4)
///     .with_byte_delay(SpiDelay::from_micros(200)?);
/// # Ok(())
/// # }
/// ```
///
/// [`MCP2210::change_spi_settings`]: crate::MCP2210::change_spi_settings
#[derive(Debug, Default, Clone, Copy)]
pub struct SpiSettingsChanges {
    bit_rate: Option<u32>,
    idle_cs: Option<PinMask>,
    active_cs: Option<PinMask>,
    cs_to_data_delay: Option<SpiDelay>,
    data_to_cs_delay: Option<SpiDelay>,
    byte_delay: Option<SpiDelay>,
    transaction_size: Option<u16>,
    mode: Option<Mode>,
}

impl SpiSettingsChanges {
    /// Create an empty set of changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the bit rate.
    ///
    /// The MCP2210 supports 1,464 bit/s to 12 Mbit/s.
    pub fn with_bit_rate(&mut self, bit_rate: u32) -> Result<&mut Self, Error> {
        if !(MIN_BIT_RATE..=MAX_BIT_RATE).contains(&bit_rate) {
            return Err(Error::BitRateOutOfRange(bit_rate));
        }
        self.bit_rate = Some(bit_rate);
        Ok(self)
    }

    /// Change the idle chip-select levels.
    pub fn with_idle_cs(&mut self, mask: PinMask) -> &mut Self {
        self.idle_cs = Some(mask);
        self
    }

    /// Change the active chip-select levels.
    pub fn with_active_cs(&mut self, mask: PinMask) -> &mut Self {
        self.active_cs = Some(mask);
        self
    }

    /// Change the chip-select to data delay.
    pub fn with_cs_to_data_delay(&mut self, delay: SpiDelay) -> &mut Self {
        self.cs_to_data_delay = Some(delay);
        self
    }

    /// Change the data to chip-select delay.
    pub fn with_data_to_cs_delay(&mut self, delay: SpiDelay) -> &mut Self {
        self.data_to_cs_delay = Some(delay);
        self
    }

    /// Change the delay between data bytes.
    pub fn with_byte_delay(&mut self, delay: SpiDelay) -> &mut Self {
        self.byte_delay = Some(delay);
        self
    }

    /// Change the number of bytes per transaction.
    pub fn with_transaction_size(&mut self, size: u16) -> &mut Self {
        self.transaction_size = Some(size);
        self
    }

    /// Change the SPI mode.
    pub fn with_mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    /// Write the requested changes into a previously read settings frame.
    pub(crate) fn apply_to_frame(&self, frame: &mut Frame) {
        debug!("applying SPI settings changes {self:?}");
        if let Some(bit_rate) = self.bit_rate {
            frame.set_spi_bit_rate(bit_rate);
        }
        if let Some(mask) = self.idle_cs {
            frame.set_pin_mask(IDLE_CS, mask);
        }
        if let Some(mask) = self.active_cs {
            frame.set_pin_mask(ACTIVE_CS, mask);
        }
        if let Some(delay) = self.cs_to_data_delay {
            frame.set_spi_cs_to_data_delay(delay);
        }
        if let Some(delay) = self.data_to_cs_delay {
            frame.set_spi_data_to_cs_delay(delay);
        }
        if let Some(delay) = self.byte_delay {
            frame.set_spi_byte_delay(delay);
        }
        if let Some(size) = self.transaction_size {
            frame.set_spi_transaction_size(size);
        }
        if let Some(mode) = self.mode {
            frame.set_spi_mode(mode_to_byte(mode));
        }
    }
}
