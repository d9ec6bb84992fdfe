//! Protocol constants for the MCP2210.
//!
//! Section numbers in comments refer to the MCP2210 datasheet (DS22288A).

use std::time::Duration;

/// Size of every HID report exchanged with the MCP2210, in both directions.
pub const PACKET_SIZE: usize = 64;

/// Largest SPI payload carried by a single Transfer SPI Data report.
pub const SPI_CHUNK: usize = 58;

/// Largest SPI transaction the MCP2210 will accept (16-bit transaction size).
pub const SPI_MAX_TRANSFER: usize = 65_535;

/// Number of GP pins (GP0 through GP8).
pub const GP_PIN_COUNT: usize = 9;

/// Maximum payload length of a USB string descriptor stored in NVRAM, in bytes.
pub const USB_STRING_MAX: usize = 58;

/// Length of the chip settings access password.
pub const PASSWORD_LEN: usize = 8;

/// Size of the user EEPROM.
pub const EEPROM_SIZE: usize = 256;

/// Slowest SPI bit rate supported by the MCP2210.
pub const MIN_BIT_RATE: u32 = 1_464;

/// Fastest SPI bit rate supported by the MCP2210.
pub const MAX_BIT_RATE: u32 = 12_000_000;

/// Delay before re-sending an SPI chunk the chip refused as "transfer in progress".
pub const SPI_BUSY_RETRY_DELAY: Duration = Duration::from_millis(5);

/// Factory-default Microchip USB vendor ID.
pub const MICROCHIP_VID: u16 = 0x04D8;

/// Factory-default MCP2210 USB product ID.
pub const MCP2210_PID: u16 = 0x00DE;

/// Value of the status byte when a command completes successfully.
pub(crate) const COMMAND_SUCCESS: u8 = 0x00;

/// USB string descriptor type, stored ahead of the UTF-16 payload.
pub(crate) const USB_STRING_DESCRIPTOR_TYPE: u8 = 0x03;

/// SPI transfer status markers (byte 3 of the Transfer SPI Data response).
pub(crate) mod spi_status {
    /// The SPI transfer has finished and no more data is pending.
    pub const FINISHED: u8 = 0x10;
    /// The SPI transfer has started, no data is returned yet.
    pub const STARTED: u8 = 0x20;
    /// The SPI transfer is in progress and the response carries data.
    pub const DATA: u8 = 0x30;
}
