/// Wrapper for problems when communicating with the MCP2210.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying device write or read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// An error occurred in the HID layer.
    #[error("HID error: {0}")]
    HidApi(#[from] hidapi::HidError),
    /// Fewer than 64 bytes were written to the device.
    #[error("short write ({written} of 64 bytes)")]
    ShortWrite {
        /// Number of bytes the device accepted.
        written: usize,
    },
    /// Fewer than 64 bytes were read from the device.
    #[error("short read ({read} of 64 bytes)")]
    ShortRead {
        /// Number of bytes the device returned.
        read: usize,
    },
    /// The MCP2210 rejected the command with the enclosed reason.
    #[error("{0}")]
    Device(DeviceError),
    /// The command code echoed by the MCP2210 was not the command code sent.
    #[error("response command code mismatch (sent {sent:#04x}, received {received:#04x})")]
    CommandMismatch {
        /// Command code sent to the MCP2210.
        sent: u8,
        /// Command code echoed by the MCP2210.
        received: u8,
    },
    /// The NVRAM sub-command echoed by the MCP2210 was not the one sent.
    #[error("response sub-command code mismatch (sent {sent:#04x}, received {received:#04x})")]
    SubcommandMismatch {
        /// Sub-command code sent to the MCP2210.
        sent: u8,
        /// Sub-command code echoed by the MCP2210.
        received: u8,
    },
    /// The EEPROM address echoed by the MCP2210 was not the address requested.
    #[error("response address mismatch (sent {sent:#04x}, received {received:#04x})")]
    AddressMismatch {
        /// Address sent to the MCP2210.
        sent: u8,
        /// Address echoed by the MCP2210.
        received: u8,
    },
    /// The SPI engine status in a transfer response was not one of the known markers.
    #[error("invalid SPI transfer status {0:#04x}")]
    TransferStatus(u8),
    /// A transfer response claimed more data than has been sent and not yet received.
    #[error("SPI transfer response reports {reported} bytes, only {remaining} expected")]
    TransferOverrun {
        /// Byte count reported by the MCP2210.
        reported: usize,
        /// Bytes sent but not yet received, at most 60.
        remaining: usize,
    },
    /// SPI transactions are limited to 65,535 bytes.
    #[error("SPI transfer of {0} bytes exceeds the 65535 byte limit")]
    TransferTooLong(usize),
    /// An embedded-hal SPI operation that the MCP2210 cannot perform mid-transaction.
    #[error("unsupported SPI operation in transaction")]
    UnsupportedSpiOperation,
    /// GP pin numbers run from 0 to 8.
    #[error("pin number {0} out of range (0-8)")]
    PinOutOfRange(u8),
    /// SPI delays are stored in units of 100 µs.
    #[error("delay of {0} us is not a multiple of 100 us")]
    DelayNotMultipleOf100us(u32),
    /// SPI delays are limited to 65,535 units of 100 µs.
    #[error("delay of {0} us out of range")]
    DelayOutOfRange(u32),
    /// The MCP2210 supports bit rates from 1,464 to 12,000,000 bit/s.
    #[error("bit rate {0} out of range (1464-12000000)")]
    BitRateOutOfRange(u32),
    /// USB current requests are stored in units of 2 mA, up to 510 mA.
    #[error("requested current of {0} mA is not an even value in 0-510 mA")]
    CurrentOutOfRange(u16),
    /// USB string descriptors are limited to 58 bytes of UTF-16.
    #[error("USB string of {0} bytes exceeds the 58 byte limit")]
    StringTooLong(usize),
    /// The access password is at most 8 bytes.
    #[error("password of {0} bytes exceeds the 8 byte limit")]
    PasswordTooLong(usize),
    /// A settings byte read from the MCP2210 does not correspond to a known value.
    #[error("invalid value {value:#04x} for {setting}")]
    InvalidSettingValue {
        /// Name of the setting being decoded.
        setting: &'static str,
        /// Raw value read from the frame.
        value: u8,
    },
    /// A USB string read from the MCP2210 is not valid UTF-16.
    #[error("invalid UTF-16 string from device: {0}")]
    InvalidStringFromDevice(#[from] std::string::FromUtf16Error),
}

impl Error {
    /// True if the device reported that an SPI transfer is already in progress.
    ///
    /// This is the one condition the SPI transfer engine retries.
    pub fn is_transfer_in_progress(&self) -> bool {
        matches!(self, Error::Device(DeviceError::TransferInProgress))
    }
}

/// Error codes returned by the MCP2210 in byte 1 of a response.
///
/// ## Datasheet
///
/// See the response tables in section 3.2 for the codes each command can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The SPI bus is owned by an external master (0xF7).
    #[error("External master controls the SPI bus")]
    SpiBusUnavailable,
    /// An SPI transfer is already in progress (0xF8).
    #[error("SPI transfer already in progress")]
    TransferInProgress,
    /// The command code is not recognised (0xF9).
    #[error("No such command")]
    UnknownCommand,
    /// Writing the EEPROM failed (0xFA).
    #[error("EEPROM write failed")]
    EepromWriteFailed,
    /// The EEPROM or the settings are locked (0xFB).
    #[error("EEPROM is locked")]
    EepromLocked,
    /// The chip settings cannot be changed, for example when permanently locked (0xFC).
    #[error("Access rejected")]
    AccessRejected,
    /// The password was not accepted (0xFD).
    #[error("Bad password")]
    BadPassword,
    /// Any other non-zero status code.
    #[error("device reported error code {0:#04x}")]
    Other(u8),
}

impl DeviceError {
    /// Interpret the status byte of a failed response.
    pub fn from_code(code: u8) -> Self {
        match code {
            0xF7 => Self::SpiBusUnavailable,
            0xF8 => Self::TransferInProgress,
            0xF9 => Self::UnknownCommand,
            0xFA => Self::EepromWriteFailed,
            0xFB => Self::EepromLocked,
            0xFC => Self::AccessRejected,
            0xFD => Self::BadPassword,
            other => Self::Other(other),
        }
    }

    /// Raw status code as sent by the MCP2210.
    pub fn code(self) -> u8 {
        match self {
            Self::SpiBusUnavailable => 0xF7,
            Self::TransferInProgress => 0xF8,
            Self::UnknownCommand => 0xF9,
            Self::EepromWriteFailed => 0xFA,
            Self::EepromLocked => 0xFB,
            Self::AccessRejected => 0xFC,
            Self::BadPassword => 0xFD,
            Self::Other(code) => code,
        }
    }
}
