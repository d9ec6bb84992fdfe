//! HID command and sub-command codes.

/// Commands understood by the MCP2210.
///
/// Each command is sent as byte 0 of a 64-byte report and echoed back in byte 0 of
/// the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Read the chip status: bus ownership and password attempt counters.
    ///
    /// See section 3.2.1 of the datasheet.
    StatusGet,
    /// Cancel the SPI transfer in progress and release the bus.
    SpiCancel,
    /// Read (and optionally reset) the GP6 interrupt event counter.
    Gp6CountGet,
    /// Read the runtime chip settings (pin designations, defaults, access control).
    ChipGet,
    /// Change the runtime chip settings.
    ChipSet,
    /// Set the GPIO output levels.
    GpioValueSet,
    /// Read the GPIO pin levels.
    GpioValueGet,
    /// Set the GPIO pin directions.
    GpioDirectionSet,
    /// Read the GPIO pin directions.
    GpioDirectionGet,
    /// Change the runtime SPI transfer settings.
    SpiSet,
    /// Read the runtime SPI transfer settings.
    SpiGet,
    /// Transfer up to 58 bytes of SPI data in each direction.
    SpiTransfer,
    /// Read one byte of the user EEPROM.
    EepromRead,
    /// Write one byte of the user EEPROM.
    EepromWrite,
    /// Write power-up settings. Takes an [`NvramParam`] sub-command.
    NvramSet,
    /// Read power-up settings. Takes an [`NvramParam`] sub-command.
    NvramGet,
    /// Send the access password to unlock protected settings.
    SendPassword,
    /// Ask the MCP2210 to release the SPI bus to an external master.
    SpiBusRelease,
}

impl Command {
    /// Command code written to byte 0 of the report.
    pub const fn code(self) -> u8 {
        match self {
            Command::StatusGet => 0x10,
            Command::SpiCancel => 0x11,
            Command::Gp6CountGet => 0x12,
            Command::ChipGet => 0x20,
            Command::ChipSet => 0x21,
            Command::GpioValueSet => 0x30,
            Command::GpioValueGet => 0x31,
            Command::GpioDirectionSet => 0x32,
            Command::GpioDirectionGet => 0x33,
            Command::SpiSet => 0x40,
            Command::SpiGet => 0x41,
            Command::SpiTransfer => 0x42,
            Command::EepromRead => 0x50,
            Command::EepromWrite => 0x51,
            Command::NvramSet => 0x60,
            Command::NvramGet => 0x61,
            Command::SendPassword => 0x70,
            Command::SpiBusRelease => 0x80,
        }
    }
}

/// Sub-commands of [`Command::NvramGet`] and [`Command::NvramSet`].
///
/// Written to byte 1 of the request and echoed back in byte 2 of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvramParam {
    /// Power-up SPI transfer settings.
    SpiSettings,
    /// Power-up chip settings.
    ChipSettings,
    /// USB key parameters: VID, PID, power attributes and requested current.
    UsbKey,
    /// USB product string descriptor.
    ProductName,
    /// USB manufacturer string descriptor.
    ManufacturerName,
}

impl NvramParam {
    /// Sub-command code.
    pub const fn code(self) -> u8 {
        match self {
            NvramParam::SpiSettings => 0x10,
            NvramParam::ChipSettings => 0x20,
            NvramParam::UsbKey => 0x30,
            NvramParam::ProductName => 0x40,
            NvramParam::ManufacturerName => 0x50,
        }
    }
}

/// Which copy of the settings to access.
///
/// Runtime settings take effect immediately and are lost on reset. NVRAM settings
/// are copied into the runtime settings when the chip powers up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Memory {
    /// Current (volatile) settings.
    Runtime,
    /// Power-up defaults stored in the chip's non-volatile memory.
    Nvram,
}
