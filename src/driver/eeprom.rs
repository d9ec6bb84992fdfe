use embedded_hal::delay::DelayNs;

use super::MCP2210;
use crate::commands::Command;
use crate::constants::EEPROM_SIZE;
use crate::error::Error;
use crate::frame::Frame;
use crate::transport::HidTransport;

impl<D: HidTransport, T: DelayNs> MCP2210<D, T> {
    ////////////////////////////////////////////////////////////////////////////////
    // User EEPROM
    ////////////////////////////////////////////////////////////////////////////////

    /// Read one byte of the 256-byte user EEPROM.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AddressMismatch`] if the MCP2210 answers for a different
    /// address.
    ///
    /// # Datasheet
    ///
    /// See section 3.3.1 (Read EEPROM Memory).
    pub fn eeprom_read(&mut self, address: u8) -> Result<u8, Error> {
        let mut frame = Frame::new();
        frame.as_bytes_mut()[1] = address;
        self.exchange(&mut frame, Command::EepromRead)?;
        let bytes = frame.as_bytes();
        if bytes[2] != address {
            return Err(Error::AddressMismatch {
                sent: address,
                received: bytes[2],
            });
        }
        Ok(bytes[3])
    }

    /// Write one byte of the user EEPROM.
    ///
    /// Fails with [`DeviceError::EepromLocked`] if the EEPROM is protected.
    ///
    /// [`DeviceError::EepromLocked`]: crate::DeviceError::EepromLocked
    ///
    /// # Datasheet
    ///
    /// See section 3.3.2 (Write EEPROM Memory).
    pub fn eeprom_write(&mut self, address: u8, value: u8) -> Result<(), Error> {
        let mut frame = Frame::new();
        let bytes = frame.as_bytes_mut();
        bytes[1] = address;
        bytes[2] = value;
        self.exchange(&mut frame, Command::EepromWrite)
    }

    /// Read the whole user EEPROM, one byte at a time.
    pub fn eeprom_read_all(&mut self) -> Result<[u8; EEPROM_SIZE], Error> {
        let mut contents = [0u8; EEPROM_SIZE];
        for (address, byte) in (0..=u8::MAX).zip(contents.iter_mut()) {
            *byte = self.eeprom_read(address)?;
        }
        Ok(contents)
    }
}
