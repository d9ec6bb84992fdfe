//! Status read from the MCP2210.

use crate::frame::Frame;

/// Which master currently drives the SPI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOwner {
    /// Nobody owns the bus.
    None,
    /// The MCP2210 owns the bus on behalf of the USB host.
    Usb,
    /// An external SPI master owns the bus.
    External,
    /// A value the datasheet does not describe.
    Unknown(u8),
}

impl From<u8> for BusOwner {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::None,
            0x01 => Self::Usb,
            0x02 => Self::External,
            other => Self::Unknown(other),
        }
    }
}

/// Current status of the MCP2210.
///
/// Returned by both [`MCP2210::status`] and [`MCP2210::spi_cancel`].
///
/// Bytes in documentation are numbered from 0 through 63 and correspond to table 3-2
/// in section 3.2.1 (Get MCP2210 Status) of the datasheet.
///
/// [`MCP2210::status`]: crate::MCP2210::status
/// [`MCP2210::spi_cancel`]: crate::MCP2210::spi_cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// An external master has asked for the SPI bus and is waiting.
    ///
    /// Byte 2, which the MCP2210 sets to 0x01 when there is *no* request.
    pub external_request_pending: bool,
    /// Current SPI bus owner.
    ///
    /// Byte 3.
    pub bus_owner: BusOwner,
    /// Number of password attempts since power-up.
    ///
    /// Byte 4.
    pub password_attempts: u8,
    /// The access password has been sent successfully.
    ///
    /// Byte 5.
    pub password_guessed: bool,
}

impl Status {
    pub(crate) fn from_frame(frame: &Frame) -> Self {
        let buf = frame.as_bytes();
        Self {
            external_request_pending: buf[2] == 0x00,
            bus_owner: buf[3].into(),
            password_attempts: buf[4],
            password_guessed: buf[5] != 0x00,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_status() {
        let mut bytes = [0u8; 64];
        bytes[0] = 0x10;
        bytes[2..6].copy_from_slice(&[0x01, 0x01, 3, 0x01]);
        let status = Status::from_frame(&Frame::from_bytes(bytes));
        assert!(!status.external_request_pending);
        assert_eq!(status.bus_owner, BusOwner::Usb);
        assert_eq!(status.password_attempts, 3);
        assert!(status.password_guessed);

        bytes[2..6].copy_from_slice(&[0x00, 0x07, 0, 0]);
        let status = Status::from_frame(&Frame::from_bytes(bytes));
        assert!(status.external_request_pending);
        assert_eq!(status.bus_owner, BusOwner::Unknown(7));
        assert!(!status.password_guessed);
    }
}
