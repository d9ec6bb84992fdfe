use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::trace;

use crate::commands::{Command, Memory, NvramParam};
use crate::constants::{COMMAND_SUCCESS, PACKET_SIZE};
use crate::error::{DeviceError, Error};
use crate::frame::Frame;
use crate::gpio::LogicLevel;
use crate::settings::Password;
use crate::status::Status;
use crate::transport::{HidTransport, StdDelay, pause};

mod chip;
mod eeprom;
mod gpio;
mod nvram;
mod spi;
mod spi_eh;

#[cfg(test)]
pub(crate) mod mock;

/// Driver for the MCP2210.
///
/// # Quick start
///
/// Open the USB HID device yourself (for example with [`hidapi`]) and hand it to
/// [`MCP2210::new`]. Any type implementing [`HidTransport`] will do.
///
/// ```no_run
/// # fn main() -> Result<(), mcp2210_hal::Error> {
/// use mcp2210_hal::{MCP2210, Memory, constants};
///
/// let api = hidapi::HidApi::new()?;
/// let device = api.open(constants::MICROCHIP_VID, constants::MCP2210_PID)?;
/// let mut mcp = MCP2210::new(device);
///
/// let settings = mcp.read_spi_settings(Memory::Runtime)?;
/// let mut data = [0x9F, 0, 0, 0];
/// mcp.spi_transfer(&settings, &mut data)?;
/// # Ok(())
/// # }
/// ```
///
/// For SPI peripherals with embedded-hal drivers, the struct implements the
/// [blocking][blocking SPI] `SpiDevice` trait, and the async one with the `async`
/// feature.
///
/// [blocking SPI]: embedded_hal::spi::SpiDevice
///
/// # Overview
///
/// Every operation is one or more 64-byte report exchanges, made through
/// [`MCP2210::exchange`]. The methods are grouped as:
///
/// - Status, SPI cancel, SPI bus release and the GP6 event counter (this module).
/// - GPIO levels and directions.
/// - SPI settings and SPI transfers.
/// - Chip settings, in either the runtime or NVRAM copy.
/// - USB key parameters and descriptor strings (NVRAM only).
/// - User EEPROM and the access password.
///
/// The driver sleeps between SPI chunks using the [`DelayNs`] implementation it was
/// created with, [`StdDelay`] by default.
#[derive(Debug)]
pub struct MCP2210<D, T = StdDelay> {
    inner: D,
    delay: T,
}

impl<D: HidTransport> MCP2210<D, StdDelay> {
    ////////////////////////////////////////////////////////////////////////////////
    // Constructors
    ////////////////////////////////////////////////////////////////////////////////

    /// Create a driver for an already opened device, sleeping with [`StdDelay`].
    pub fn new(device: D) -> Self {
        Self::with_delay(device, StdDelay)
    }
}

impl<D: HidTransport, T: DelayNs> MCP2210<D, T> {
    /// Create a driver with a custom delay implementation.
    pub fn with_delay(device: D, delay: T) -> Self {
        Self {
            inner: device,
            delay,
        }
    }

    /// Release the underlying device and delay.
    pub fn into_inner(self) -> (D, T) {
        (self.inner, self.delay)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // USB report exchange with the MCP2210
    ////////////////////////////////////////////////////////////////////////////////

    /// Send `frame` as `command` and replace it with the response.
    ///
    /// The command code is written to byte 0; the rest of the frame is sent as is.
    /// Exactly one report is written and one read.
    ///
    /// # Errors
    ///
    /// - Transport failures are returned as-is.
    /// - [`Error::ShortWrite`] or [`Error::ShortRead`] if fewer than 64 bytes moved.
    /// - [`Error::Device`] if the status byte of the response is not zero.
    /// - [`Error::CommandMismatch`] if the response echoes a different command.
    pub fn exchange(&mut self, frame: &mut Frame, command: Command) -> Result<(), Error> {
        let sent = command.code();
        frame.as_bytes_mut()[0] = sent;
        trace!("write {command:?}: {frame:?}");

        let written = self.inner.write_report(frame.as_bytes())?;
        if written != PACKET_SIZE {
            return Err(Error::ShortWrite { written });
        }
        let read = self.inner.read_report(frame.as_bytes_mut())?;
        if read != PACKET_SIZE {
            return Err(Error::ShortRead { read });
        }
        trace!("read {command:?}: {frame:?}");

        let status = frame.status_byte();
        if status != COMMAND_SUCCESS {
            return Err(Error::Device(DeviceError::from_code(status)));
        }
        let received = frame.command_byte();
        if received != sent {
            return Err(Error::CommandMismatch { sent, received });
        }
        Ok(())
    }

    /// Send an NVRAM command with its sub-command in byte 1.
    ///
    /// As [`MCP2210::exchange`], and additionally fails with
    /// [`Error::SubcommandMismatch`] if byte 2 of the response is not the sub-command.
    pub fn sub_exchange(
        &mut self,
        frame: &mut Frame,
        command: Command,
        param: NvramParam,
    ) -> Result<(), Error> {
        let sent = param.code();
        frame.as_bytes_mut()[1] = sent;
        self.exchange(frame, command)?;
        let received = frame.as_bytes()[2];
        if received != sent {
            return Err(Error::SubcommandMismatch { sent, received });
        }
        Ok(())
    }

    /// Fetch a settings frame from the runtime or NVRAM copy.
    fn read_settings_frame(
        &mut self,
        memory: Memory,
        runtime: Command,
        param: NvramParam,
    ) -> Result<Frame, Error> {
        let mut frame = Frame::new();
        match memory {
            Memory::Runtime => self.exchange(&mut frame, runtime)?,
            Memory::Nvram => self.sub_exchange(&mut frame, Command::NvramGet, param)?,
        }
        Ok(frame)
    }

    /// Write back a settings frame previously fetched with `read_settings_frame`.
    fn write_settings_frame(
        &mut self,
        frame: &mut Frame,
        memory: Memory,
        runtime: Command,
        param: NvramParam,
    ) -> Result<(), Error> {
        // Drop the response header; the field bytes are kept.
        frame.as_bytes_mut()[1..4].fill(0);
        match memory {
            Memory::Runtime => self.exchange(frame, runtime),
            Memory::Nvram => self.sub_exchange(frame, Command::NvramSet, param),
        }
    }

    fn pause(&mut self, duration: Duration) {
        pause(&mut self.delay, duration);
    }

    ////////////////////////////////////////////////////////////////////////////////
    // MCP2210 general commands
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the status of the MCP2210.
    ///
    /// # Datasheet
    ///
    /// See section 3.2.1 (Get MCP2210 Status).
    pub fn status(&mut self) -> Result<Status, Error> {
        let mut frame = Frame::new();
        self.exchange(&mut frame, Command::StatusGet)?;
        Ok(Status::from_frame(&frame))
    }

    /// Cancel the current SPI transfer, returning the chip status.
    ///
    /// This is the way to recover from a transfer left hanging, for example after an
    /// [`MCP2210::spi_transfer`] that failed part-way through.
    ///
    /// # Datasheet
    ///
    /// See section 3.2.5 (Cancel the Current SPI Transfer).
    pub fn spi_cancel(&mut self) -> Result<Status, Error> {
        let mut frame = Frame::new();
        self.exchange(&mut frame, Command::SpiCancel)?;
        Ok(Status::from_frame(&frame))
    }

    /// Release the SPI bus for an external master.
    ///
    /// `acknowledge` is the level driven on GP7 (when set to its dedicated function)
    /// to acknowledge the release.
    ///
    /// # Datasheet
    ///
    /// See section 3.2.13 (Request SPI Bus Release).
    pub fn spi_release_bus(&mut self, acknowledge: LogicLevel) -> Result<(), Error> {
        let mut frame = Frame::new();
        frame.as_bytes_mut()[1] = bool::from(acknowledge).into();
        self.exchange(&mut frame, Command::SpiBusRelease)
    }

    /// Read the number of events counted on GP6, optionally resetting the counter.
    ///
    /// GP6 must be set to its dedicated function and a counting mode selected in the
    /// chip settings, see [`Gp6CounterMode`](crate::settings::Gp6CounterMode).
    ///
    /// # Datasheet
    ///
    /// See section 3.2.12 (Get (VM) Current Number of Events From the Interrupt Pin).
    pub fn gp6_event_count(&mut self, reset: bool) -> Result<u16, Error> {
        let mut frame = Frame::new();
        // 0x00 resets the counter, anything else keeps it.
        frame.as_bytes_mut()[1] = if reset { 0x00 } else { 0xFF };
        self.exchange(&mut frame, Command::Gp6CountGet)?;
        Ok(frame.u16_at(4))
    }

    /// Send the access password, unlocking password-protected NVRAM settings.
    ///
    /// The MCP2210 blocks further attempts after five wrong passwords until it is
    /// power-cycled, see [`Status::password_attempts`].
    ///
    /// # Datasheet
    ///
    /// See section 3.1.16 (Send Access Password).
    pub fn send_password(&mut self, password: &Password) -> Result<(), Error> {
        let mut frame = Frame::new();
        frame.as_bytes_mut()[4..12].copy_from_slice(password.as_bytes());
        self.exchange(&mut frame, Command::SendPassword)
    }
}

#[cfg(test)]
mod test {
    use super::mock::{MockDevice, Reply, driver};
    use super::*;
    use crate::status::BusOwner;

    #[test]
    fn exchange_writes_command_byte() {
        let mut mcp = driver([Reply::ok(0x10, |_| {})]);
        let mut frame = Frame::new();
        frame.as_bytes_mut()[7] = 0xAA;
        mcp.exchange(&mut frame, Command::StatusGet).unwrap();
        let requests = mcp.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0][0], 0x10);
        assert_eq!(requests[0][7], 0xAA);
    }

    #[test]
    fn device_error_beats_command_mismatch() {
        let mut mcp = driver([Reply::fail(0x99, 0xF9)]);
        let result = mcp.exchange(&mut Frame::new(), Command::StatusGet);
        assert!(matches!(
            result,
            Err(Error::Device(DeviceError::UnknownCommand))
        ));
    }

    #[test]
    fn command_mismatch() {
        let mut mcp = driver([Reply::ok(0x20, |_| {})]);
        let result = mcp.exchange(&mut Frame::new(), Command::StatusGet);
        assert!(matches!(
            result,
            Err(Error::CommandMismatch {
                sent: 0x10,
                received: 0x20
            })
        ));
    }

    #[test]
    fn short_write_and_read() {
        let mut mcp = driver([Reply::ShortWrite(12)]);
        assert!(matches!(
            mcp.exchange(&mut Frame::new(), Command::StatusGet),
            Err(Error::ShortWrite { written: 12 })
        ));
        let mut mcp = driver([Reply::ShortRead(63)]);
        assert!(matches!(
            mcp.exchange(&mut Frame::new(), Command::StatusGet),
            Err(Error::ShortRead { read: 63 })
        ));
    }

    #[test]
    fn transport_error_passes_through() {
        let mut mcp = driver([]);
        assert!(matches!(
            mcp.exchange(&mut Frame::new(), Command::StatusGet),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn subcommand_mismatch() {
        let mut mcp = driver([Reply::ok(0x61, |b| b[2] = 0x20)]);
        let result = mcp.sub_exchange(&mut Frame::new(), Command::NvramGet, NvramParam::UsbKey);
        assert!(matches!(
            result,
            Err(Error::SubcommandMismatch {
                sent: 0x30,
                received: 0x20
            })
        ));
        assert_eq!(mcp.requests()[0][1], 0x30);
    }

    #[test]
    fn cancel_returns_status() {
        let mut mcp = driver([Reply::ok(0x11, |b| {
            b[2] = 0x01;
            b[3] = 0x00;
        })]);
        let status = mcp.spi_cancel().unwrap();
        assert_eq!(status.bus_owner, BusOwner::None);
        assert!(!status.external_request_pending);
        assert!(mcp.requests()[0][1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn gp6_counter() {
        let mut mcp = driver([
            Reply::ok(0x12, |b| b[4..6].copy_from_slice(&[0x34, 0x12])),
            Reply::ok(0x12, |_| {}),
        ]);
        assert_eq!(mcp.gp6_event_count(false).unwrap(), 0x1234);
        assert_eq!(mcp.gp6_event_count(true).unwrap(), 0);
        let requests = mcp.requests();
        assert_eq!(requests[0][1], 0xFF);
        assert_eq!(requests[1][1], 0x00);
    }

    #[test]
    fn password_and_bus_release_requests() {
        let mut mcp = driver([
            Reply::ok(0x70, |_| {}),
            Reply::ok(0x80, |_| {}),
            Reply::fail(0x70, 0xFD),
        ]);
        let password: Password = "hunter2".parse().unwrap();
        mcp.send_password(&password).unwrap();
        mcp.spi_release_bus(LogicLevel::High).unwrap();
        assert!(matches!(
            mcp.send_password(&password),
            Err(Error::Device(DeviceError::BadPassword))
        ));

        let requests = mcp.requests();
        assert_eq!(&requests[0][4..12], b"hunter2\0");
        assert_eq!(requests[1][0], 0x80);
        assert_eq!(requests[1][1], 0x01);
    }

    #[test]
    fn into_inner_returns_device() {
        let mcp = driver([]);
        let (device, _delay): (MockDevice, _) = mcp.into_inner();
        assert!(device.requests.is_empty());
    }
}
