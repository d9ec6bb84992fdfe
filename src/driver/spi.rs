use std::time::Duration;

use embedded_hal::delay::DelayNs;
use log::debug;

use super::MCP2210;
use crate::commands::{Command, Memory, NvramParam};
use crate::constants::{PACKET_SIZE, SPI_BUSY_RETRY_DELAY, SPI_CHUNK, SPI_MAX_TRANSFER, spi_status};
use crate::error::Error;
use crate::frame::Frame;
use crate::settings::{SpiSettings, SpiSettingsChanges};
use crate::transport::HidTransport;

/// Offset of the data in a Transfer SPI Data request.
const REQUEST_DATA: usize = 2;
/// Offset of the data in a Transfer SPI Data response.
const RESPONSE_DATA: usize = 4;

/// Pacing per 100 µs unit of byte delay and data to chip-select delay, with margin.
const PACED_UNIT_NS: u64 = 130_000;
/// Pacing per 100 µs unit of chip-select to data delay.
const CS_TO_DATA_UNIT_NS: u64 = 100_000;

/// Progress through one SPI transaction.
///
/// Every byte received replaces a byte already sent, so `received <= written`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpiTransfer {
    pub(crate) written: usize,
    pub(crate) received: usize,
}

/// How long the MCP2210 should need to clock `len` bytes, including configured delays.
///
/// Only an estimate of when the next chunk will be accepted; the busy retry in
/// the transfer loop covers any shortfall.
pub(crate) fn chunk_duration(
    settings: &SpiSettings,
    len: usize,
    first: bool,
    last: bool,
) -> Duration {
    let len = len as u64;
    let bits = len * 8;
    let rate = u64::from(settings.bit_rate);
    let (secs, mut nanos) = match rate {
        0 => (0, 0),
        rate => (bits / rate, (bits % rate) * (1_000_000_000 / rate)),
    };
    nanos += len * u64::from(settings.byte_delay.units()) * PACED_UNIT_NS;
    if first {
        nanos += u64::from(settings.cs_to_data_delay.units()) * CS_TO_DATA_UNIT_NS;
    }
    if last {
        nanos += u64::from(settings.data_to_cs_delay.units()) * PACED_UNIT_NS;
    }
    Duration::from_secs(secs) + Duration::from_nanos(nanos)
}

impl<D: HidTransport, T: DelayNs> MCP2210<D, T> {
    ////////////////////////////////////////////////////////////////////////////////
    // SPI settings
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the SPI transfer settings.
    ///
    /// # Datasheet
    ///
    /// See section 3.2.2 (Get SPI Transfer Settings) and section 3.1.2 (Get NVRAM SPI
    /// Transfer Settings).
    pub fn read_spi_settings(&mut self, memory: Memory) -> Result<SpiSettings, Error> {
        let frame = self.read_settings_frame(memory, Command::SpiGet, NvramParam::SpiSettings)?;
        SpiSettings::from_frame(&frame)
    }

    /// Change the SPI transfer settings.
    ///
    /// The current settings are read first, so fields without a requested change
    /// keep their value.
    ///
    /// # Datasheet
    ///
    /// See section 3.2.1 (Set SPI Transfer Settings) and section 3.1.1 (Set NVRAM SPI
    /// Transfer Settings).
    pub fn change_spi_settings(
        &mut self,
        memory: Memory,
        changes: &SpiSettingsChanges,
    ) -> Result<(), Error> {
        let mut frame =
            self.read_settings_frame(memory, Command::SpiGet, NvramParam::SpiSettings)?;
        changes.apply_to_frame(&mut frame);
        self.write_settings_frame(&mut frame, memory, Command::SpiSet, NvramParam::SpiSettings)
    }

    /// Replace every SPI transfer setting.
    ///
    /// Unlike [`MCP2210::change_spi_settings`] this does not read the settings first.
    pub fn write_spi_settings(
        &mut self,
        memory: Memory,
        settings: &SpiSettings,
    ) -> Result<(), Error> {
        let mut frame = Frame::new();
        settings.apply_to_frame(&mut frame);
        self.write_settings_frame(&mut frame, memory, Command::SpiSet, NvramParam::SpiSettings)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // SPI transfers
    ////////////////////////////////////////////////////////////////////////////////

    /// Perform a full-duplex SPI transaction.
    ///
    /// The bytes of `buffer` are sent and replaced with the bytes received. The
    /// runtime transaction size must equal `buffer.len()`; `settings` should be the
    /// runtime SPI settings and is used to pace the chunks.
    ///
    /// Data moves in chunks of up to 58 bytes. When the MCP2210 reports that the
    /// previous chunk is still in progress, the chunk is sent again after 5 ms, for
    /// as long as that takes.
    ///
    /// # Errors
    ///
    /// - [`Error::TransferTooLong`] for buffers over 65,535 bytes.
    /// - [`Error::TransferStatus`] if a response carries an unknown engine status.
    /// - [`Error::TransferOverrun`] if a response claims more bytes than were sent.
    /// - Any error from [`MCP2210::exchange`] other than "transfer in progress".
    ///
    /// After an error `buffer` holds the bytes received so far followed by bytes not
    /// yet replaced. Use [`MCP2210::spi_cancel`] to reset the SPI engine.
    ///
    /// # Datasheet
    ///
    /// See section 3.2.4 (Transfer SPI Data).
    pub fn spi_transfer(&mut self, settings: &SpiSettings, buffer: &mut [u8]) -> Result<(), Error> {
        let mut transfer = SpiTransfer::default();
        self.run_spi_transfer(settings, buffer, &mut transfer)
    }

    pub(crate) fn run_spi_transfer(
        &mut self,
        settings: &SpiSettings,
        buffer: &mut [u8],
        transfer: &mut SpiTransfer,
    ) -> Result<(), Error> {
        let len = buffer.len();
        if len > SPI_MAX_TRANSFER {
            return Err(Error::TransferTooLong(len));
        }

        while transfer.received < len {
            debug_assert!(transfer.received <= transfer.written);
            let write_len = SPI_CHUNK.min(len - transfer.written);
            let read_len = SPI_CHUNK.min(len - transfer.received);
            let mut delay = chunk_duration(
                settings,
                read_len,
                transfer.written == 0,
                transfer.received + read_len == len,
            );

            let mut frame = Frame::new();
            loop {
                frame.clear();
                let bytes = frame.as_bytes_mut();
                // Fits: at most 58.
                bytes[1] = write_len as u8;
                bytes[REQUEST_DATA..REQUEST_DATA + write_len]
                    .copy_from_slice(&buffer[transfer.written..transfer.written + write_len]);

                let result = self.exchange(&mut frame, Command::SpiTransfer);
                self.pause(delay);
                match result {
                    Err(e) if e.is_transfer_in_progress() => {
                        debug!(
                            "SPI transfer in progress, resending chunk at byte {}",
                            transfer.written
                        );
                        delay = SPI_BUSY_RETRY_DELAY;
                    }
                    result => break result?,
                }
            }
            transfer.written += write_len;

            let bytes = frame.as_bytes();
            match bytes[3] {
                spi_status::FINISHED | spi_status::STARTED | spi_status::DATA => {}
                status => return Err(Error::TransferStatus(status)),
            }
            let count = bytes[2] as usize;
            // Only bytes already sent can come back.
            let remaining = (transfer.written - transfer.received).min(PACKET_SIZE - RESPONSE_DATA);
            if count > remaining {
                return Err(Error::TransferOverrun {
                    reported: count,
                    remaining,
                });
            }
            buffer[transfer.received..transfer.received + count]
                .copy_from_slice(&bytes[RESPONSE_DATA..RESPONSE_DATA + count]);
            transfer.received += count;
        }
        Ok(())
    }
}
