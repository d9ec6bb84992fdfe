//! embedded_hal SPI trait implementations for MCP2210.
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{self, Operation, SpiDevice};

use super::MCP2210;
use crate::Error;
use crate::commands::Memory;
use crate::constants::SPI_MAX_TRANSFER;
use crate::transport::HidTransport;

impl spi::Error for Error {
    fn kind(&self) -> spi::ErrorKind {
        // The MCP2210 reports nothing that maps onto the bus-level error kinds.
        spi::ErrorKind::Other
    }
}

impl<D, T> spi::ErrorType for MCP2210<D, T> {
    type Error = Error;
}

/// Number of bytes clocked by one operation.
fn operation_length(op: &Operation<'_, u8>) -> Result<usize, Error> {
    match op {
        Operation::Read(buf) => Ok(buf.len()),
        Operation::Write(buf) => Ok(buf.len()),
        Operation::Transfer(read, write) => Ok(read.len().max(write.len())),
        Operation::TransferInPlace(buf) => Ok(buf.len()),
        Operation::DelayNs(_) => Err(Error::UnsupportedSpiOperation),
    }
}

impl<D: HidTransport, T: DelayNs> SpiDevice for MCP2210<D, T> {
    /// Run the operations as a single SPI transaction.
    ///
    /// <div class="warning">
    ///
    /// The MCP2210 controls chip select itself and clocks each transaction without
    /// pauses, so [`Operation::DelayNs`] is not supported and returns
    /// [`Error::UnsupportedSpiOperation`].
    ///
    /// </div>
    ///
    /// All operations are gathered into one buffer and sent with
    /// [`MCP2210::spi_transfer`], using the runtime SPI settings. Chip select follows
    /// the idle and active levels in those settings. If the runtime transaction size
    /// differs from the total length, it is changed first.
    ///
    /// Read operations send zeroes. A [`Operation::Transfer`] with buffers of
    /// different lengths clocks the longer of the two, as the trait requires.
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        // Check every operation before touching the device.
        let lengths = operations
            .iter()
            .map(operation_length)
            .collect::<Result<Vec<usize>, Error>>()?;
        let total: usize = lengths.iter().sum();
        if total == 0 {
            return Ok(());
        }
        if total > SPI_MAX_TRANSFER {
            return Err(Error::TransferTooLong(total));
        }

        // Gather everything to be written.
        let mut data = vec![0u8; total];
        let mut offset = 0;
        for (op, len) in operations.iter().zip(&lengths) {
            match op {
                Operation::Write(buf) | Operation::Transfer(_, buf) => {
                    data[offset..offset + buf.len()].copy_from_slice(buf);
                }
                Operation::TransferInPlace(buf) => {
                    data[offset..offset + buf.len()].copy_from_slice(buf);
                }
                Operation::Read(_) | Operation::DelayNs(_) => {}
            }
            offset += len;
        }

        let mut settings = self.read_spi_settings(Memory::Runtime)?;
        // Fits: checked against the 65,535 byte limit above.
        let size = total as u16;
        if settings.transaction_size != size {
            settings.transaction_size = size;
            self.write_spi_settings(Memory::Runtime, &settings)?;
        }
        self.spi_transfer(&settings, &mut data)?;

        // Fill the caller's buffers from ours.
        let mut offset = 0;
        for (op, len) in operations.iter_mut().zip(&lengths) {
            match op {
                Operation::Read(buf) | Operation::Transfer(buf, _) => {
                    let n = buf.len();
                    buf.copy_from_slice(&data[offset..offset + n]);
                }
                Operation::TransferInPlace(buf) => {
                    let n = buf.len();
                    buf.copy_from_slice(&data[offset..offset + n]);
                }
                Operation::Write(_) | Operation::DelayNs(_) => {}
            }
            offset += len;
        }
        Ok(())
    }
}

#[cfg(feature = "async")]
mod eh_async {
    use embedded_hal::delay::DelayNs;
    use embedded_hal::spi::{Operation, SpiDevice as BlockingSpiDevice};
    use embedded_hal_async::spi::SpiDevice as AsyncSpiDevice;

    use crate::MCP2210;
    use crate::transport::HidTransport;

    impl<D: HidTransport, T: DelayNs> AsyncSpiDevice for MCP2210<D, T> {
        async fn transaction(
            &mut self,
            operations: &mut [Operation<'_, u8>],
        ) -> Result<(), Self::Error> {
            BlockingSpiDevice::transaction(self, operations)
        }
    }
}
