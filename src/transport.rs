//! Blocking 64-byte report I/O and the sleep primitive used between SPI chunks.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::Error;
use crate::constants::PACKET_SIZE;

/// A device that exchanges fixed-size HID reports with the MCP2210.
///
/// Implemented for [`hidapi::HidDevice`], and for your own device types. Both
/// methods return the number of report bytes moved, which the driver checks against
/// the full 64.
pub trait HidTransport {
    /// Send one output report.
    fn write_report(&mut self, report: &[u8; PACKET_SIZE]) -> Result<usize, Error>;

    /// Block until one input report arrives.
    fn read_report(&mut self, report: &mut [u8; PACKET_SIZE]) -> Result<usize, Error>;
}

impl<T: HidTransport + ?Sized> HidTransport for &mut T {
    fn write_report(&mut self, report: &[u8; PACKET_SIZE]) -> Result<usize, Error> {
        (**self).write_report(report)
    }

    fn read_report(&mut self, report: &mut [u8; PACKET_SIZE]) -> Result<usize, Error> {
        (**self).read_report(report)
    }
}

impl HidTransport for hidapi::HidDevice {
    fn write_report(&mut self, report: &[u8; PACKET_SIZE]) -> Result<usize, Error> {
        // The MCP2210 does not use numbered reports, so the report ID is 0.
        let mut out = [0u8; PACKET_SIZE + 1];
        out[1..].copy_from_slice(report);
        let written = self.write(&out)?;
        Ok(written.saturating_sub(1))
    }

    fn read_report(&mut self, report: &mut [u8; PACKET_SIZE]) -> Result<usize, Error> {
        Ok(self.read(report)?)
    }
}

/// [`DelayNs`] implementation that blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns.into()));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms.into()));
    }
}

/// Sleep for `duration` using a [`DelayNs`] implementation.
///
/// Durations longer than `u32::MAX` milliseconds are clamped.
pub(crate) fn pause(delay: &mut impl DelayNs, duration: Duration) {
    let ms = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
    let ns = duration.subsec_nanos() % 1_000_000;
    if ms > 0 {
        delay.delay_ms(ms);
    }
    if ns > 0 {
        delay.delay_ns(ns);
    }
}
