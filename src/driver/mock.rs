//! Scripted transport and recording delay for driver tests.

use std::collections::VecDeque;
use std::time::Duration;

use embedded_hal::delay::DelayNs;

use super::MCP2210;
use crate::Error;
use crate::constants::PACKET_SIZE;
use crate::transport::HidTransport;

/// What the mock device does in answer to one request.
pub(crate) enum Reply {
    /// Respond with this report.
    Frame([u8; PACKET_SIZE]),
    /// Accept only this many bytes of the request.
    ShortWrite(usize),
    /// Return only this many bytes of the response.
    ShortRead(usize),
}

impl Reply {
    /// Successful response to `command`, with the rest filled in by `fill`.
    pub(crate) fn ok(command: u8, fill: impl FnOnce(&mut [u8; PACKET_SIZE])) -> Self {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[0] = command;
        fill(&mut bytes);
        Self::Frame(bytes)
    }

    /// Response to `command` carrying a non-zero status code.
    pub(crate) fn fail(command: u8, code: u8) -> Self {
        let mut bytes = [0u8; PACKET_SIZE];
        bytes[0] = command;
        bytes[1] = code;
        Self::Frame(bytes)
    }

    /// SPI transfer response returning `data` with the engine `status` marker.
    pub(crate) fn spi(status: u8, data: &[u8]) -> Self {
        Self::ok(0x42, |b| {
            b[2] = data.len() as u8;
            b[3] = status;
            b[4..4 + data.len()].copy_from_slice(data);
        })
    }
}

/// Device answering each request with the next scripted reply.
#[derive(Default)]
pub(crate) struct MockDevice {
    pub(crate) requests: Vec<[u8; PACKET_SIZE]>,
    replies: VecDeque<Reply>,
    pending: Option<Reply>,
}

impl HidTransport for MockDevice {
    fn write_report(&mut self, report: &[u8; PACKET_SIZE]) -> Result<usize, Error> {
        self.requests.push(*report);
        match self.replies.pop_front() {
            Some(Reply::ShortWrite(n)) => Ok(n),
            reply => {
                self.pending = reply;
                Ok(PACKET_SIZE)
            }
        }
    }

    fn read_report(&mut self, report: &mut [u8; PACKET_SIZE]) -> Result<usize, Error> {
        match self.pending.take() {
            Some(Reply::Frame(bytes)) => {
                *report = bytes;
                Ok(PACKET_SIZE)
            }
            Some(Reply::ShortRead(n)) => Ok(n),
            _ => Err(std::io::Error::other("no scripted reply").into()),
        }
    }
}

/// Delay that records the total time requested instead of sleeping.
#[derive(Debug, Default)]
pub(crate) struct RecordingDelay {
    pub(crate) total: Duration,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total += Duration::from_nanos(ns.into());
    }
}

pub(crate) type MockDriver = MCP2210<MockDevice, RecordingDelay>;

/// Driver over a mock device scripted with `replies`.
pub(crate) fn driver<const N: usize>(replies: [Reply; N]) -> MockDriver {
    let device = MockDevice {
        replies: replies.into(),
        ..Default::default()
    };
    MCP2210::with_delay(device, RecordingDelay::default())
}

impl MockDriver {
    pub(crate) fn requests(&self) -> &[[u8; PACKET_SIZE]] {
        &self.inner.requests
    }

    pub(crate) fn slept(&self) -> Duration {
        self.delay.total
    }
}
