//! The 64-byte HID report exchanged with the MCP2210.

use bit_field::BitField;

use crate::constants::PACKET_SIZE;
use crate::gpio::{GpPin, PinMask};

/// A single 64-byte report, sent to or received from the MCP2210.
///
/// Byte 0 holds the command code (echoed back in responses). In requests, byte 1 is
/// either a sub-command or the first data byte; in responses it is the status code,
/// where 0 means success. The meaning of the rest depends on the command.
///
/// The field accessors (defined next to the settings types that use them) are
/// deliberately blind to the command in byte 0: reading an SPI field from a chip
/// settings frame returns whatever happens to be at that offset.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame([u8; PACKET_SIZE]);

impl Frame {
    /// Create a zeroed frame.
    pub const fn new() -> Self {
        Self([0; PACKET_SIZE])
    }

    /// Wrap raw report bytes.
    pub const fn from_bytes(bytes: [u8; PACKET_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw report bytes.
    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.0
    }

    /// Mutable raw report bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; PACKET_SIZE] {
        &mut self.0
    }

    /// Consume the frame, returning the raw bytes.
    pub fn into_bytes(self) -> [u8; PACKET_SIZE] {
        self.0
    }

    /// Zero every byte.
    pub fn clear(&mut self) {
        self.0 = [0; PACKET_SIZE];
    }

    /// Command code (byte 0).
    pub fn command_byte(&self) -> u8 {
        self.0[0]
    }

    /// Status code of a response, or sub-command of a request (byte 1).
    pub fn status_byte(&self) -> u8 {
        self.0[1]
    }

    pub(crate) fn u16_at(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.0[offset], self.0[offset + 1]])
    }

    pub(crate) fn set_u16_at(&mut self, offset: usize, value: u16) {
        self.0[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn u32_at(&self, offset: usize) -> u32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.0[offset..offset + 4]);
        u32::from_le_bytes(bytes)
    }

    pub(crate) fn set_u32_at(&mut self, offset: usize, value: u32) {
        self.0[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Read one pin's bit of the two-byte bitmask starting at `base`.
    ///
    /// GP0 to GP7 live in the low byte, GP8 is bit 0 of the high byte.
    pub(crate) fn pin_bit(&self, base: usize, pin: GpPin) -> bool {
        self.0[base + pin.byte_offset()].get_bit(pin.bit())
    }

    /// Change one pin's bit of the two-byte bitmask starting at `base`.
    pub(crate) fn set_pin_bit(&mut self, base: usize, pin: GpPin, value: bool) {
        self.0[base + pin.byte_offset()].set_bit(pin.bit(), value);
    }

    pub(crate) fn pin_mask(&self, base: usize) -> PinMask {
        PinMask::from_bits(self.u16_at(base))
    }

    pub(crate) fn set_pin_mask(&mut self, base: usize, mask: PinMask) {
        self.set_u16_at(base, mask.bits());
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[u8; PACKET_SIZE]> for Frame {
    fn from(bytes: [u8; PACKET_SIZE]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({:02x?})", &self.0[..])
    }
}
