use bit_field::BitField;

use crate::Error;

/// One of the nine GP pins of the MCP2210.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpPin {
    /// GP0, also CS0.
    Gp0,
    /// GP1, also CS1.
    Gp1,
    /// GP2, also CS2 or USB suspend indicator.
    Gp2,
    /// GP3, also CS3 or SPI transfer LED.
    Gp3,
    /// GP4, also CS4 or USB low-power indicator.
    Gp4,
    /// GP5, also CS5 or USB configured indicator.
    Gp5,
    /// GP6, also CS6 or interrupt event input.
    Gp6,
    /// GP7, also CS7 or SPI bus release acknowledge.
    Gp7,
    /// GP8, also CS8 or SPI bus release request.
    Gp8,
}

impl GpPin {
    /// All GP pins in ascending order.
    pub const ALL: [GpPin; 9] = [
        GpPin::Gp0,
        GpPin::Gp1,
        GpPin::Gp2,
        GpPin::Gp3,
        GpPin::Gp4,
        GpPin::Gp5,
        GpPin::Gp6,
        GpPin::Gp7,
        GpPin::Gp8,
    ];

    /// Pin number, `0..=8`.
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Offset of this pin's byte within a two-byte pin bitmask.
    pub(crate) const fn byte_offset(self) -> usize {
        if self.number() >= 8 { 1 } else { 0 }
    }

    /// Position of this pin's bit within its byte.
    pub(crate) const fn bit(self) -> usize {
        (self.number() % 8) as usize
    }
}

impl TryFrom<u8> for GpPin {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        GpPin::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::PinOutOfRange(value))
    }
}

impl std::fmt::Display for GpPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GP{}", self.number())
    }
}

/// One bit per GP pin.
///
/// Used for GPIO levels and directions, chip-select idle and active values, and the
/// power-up defaults in the chip settings. Bits above GP8 are kept as read from the
/// device so that writing a mask back does not alter them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinMask(u16);

impl PinMask {
    /// A mask with every bit clear.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wrap raw bits, GP0 in bit 0.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits, GP0 in bit 0.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether the bit for `pin` is set.
    pub fn is_set(self, pin: GpPin) -> bool {
        self.0.get_bit(pin.number() as usize)
    }

    /// Set or clear the bit for `pin`.
    pub fn set(&mut self, pin: GpPin, value: bool) {
        self.0.set_bit(pin.number() as usize, value);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, pin: GpPin, value: bool) -> Self {
        self.set(pin, value);
        self
    }
}

/// GPIO pin level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicLevel {
    /// Logic high.
    High,
    /// Logic low.
    Low,
}

impl From<bool> for LogicLevel {
    fn from(value: bool) -> Self {
        if value { Self::High } else { Self::Low }
    }
}

impl From<LogicLevel> for bool {
    fn from(value: LogicLevel) -> Self {
        match value {
            LogicLevel::High => true,
            LogicLevel::Low => false,
        }
    }
}

/// GPIO pin direction.
///
/// The MCP2210 stores inputs as 1 and outputs as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioDirection {
    /// Digital input.
    Input,
    /// Digital output.
    Output,
}

impl From<bool> for GpioDirection {
    fn from(value: bool) -> Self {
        if value { Self::Input } else { Self::Output }
    }
}

impl From<GpioDirection> for bool {
    fn from(value: GpioDirection) -> Self {
        match value {
            GpioDirection::Input => true,
            GpioDirection::Output => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pin_numbers() {
        for (n, pin) in GpPin::ALL.iter().enumerate() {
            assert_eq!(pin.number() as usize, n);
            assert_eq!(GpPin::try_from(n as u8).unwrap(), *pin);
        }
        assert!(matches!(GpPin::try_from(9), Err(Error::PinOutOfRange(9))));
    }

    #[test]
    fn mask_keeps_unused_bits() {
        let mask = PinMask::from_bits(0xFE00).with(GpPin::Gp8, true);
        assert_eq!(mask.bits(), 0xFF00);
        let mask = mask.with(GpPin::Gp8, false).with(GpPin::Gp0, true);
        assert_eq!(mask.bits(), 0xFE01);
        assert!(mask.is_set(GpPin::Gp0));
        assert!(!mask.is_set(GpPin::Gp1));
    }
}
