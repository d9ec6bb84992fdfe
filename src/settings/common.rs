//! Utility types shared by the settings.

use crate::Error;
use crate::constants::{PASSWORD_LEN, USB_STRING_MAX};

/// String limited to 29 UTF-16 code units.
///
/// The product and manufacturer strings stored in the MCP2210 NVRAM (used during USB
/// enumeration) are limited to 58 bytes of UTF-16-encoded text.
///
/// Create a `DeviceString` by calling [`str::parse`] on a string slice, or
/// [`DeviceString::try_from`] with an owned `String`.
///
/// ```rust
/// # use mcp2210_hal::settings::DeviceString;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manufacturer: DeviceString = "Acme Widgets Company (UK)".parse()?;
///
/// let product = String::from("SPI Sensor Bridge v2");
/// let product: DeviceString = product.try_into()?;
/// # Ok(())
/// # }
/// ```
///
/// Some characters require two UTF-16 code units (4 bytes).
///
/// ```rust
/// # use mcp2210_hal::settings::DeviceString;
/// let name = "4 bytes each: 🫐🫑🫒🫓🫔🫕🫖🫗🫘";
/// let result: Result<DeviceString, _> = name.parse();
/// assert!(result.is_err(), "More than 58 bytes when UTF-16 encoded.");
/// ```
///
/// ## Datasheet
///
/// See sections 3.1.7 and 3.1.8 (Set/Get USB Product Name) and 3.1.9 and 3.1.10
/// (Set/Get USB Manufacturer Name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceString(String);

impl DeviceString {
    /// The string as UTF-16 little-endian bytes, as stored on the device.
    pub fn to_utf16_bytes(&self) -> Vec<u8> {
        self.0.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    /// Decode a UTF-16 little-endian payload read from the device.
    pub(crate) fn from_utf16_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units)
            .map(Self)
            .map_err(Error::InvalidStringFromDevice)
    }

    /// The string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DeviceString {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let n_bytes = value.encode_utf16().count() * 2;
        if n_bytes <= USB_STRING_MAX {
            Ok(Self(value))
        } else {
            Err(Error::StringTooLong(n_bytes))
        }
    }
}

impl std::str::FromStr for DeviceString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl std::fmt::Display for DeviceString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A delay stored by the MCP2210 in units of 100 µs.
///
/// Used for the chip-select to data, data to chip-select, and between-byte delays of
/// an SPI transaction. The maximum delay is 65,535 units, just over 6.5 seconds.
///
/// ```rust
/// # use mcp2210_hal::settings::SpiDelay;
/// let delay = SpiDelay::from_micros(1_500).unwrap();
/// assert_eq!(delay.units(), 15);
/// assert!(SpiDelay::from_micros(150).is_err());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpiDelay(u16);

impl SpiDelay {
    /// No delay.
    pub const ZERO: SpiDelay = SpiDelay(0);

    /// Create a delay from a number of microseconds.
    ///
    /// Fails if `micros` is not an exact multiple of 100, or if the number of 100 µs
    /// units does not fit in 16 bits.
    pub fn from_micros(micros: u32) -> Result<Self, Error> {
        if micros % 100 != 0 {
            return Err(Error::DelayNotMultipleOf100us(micros));
        }
        u16::try_from(micros / 100)
            .map(Self)
            .map_err(|_| Error::DelayOutOfRange(micros))
    }

    /// Create a delay from the raw number of 100 µs units.
    pub const fn from_units(units: u16) -> Self {
        Self(units)
    }

    /// Raw number of 100 µs units.
    pub const fn units(self) -> u16 {
        self.0
    }

    /// The delay in microseconds.
    pub const fn as_micros(self) -> u32 {
        self.0 as u32 * 100
    }
}

/// Eight-byte password protecting the chip settings.
///
/// Passwords shorter than 8 bytes are padded with zeroes.
///
/// ## Datasheet
///
/// See section 1.5.1 (Chip Settings Protection) and section 3.1.16 (Send Access
/// Password).
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Password([u8; PASSWORD_LEN]);

impl Password {
    /// Create a password from raw bytes, padding with zeroes up to 8 bytes.
    pub fn new(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() > PASSWORD_LEN {
            return Err(Error::PasswordTooLong(bytes.len()));
        }
        let mut password = [0u8; PASSWORD_LEN];
        password[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(password))
    }

    /// The padded password bytes.
    pub fn as_bytes(&self) -> &[u8; PASSWORD_LEN] {
        &self.0
    }
}

impl From<[u8; PASSWORD_LEN]> for Password {
    fn from(value: [u8; PASSWORD_LEN]) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for Password {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.as_bytes())
    }
}

// Keep passwords out of logs.
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(..)")
    }
}
