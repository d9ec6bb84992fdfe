//! USB enumeration settings: the key parameters and descriptor strings.

use bit_field::BitField;
use log::debug;

use crate::Error;
use crate::commands::{Command, NvramParam};
use crate::constants::{USB_STRING_DESCRIPTOR_TYPE, USB_STRING_MAX};
use crate::frame::Frame;

const HOST_POWERED: usize = 7;
const SELF_POWERED: usize = 6;
const REMOTE_WAKEUP: usize = 5;

const STRING_LENGTH: usize = 4;
const STRING_DESCRIPTOR_TYPE: usize = 5;
const STRING_PAYLOAD: usize = 6;

/// Position of the USB key fields, which moves depending on the frame's command.
///
/// The Set NVRAM request packs the fields from byte 4. The Get NVRAM response places
/// them further along, with the power attributes separated from the IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbKeyLayout {
    /// Set NVRAM layout: VID 4-5, PID 6-7, power attributes 8, current 9.
    Set,
    /// Get NVRAM layout: VID 12-13, PID 14-15, power attributes 29, current 30.
    Get,
}

impl UsbKeyLayout {
    /// Select the layout from the command code in byte 0.
    ///
    /// Only a Get NVRAM response (0x61) uses the Get layout. Any other byte 0,
    /// including the zero of a frame not yet sent, selects the Set layout.
    pub fn of(frame: &Frame) -> Self {
        if frame.command_byte() == Command::NvramGet.code() {
            Self::Get
        } else {
            Self::Set
        }
    }

    const fn vendor_id(self) -> usize {
        match self {
            Self::Set => 4,
            Self::Get => 12,
        }
    }

    const fn product_id(self) -> usize {
        match self {
            Self::Set => 6,
            Self::Get => 14,
        }
    }

    const fn power(self) -> usize {
        match self {
            Self::Set => 8,
            Self::Get => 29,
        }
    }

    const fn current(self) -> usize {
        match self {
            Self::Set => 9,
            Self::Get => 30,
        }
    }
}

/// Read-only view of the USB key fields of a frame.
#[derive(Debug, Clone, Copy)]
pub struct UsbKeyView<'a> {
    frame: &'a Frame,
    layout: UsbKeyLayout,
}

/// Mutable view of the USB key fields of a frame.
#[derive(Debug)]
pub struct UsbKeyViewMut<'a> {
    frame: &'a mut Frame,
    layout: UsbKeyLayout,
}

impl UsbKeyView<'_> {
    /// Layout in use.
    pub fn layout(&self) -> UsbKeyLayout {
        self.layout
    }

    /// USB vendor ID.
    pub fn vendor_id(&self) -> u16 {
        self.frame.u16_at(self.layout.vendor_id())
    }

    /// USB product ID.
    pub fn product_id(&self) -> u16 {
        self.frame.u16_at(self.layout.product_id())
    }

    /// Raw power attributes byte.
    pub fn power_attributes(&self) -> u8 {
        self.frame.as_bytes()[self.layout.power()]
    }

    /// Host-powered flag (0x80).
    pub fn host_powered(&self) -> bool {
        self.power_attributes().get_bit(HOST_POWERED)
    }

    /// Self-powered flag (0x40).
    pub fn self_powered(&self) -> bool {
        self.power_attributes().get_bit(SELF_POWERED)
    }

    /// Remote wake-up capable flag (0x20).
    pub fn remote_wakeup(&self) -> bool {
        self.power_attributes().get_bit(REMOTE_WAKEUP)
    }

    /// Requested current in units of 2 mA.
    pub fn current_2ma(&self) -> u8 {
        self.frame.as_bytes()[self.layout.current()]
    }
}

impl UsbKeyViewMut<'_> {
    /// Layout in use.
    pub fn layout(&self) -> UsbKeyLayout {
        self.layout
    }

    /// Change the USB vendor ID.
    pub fn set_vendor_id(&mut self, vid: u16) {
        self.frame.set_u16_at(self.layout.vendor_id(), vid);
    }

    /// Change the USB product ID.
    pub fn set_product_id(&mut self, pid: u16) {
        self.frame.set_u16_at(self.layout.product_id(), pid);
    }

    /// Replace the raw power attributes byte.
    pub fn set_power_attributes(&mut self, attributes: u8) {
        self.frame.as_bytes_mut()[self.layout.power()] = attributes;
    }

    /// Change the host-powered flag.
    pub fn set_host_powered(&mut self, value: bool) {
        self.frame.as_bytes_mut()[self.layout.power()].set_bit(HOST_POWERED, value);
    }

    /// Change the self-powered flag.
    pub fn set_self_powered(&mut self, value: bool) {
        self.frame.as_bytes_mut()[self.layout.power()].set_bit(SELF_POWERED, value);
    }

    /// Change the remote wake-up capable flag.
    pub fn set_remote_wakeup(&mut self, value: bool) {
        self.frame.as_bytes_mut()[self.layout.power()].set_bit(REMOTE_WAKEUP, value);
    }

    /// Change the requested current, in units of 2 mA.
    pub fn set_current_2ma(&mut self, units: u8) {
        self.frame.as_bytes_mut()[self.layout.current()] = units;
    }
}

/// # USB key and string fields
impl Frame {
    /// View the USB key fields, with the layout chosen from byte 0.
    pub fn usb_key(&self) -> UsbKeyView<'_> {
        UsbKeyView {
            layout: UsbKeyLayout::of(self),
            frame: self,
        }
    }

    /// Mutable view of the USB key fields, with the layout chosen from byte 0.
    pub fn usb_key_mut(&mut self) -> UsbKeyViewMut<'_> {
        UsbKeyViewMut {
            layout: UsbKeyLayout::of(self),
            frame: self,
        }
    }

    /// Build a Set NVRAM USB key request from the fields of a Get NVRAM response.
    ///
    /// The fields are copied one by one; nothing else of `self` is carried over.
    pub fn usb_key_get_to_set(&self) -> Frame {
        let from = self.usb_key();
        let mut out = Frame::new();
        out.as_bytes_mut()[0] = Command::NvramSet.code();
        out.as_bytes_mut()[1] = NvramParam::UsbKey.code();
        let mut to = out.usb_key_mut();
        to.set_vendor_id(from.vendor_id());
        to.set_product_id(from.product_id());
        to.set_power_attributes(from.power_attributes());
        to.set_current_2ma(from.current_2ma());
        out
    }

    /// Number of payload bytes in a USB string descriptor.
    pub fn usb_string_len(&self) -> usize {
        (self.as_bytes()[STRING_LENGTH] as usize)
            .saturating_sub(2)
            .min(USB_STRING_MAX)
    }

    /// UTF-16LE payload of a USB string descriptor.
    pub fn usb_string(&self) -> &[u8] {
        &self.as_bytes()[STRING_PAYLOAD..STRING_PAYLOAD + self.usb_string_len()]
    }

    /// Write a UTF-16LE payload and its length.
    ///
    /// The descriptor type byte is left alone; the MCP2210 requires 0x03 there in
    /// requests.
    pub fn set_usb_string(&mut self, payload: &[u8]) -> Result<(), Error> {
        if payload.len() > USB_STRING_MAX {
            return Err(Error::StringTooLong(payload.len()));
        }
        let bytes = self.as_bytes_mut();
        bytes[STRING_PAYLOAD..STRING_PAYLOAD + payload.len()].copy_from_slice(payload);
        // Fits: at most 58 + 2.
        bytes[STRING_LENGTH] = payload.len() as u8 + 2;
        Ok(())
    }

    /// Descriptor type byte of a USB string descriptor.
    pub fn usb_string_descriptor_type(&self) -> u8 {
        self.as_bytes()[STRING_DESCRIPTOR_TYPE]
    }

    pub(crate) fn mark_usb_string_descriptor(&mut self) {
        self.as_bytes_mut()[STRING_DESCRIPTOR_TYPE] = USB_STRING_DESCRIPTOR_TYPE;
    }
}

/// USB enumeration parameters stored in NVRAM.
///
/// ## Datasheet
///
/// See section 3.1.5 (Set USB Key Parameters) and section 3.1.6 (Get USB Key
/// Parameters), table 3-19 and table 3-21.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbKeySettings {
    /// USB Vendor ID (VID).
    pub vendor_id: u16,
    /// USB Product ID (PID).
    pub product_id: u16,
    /// Host-powered power attribute.
    pub host_powered: bool,
    /// Self-powered power attribute.
    pub self_powered: bool,
    /// Remote wake-up capable power attribute.
    pub remote_wakeup: bool,
    /// Current requested from the host, in milliamps.
    ///
    /// Stored as a halved value in a single byte, so the maximum is 510 mA.
    pub requested_current_ma: u16,
}

impl UsbKeySettings {
    pub(crate) fn from_view(view: UsbKeyView<'_>) -> Self {
        Self {
            vendor_id: view.vendor_id(),
            product_id: view.product_id(),
            host_powered: view.host_powered(),
            self_powered: view.self_powered(),
            remote_wakeup: view.remote_wakeup(),
            requested_current_ma: view.current_2ma() as u16 * 2,
        }
    }
}

/// Changes to be applied to the USB key parameters.
///
/// ```rust
/// # use mcp2210_hal::settings::UsbKeySettingsChanges;
/// # fn main() -> Result<(), mcp2210_hal::Error> {
/// let mut changes = UsbKeySettingsChanges::new();
/// changes
///     .with_product_id(0xF00D)
///     .with_requested_current(250)?;
/// assert!(UsbKeySettingsChanges::new().with_requested_current(99).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct UsbKeySettingsChanges {
    vendor_id: Option<u16>,
    product_id: Option<u16>,
    host_powered: Option<bool>,
    self_powered: Option<bool>,
    remote_wakeup: Option<bool>,
    current_2ma: Option<u8>,
}

impl UsbKeySettingsChanges {
    /// Create an empty set of changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the USB vendor ID.
    pub fn with_vendor_id(&mut self, vid: u16) -> &mut Self {
        self.vendor_id = Some(vid);
        self
    }

    /// Change the USB product ID.
    pub fn with_product_id(&mut self, pid: u16) -> &mut Self {
        self.product_id = Some(pid);
        self
    }

    /// Change the host-powered attribute.
    pub fn with_host_powered(&mut self, value: bool) -> &mut Self {
        self.host_powered = Some(value);
        self
    }

    /// Change the self-powered attribute.
    pub fn with_self_powered(&mut self, value: bool) -> &mut Self {
        self.self_powered = Some(value);
        self
    }

    /// Change the remote wake-up capable attribute.
    pub fn with_remote_wakeup(&mut self, value: bool) -> &mut Self {
        self.remote_wakeup = Some(value);
        self
    }

    /// Change the current requested from the host.
    ///
    /// Must be an even number of milliamps, at most 510.
    pub fn with_requested_current(&mut self, ma: u16) -> Result<&mut Self, Error> {
        if ma % 2 != 0 || ma > 510 {
            return Err(Error::CurrentOutOfRange(ma));
        }
        self.current_2ma = Some((ma / 2) as u8);
        Ok(self)
    }

    pub(crate) fn apply(&self, mut view: UsbKeyViewMut<'_>) {
        debug!("applying USB key changes {self:?}");
        if let Some(vid) = self.vendor_id {
            view.set_vendor_id(vid);
        }
        if let Some(pid) = self.product_id {
            view.set_product_id(pid);
        }
        if let Some(value) = self.host_powered {
            view.set_host_powered(value);
        }
        if let Some(value) = self.self_powered {
            view.set_self_powered(value);
        }
        if let Some(value) = self.remote_wakeup {
            view.set_remote_wakeup(value);
        }
        if let Some(units) = self.current_2ma {
            view.set_current_2ma(units);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn get_response() -> Frame {
        let mut bytes = [0u8; 64];
        bytes[0] = 0x61;
        bytes[2] = 0x30;
        bytes[12..16].copy_from_slice(&[0xD8, 0x04, 0xDD, 0x00]);
        bytes[29] = 0x80;
        bytes[30] = 50;
        Frame::from_bytes(bytes)
    }

    #[test]
    fn layout_follows_command() {
        assert_eq!(UsbKeyLayout::of(&get_response()), UsbKeyLayout::Get);
        let mut frame = Frame::new();
        assert_eq!(UsbKeyLayout::of(&frame), UsbKeyLayout::Set);
        frame.as_bytes_mut()[0] = 0x60;
        assert_eq!(frame.usb_key().layout(), UsbKeyLayout::Set);
        // Neither a USB key request nor response.
        frame.as_bytes_mut()[0] = 0x20;
        assert_eq!(frame.usb_key().layout(), UsbKeyLayout::Set);
    }

    #[test]
    fn get_response_fields() {
        let frame = get_response();
        let key = frame.usb_key();
        assert_eq!(key.vendor_id(), 0x04D8);
        assert_eq!(key.product_id(), 0x00DD);
        assert!(key.host_powered());
        assert!(!key.self_powered());
        assert!(!key.remote_wakeup());
        assert_eq!(key.current_2ma(), 50);

        let settings = UsbKeySettings::from_view(key);
        assert_eq!(settings.requested_current_ma, 100);
    }

    #[test]
    fn remap_to_set_layout() {
        let set = get_response().usb_key_get_to_set();
        let bytes = set.as_bytes();
        assert_eq!(bytes[0], 0x60);
        assert_eq!(bytes[1], 0x30);
        assert_eq!(&bytes[4..10], &[0xD8, 0x04, 0xDD, 0x00, 0x80, 50]);
        assert!(bytes[10..].iter().all(|b| *b == 0));

        let key = set.usb_key();
        assert_eq!(key.layout(), UsbKeyLayout::Set);
        assert_eq!((key.vendor_id(), key.product_id()), (0x04D8, 0x00DD));
    }

    #[test]
    fn changes_apply_in_either_layout() {
        let mut changes = UsbKeySettingsChanges::new();
        changes
            .with_vendor_id(0x1234)
            .with_self_powered(true)
            .with_host_powered(false)
            .with_requested_current(510)
            .unwrap();

        let mut get = get_response();
        changes.apply(get.usb_key_mut());
        assert_eq!(&get.as_bytes()[12..14], &[0x34, 0x12]);
        assert_eq!(get.as_bytes()[29], 0x40);
        assert_eq!(get.as_bytes()[30], 255);

        let mut set = get_response().usb_key_get_to_set();
        changes.apply(set.usb_key_mut());
        assert_eq!(&set.as_bytes()[4..10], &[0x34, 0x12, 0xDD, 0x00, 0x40, 255]);
    }

    #[test]
    fn current_validation() {
        let mut changes = UsbKeySettingsChanges::new();
        assert!(matches!(
            changes.with_requested_current(511),
            Err(Error::CurrentOutOfRange(511))
        ));
        assert!(changes.with_requested_current(512).is_err());
        assert!(changes.with_requested_current(0).is_ok());
    }

    #[test]
    fn usb_string_length_byte() {
        let mut frame = Frame::new();
        frame.set_usb_string(&[b'a', 0, b'b', 0]).unwrap();
        assert_eq!(frame.as_bytes()[4], 6);
        assert_eq!(frame.usb_string_len(), 4);
        assert_eq!(frame.usb_string(), &[b'a', 0, b'b', 0]);

        assert!(matches!(
            frame.set_usb_string(&[0; 59]),
            Err(Error::StringTooLong(59))
        ));
        frame.set_usb_string(&[0x55; 58]).unwrap();
        assert_eq!(frame.as_bytes()[4], 60);
        assert_eq!(frame.usb_string().len(), 58);
    }

    #[test]
    fn short_length_byte_reads_empty() {
        let mut frame = Frame::new();
        frame.as_bytes_mut()[4] = 1;
        assert_eq!(frame.usb_string_len(), 0);
        assert!(frame.usb_string().is_empty());
    }
}
