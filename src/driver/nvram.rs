use embedded_hal::delay::DelayNs;

use super::MCP2210;
use crate::commands::{Command, NvramParam};
use crate::error::Error;
use crate::frame::Frame;
use crate::settings::{DeviceString, UsbKeySettings, UsbKeySettingsChanges};
use crate::transport::HidTransport;

impl<D: HidTransport, T: DelayNs> MCP2210<D, T> {
    ////////////////////////////////////////////////////////////////////////////////
    // USB key parameters
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the USB vendor and product IDs and power settings used at enumeration.
    ///
    /// # Datasheet
    ///
    /// See section 3.1.6 (Get USB Key Parameters).
    pub fn read_usb_key(&mut self) -> Result<UsbKeySettings, Error> {
        let mut frame = Frame::new();
        self.sub_exchange(&mut frame, Command::NvramGet, NvramParam::UsbKey)?;
        Ok(UsbKeySettings::from_view(frame.usb_key()))
    }

    /// Change the USB key parameters.
    ///
    /// The parameters are read first and moved into the Set layout, so fields
    /// without a requested change keep their value. The changes take effect when the
    /// MCP2210 next enumerates.
    ///
    /// <div class="warning">
    ///
    /// After changing the vendor or product ID you will need to open the device
    /// with the new IDs.
    ///
    /// </div>
    ///
    /// # Datasheet
    ///
    /// See section 3.1.5 (Set USB Key Parameters).
    pub fn change_usb_key(&mut self, changes: &UsbKeySettingsChanges) -> Result<(), Error> {
        let mut frame = Frame::new();
        self.sub_exchange(&mut frame, Command::NvramGet, NvramParam::UsbKey)?;
        let mut set = frame.usb_key_get_to_set();
        changes.apply(set.usb_key_mut());
        self.sub_exchange(&mut set, Command::NvramSet, NvramParam::UsbKey)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // USB descriptor strings
    ////////////////////////////////////////////////////////////////////////////////

    fn read_usb_string(&mut self, param: NvramParam) -> Result<DeviceString, Error> {
        let mut frame = Frame::new();
        self.sub_exchange(&mut frame, Command::NvramGet, param)?;
        DeviceString::from_utf16_bytes(frame.usb_string())
    }

    fn write_usb_string(&mut self, param: NvramParam, s: &DeviceString) -> Result<(), Error> {
        let mut frame = Frame::new();
        frame.mark_usb_string_descriptor();
        frame.set_usb_string(&s.to_utf16_bytes())?;
        self.sub_exchange(&mut frame, Command::NvramSet, param)
    }

    /// Read the USB product string.
    ///
    /// # Datasheet
    ///
    /// See section 3.1.8 (Get USB Product Name).
    pub fn read_usb_product(&mut self) -> Result<DeviceString, Error> {
        self.read_usb_string(NvramParam::ProductName)
    }

    /// Change the USB product string.
    ///
    /// # Datasheet
    ///
    /// See section 3.1.7 (Set USB Product Name).
    pub fn change_usb_product(&mut self, product: &DeviceString) -> Result<(), Error> {
        self.write_usb_string(NvramParam::ProductName, product)
    }

    /// Read the USB manufacturer string.
    ///
    /// # Datasheet
    ///
    /// See section 3.1.10 (Get USB Manufacturer Name).
    pub fn read_usb_manufacturer(&mut self) -> Result<DeviceString, Error> {
        self.read_usb_string(NvramParam::ManufacturerName)
    }

    /// Change the USB manufacturer string.
    ///
    /// # Datasheet
    ///
    /// See section 3.1.9 (Set USB Manufacturer Name).
    pub fn change_usb_manufacturer(&mut self, manufacturer: &DeviceString) -> Result<(), Error> {
        self.write_usb_string(NvramParam::ManufacturerName, manufacturer)
    }
}

#[cfg(test)]
mod test {
    use crate::driver::mock::{Reply, driver};
    use crate::settings::{DeviceString, UsbKeySettingsChanges};

    #[test]
    fn usb_key_round_trip_through_set_layout() {
        let mut mcp = driver([
            Reply::ok(0x61, |b| {
                b[2] = 0x30;
                b[12..16].copy_from_slice(&[0xD8, 0x04, 0xDD, 0x00]);
                b[29] = 0x80;
                b[30] = 50;
                b[40] = 0x99;
            }),
            Reply::ok(0x60, |b| b[2] = 0x30),
        ]);
        let mut changes = UsbKeySettingsChanges::new();
        changes.with_remote_wakeup(true);
        mcp.change_usb_key(&changes).unwrap();

        let set = &mcp.requests()[1];
        assert_eq!(&set[..2], &[0x60, 0x30]);
        assert_eq!(&set[4..10], &[0xD8, 0x04, 0xDD, 0x00, 0xA0, 50]);
        assert!(set[10..].iter().all(|b| *b == 0));
    }

    #[test]
    fn read_usb_key() {
        let mut mcp = driver([Reply::ok(0x61, |b| {
            b[2] = 0x30;
            b[12..16].copy_from_slice(&[0xD8, 0x04, 0xDE, 0x00]);
            b[29] = 0x40;
            b[30] = 250;
        })]);
        let key = mcp.read_usb_key().unwrap();
        assert_eq!(key.vendor_id, 0x04D8);
        assert_eq!(key.product_id, 0x00DE);
        assert!(key.self_powered);
        assert!(!key.host_powered);
        assert_eq!(key.requested_current_ma, 500);
    }

    #[test]
    fn product_string() {
        let mut mcp = driver([
            Reply::ok(0x60, |b| b[2] = 0x40),
            Reply::ok(0x61, |b| {
                b[2] = 0x40;
                b[4] = 8;
                b[5] = 0x03;
                b[6..12].copy_from_slice(&[b'S', 0, b'P', 0, b'I', 0]);
            }),
        ]);
        let product: DeviceString = "Hub".parse().unwrap();
        mcp.change_usb_product(&product).unwrap();
        assert_eq!(mcp.read_usb_product().unwrap().as_str(), "SPI");

        let set = &mcp.requests()[0];
        assert_eq!(&set[..2], &[0x60, 0x40]);
        assert_eq!(&set[4..12], &[8, 0x03, b'H', 0, b'u', 0, b'b', 0]);
    }

    #[test]
    fn manufacturer_string_uses_own_subcommand() {
        let mut mcp = driver([Reply::ok(0x61, |b| {
            b[2] = 0x50;
            b[4] = 2;
        })]);
        assert_eq!(mcp.read_usb_manufacturer().unwrap().as_str(), "");
        assert_eq!(mcp.requests()[0][1], 0x50);
    }
}
