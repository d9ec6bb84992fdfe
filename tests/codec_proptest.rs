//! Property-based tests for the report field accessors.
//!
//! Frames are generated as 64 arbitrary bytes, so every accessor is exercised
//! against whatever surrounds its field.

use mcp2210_hal::Frame;
use mcp2210_hal::constants::{PACKET_SIZE, USB_STRING_MAX};
use mcp2210_hal::gpio::GpPin;
use mcp2210_hal::settings::{DeviceString, SpiDelay, UsbKeyLayout};
use proptest::prelude::*;

/// Any 64-byte report.
fn frame_strategy() -> impl Strategy<Value = Frame> {
    prop::collection::vec(any::<u8>(), PACKET_SIZE).prop_map(|bytes| {
        let bytes: [u8; PACKET_SIZE] = bytes.try_into().unwrap();
        Frame::from_bytes(bytes)
    })
}

/// Any GP pin.
fn pin_strategy() -> impl Strategy<Value = GpPin> {
    prop::sample::select(GpPin::ALL.to_vec())
}

/// Any report whose byte 0 selects the given USB key layout.
fn usb_key_frame(get: bool) -> impl Strategy<Value = Frame> {
    frame_strategy().prop_map(move |mut frame| {
        frame.as_bytes_mut()[0] = if get { 0x61 } else { 0x60 };
        frame
    })
}

proptest! {
    /// Setting one pin bit changes that pin only.
    #[test]
    fn pin_bit_touches_only_its_pin(
        mut frame in frame_strategy(),
        pin in pin_strategy(),
        value in any::<bool>(),
    ) {
        let before = frame.clone();
        frame.set_gpio_pin(pin, value);
        prop_assert_eq!(frame.gpio_pin(pin), value);
        for other in GpPin::ALL.into_iter().filter(|p| *p != pin) {
            prop_assert_eq!(frame.gpio_pin(other), before.gpio_pin(other));
        }
        // Only the pin mask bytes may differ.
        let (a, b) = (frame.as_bytes(), before.as_bytes());
        prop_assert_eq!(&a[..4], &b[..4]);
        prop_assert_eq!(&a[6..], &b[6..]);
    }

    /// Writing back every SPI field as read leaves the report unchanged.
    #[test]
    fn spi_fields_write_back_unchanged(mut frame in frame_strategy()) {
        let before = frame.clone();
        frame.set_spi_bit_rate(frame.spi_bit_rate());
        for pin in GpPin::ALL {
            frame.set_spi_idle_cs(pin, frame.spi_idle_cs(pin));
            frame.set_spi_active_cs(pin, frame.spi_active_cs(pin));
        }
        frame.set_spi_cs_to_data_delay(frame.spi_cs_to_data_delay());
        frame.set_spi_data_to_cs_delay(frame.spi_data_to_cs_delay());
        frame.set_spi_byte_delay(frame.spi_byte_delay());
        frame.set_spi_transaction_size(frame.spi_transaction_size());
        frame.set_spi_mode(frame.spi_mode());
        prop_assert_eq!(frame, before);
    }

    /// Writing back every chip field as read leaves the report unchanged.
    #[test]
    fn chip_fields_write_back_unchanged(mut frame in frame_strategy()) {
        let before = frame.clone();
        for pin in GpPin::ALL {
            frame.set_chip_pin_function(pin, frame.chip_pin_function(pin));
            frame.set_chip_default_output(pin, frame.chip_default_output(pin));
            frame.set_chip_default_direction(pin, frame.chip_default_direction(pin));
        }
        frame.set_chip_remote_wakeup(frame.chip_remote_wakeup());
        frame.set_chip_gp6_mode(frame.chip_gp6_mode());
        frame.set_chip_no_spi_release(frame.chip_no_spi_release());
        frame.set_chip_access_control(frame.chip_access_control());
        frame.set_chip_password(&frame.chip_password());
        prop_assert_eq!(frame, before);
    }

    /// The flags in byte 17 are independent of each other.
    #[test]
    fn chip_flag_byte_fields_are_independent(
        mut frame in frame_strategy(),
        wakeup in any::<bool>(),
        mode in 0u8..8,
        no_release in any::<bool>(),
    ) {
        frame.set_chip_gp6_mode(mode);
        frame.set_chip_remote_wakeup(wakeup);
        frame.set_chip_no_spi_release(no_release);
        prop_assert_eq!(frame.chip_gp6_mode(), mode);
        prop_assert_eq!(frame.chip_remote_wakeup(), wakeup);
        prop_assert_eq!(frame.chip_no_spi_release(), no_release);
    }

    /// USB key fields land where the layout for byte 0 puts them.
    #[test]
    fn usb_key_fields_follow_layout(
        mut frame in prop_oneof![usb_key_frame(true), usb_key_frame(false)],
        vid in any::<u16>(),
        pid in any::<u16>(),
        current in any::<u8>(),
    ) {
        let get = frame.command_byte() == 0x61;
        {
            let mut key = frame.usb_key_mut();
            key.set_vendor_id(vid);
            key.set_product_id(pid);
            key.set_current_2ma(current);
        }
        let (vid_at, pid_at, current_at) = if get { (12, 14, 30) } else { (4, 6, 9) };
        let bytes = frame.as_bytes();
        prop_assert_eq!(u16::from_le_bytes([bytes[vid_at], bytes[vid_at + 1]]), vid);
        prop_assert_eq!(u16::from_le_bytes([bytes[pid_at], bytes[pid_at + 1]]), pid);
        prop_assert_eq!(bytes[current_at], current);
        let expected = if get { UsbKeyLayout::Get } else { UsbKeyLayout::Set };
        prop_assert_eq!(frame.usb_key().layout(), expected);
    }

    /// Converting a Get response to a Set request keeps the USB key fields.
    #[test]
    fn usb_key_get_to_set_keeps_fields(frame in usb_key_frame(true)) {
        let set = frame.usb_key_get_to_set();
        let (from, to) = (frame.usb_key(), set.usb_key());
        prop_assert_eq!(to.layout(), UsbKeyLayout::Set);
        prop_assert_eq!(to.vendor_id(), from.vendor_id());
        prop_assert_eq!(to.product_id(), from.product_id());
        prop_assert_eq!(to.power_attributes(), from.power_attributes());
        prop_assert_eq!(to.current_2ma(), from.current_2ma());
        prop_assert_eq!(&set.as_bytes()[..2], &[0x60, 0x30]);
        prop_assert!(set.as_bytes()[10..].iter().all(|b| *b == 0));
    }

    /// The length byte always covers the payload plus two header bytes.
    #[test]
    fn usb_string_length_byte(
        mut frame in frame_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..=USB_STRING_MAX),
    ) {
        let before = frame.clone();
        frame.set_usb_string(&payload).unwrap();
        prop_assert_eq!(frame.as_bytes()[4] as usize, payload.len() + 2);
        prop_assert_eq!(frame.usb_string(), payload.as_slice());
        prop_assert_eq!(frame.usb_string_descriptor_type(), before.usb_string_descriptor_type());
        let end = 6 + payload.len();
        prop_assert_eq!(&frame.as_bytes()[end..], &before.as_bytes()[end..]);
    }

    /// Over-long payloads are refused without touching the report.
    #[test]
    fn usb_string_too_long_is_refused(
        mut frame in frame_strategy(),
        payload in prop::collection::vec(any::<u8>(), USB_STRING_MAX + 1..200),
    ) {
        let before = frame.clone();
        prop_assert!(frame.set_usb_string(&payload).is_err());
        prop_assert_eq!(frame, before);
    }

    /// Device strings fit the descriptor exactly when their UTF-16 form does.
    #[test]
    fn device_string_length_limit(s in "\\PC{0,40}") {
        let utf16_len = s.encode_utf16().count() * 2;
        match s.parse::<DeviceString>() {
            Ok(string) => {
                prop_assert!(utf16_len <= USB_STRING_MAX);
                prop_assert_eq!(string.to_utf16_bytes().len(), utf16_len);
                prop_assert_eq!(string.as_str(), s.as_str());
            }
            Err(_) => prop_assert!(utf16_len > USB_STRING_MAX),
        }
    }

    /// Delays given in whole hundreds of microseconds are exact.
    #[test]
    fn spi_delay_from_micros(units in any::<u16>(), extra in 1u32..100) {
        let micros = u32::from(units) * 100;
        let delay = SpiDelay::from_micros(micros).unwrap();
        prop_assert_eq!(delay.units(), units);
        prop_assert_eq!(delay.as_micros(), micros);
        prop_assert!(SpiDelay::from_micros(micros + extra).is_err());
    }
}
