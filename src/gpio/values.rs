use super::{GpPin, GpioDirection, LogicLevel, PinMask};
use crate::frame::Frame;

/// Offset of the pin bitmask in the GPIO value and direction reports.
const GPIO_PINS: usize = 4;

/// # GPIO value and direction fields
///
/// Use with the Get/Set GPIO Value and Get/Set GPIO Direction commands, which share
/// one layout: a pin bitmask at bytes 4 and 5.
impl Frame {
    /// Bit for `pin` in a GPIO value or direction report.
    pub fn gpio_pin(&self, pin: GpPin) -> bool {
        self.pin_bit(GPIO_PINS, pin)
    }

    /// Change the bit for `pin` in a GPIO value or direction report.
    pub fn set_gpio_pin(&mut self, pin: GpPin, value: bool) {
        self.set_pin_bit(GPIO_PINS, pin, value);
    }

    /// Whole pin bitmask of a GPIO value or direction report.
    pub fn gpio_pins(&self) -> PinMask {
        self.pin_mask(GPIO_PINS)
    }

    /// Replace the pin bitmask of a GPIO value or direction report.
    pub fn set_gpio_pins(&mut self, mask: PinMask) {
        self.set_pin_mask(GPIO_PINS, mask);
    }
}

/// Levels and directions of the GP pins.
///
/// Every pin has a level and a direction bit, even if it is not designated for GPIO.
/// For inputs the level is the value read on the pin, for outputs it is the level
/// being driven.
///
/// ## Datasheet
///
/// See sections 3.2.6 (Get GPIO Current Pin Value) and 3.2.8 (Get GPIO Current Pin
/// Direction) for the underlying HID commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioState {
    /// Pin levels, set bits are high.
    pub levels: PinMask,
    /// Pin directions, set bits are inputs.
    pub directions: PinMask,
}

impl GpioState {
    /// Logic level of `pin`.
    pub fn level(&self, pin: GpPin) -> LogicLevel {
        self.levels.is_set(pin).into()
    }

    /// Direction of `pin`.
    pub fn direction(&self, pin: GpPin) -> GpioDirection {
        self.directions.is_set(pin).into()
    }
}

/// Changes to make to GPIO pin levels and directions.
///
/// This offers a builder-like interface where pins that are not mentioned are left
/// unchanged. Applying the changes reads the current value and direction reports,
/// changes the requested bits, and writes the reports back.
///
/// As with the MCP2210 itself, you can set the level of an input pin. It takes effect
/// once the pin becomes an output.
#[derive(Debug, Default, Clone, Copy)]
pub struct GpioChanges {
    levels: [Option<LogicLevel>; 9],
    directions: [Option<GpioDirection>; 9],
}

impl GpioChanges {
    /// Create a struct with no pending changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logic level of `pin`.
    pub fn with_level(&mut self, pin: GpPin, level: LogicLevel) -> &mut Self {
        self.levels[pin.number() as usize] = Some(level);
        self
    }

    /// Set the direction of `pin`.
    pub fn with_direction(&mut self, pin: GpPin, direction: GpioDirection) -> &mut Self {
        self.directions[pin.number() as usize] = Some(direction);
        self
    }

    /// Configure `pin` as an output driving `level`.
    pub fn with_output(&mut self, pin: GpPin, level: LogicLevel) -> &mut Self {
        self.with_level(pin, level)
            .with_direction(pin, GpioDirection::Output)
    }

    pub(crate) fn changes_levels(&self) -> bool {
        self.levels.iter().any(Option::is_some)
    }

    pub(crate) fn changes_directions(&self) -> bool {
        self.directions.iter().any(Option::is_some)
    }

    /// Write the level changes into a previously read GPIO value report.
    pub(crate) fn apply_levels(&self, frame: &mut Frame) {
        for (pin, level) in GpPin::ALL.into_iter().zip(self.levels) {
            if let Some(level) = level {
                frame.set_gpio_pin(pin, level.into());
            }
        }
    }

    /// Write the direction changes into a previously read GPIO direction report.
    pub(crate) fn apply_directions(&self, frame: &mut Frame) {
        for (pin, direction) in GpPin::ALL.into_iter().zip(self.directions) {
            if let Some(direction) = direction {
                frame.set_gpio_pin(pin, direction.into());
            }
        }
    }
}
