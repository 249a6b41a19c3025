use crate::{Error, Result};
use embedded_hal::digital::{self, PinState};
use gpiocdev::Request;
use gpiocdev::line::{Offset, Value};
use std::ops::Not;
use std::path::{Path, PathBuf};

/// Electrical level of an output line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Low = 0,
    High = 1,
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => PinState::Low,
            Level::High => PinState::High,
        }
    }
}

impl From<Level> for Value {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => Value::Inactive,
            Level::High => Value::Active,
        }
    }
}

/// How a pin identifier is interpreted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NumberingScheme {
    /// Line offset on the GPIO controller (BCM numbering on a Raspberry Pi).
    #[default]
    Chip,
    /// Physical position on the 40-pin header.
    Connector,
}

/// Lowest and highest BCM line usable as a general purpose output. Lines 0
/// and 1 carry the HAT ID EEPROM bus.
pub const LOWEST_GPIO_LINE: u8 = 2;
pub const HIGHEST_GPIO_LINE: u8 = 27;

// (physical header pin, BCM line)
const HEADER: [(u8, u8); 26] = [
    (3, 2),
    (5, 3),
    (7, 4),
    (8, 14),
    (10, 15),
    (11, 17),
    (12, 18),
    (13, 27),
    (15, 22),
    (16, 23),
    (18, 24),
    (19, 10),
    (21, 9),
    (22, 25),
    (23, 11),
    (24, 8),
    (26, 7),
    (29, 5),
    (31, 6),
    (32, 12),
    (33, 13),
    (35, 19),
    (36, 16),
    (37, 26),
    (38, 20),
    (40, 21),
];

impl NumberingScheme {
    /// Translate `pin` into a chip line offset.
    ///
    /// Only BCM lines `LOWEST_GPIO_LINE..=HIGHEST_GPIO_LINE` are accepted.
    pub fn resolve(self, pin: u8) -> Result<Offset> {
        let line = match self {
            NumberingScheme::Chip => pin,
            NumberingScheme::Connector => HEADER
                .iter()
                .find(|(physical, _)| *physical == pin)
                .map(|(_, line)| *line)
                .ok_or(Error::InvalidPin(pin))?,
        };

        if (LOWEST_GPIO_LINE..=HIGHEST_GPIO_LINE).contains(&line) {
            Ok(Offset::from(line))
        } else {
            Err(Error::InvalidPin(pin))
        }
    }
}

/// A GPIO controller able to hand out exclusive output lines.
pub trait GpioChip {
    type Line: OutputLine;

    /// Claim `offset` as an output driven to `initial`.
    fn claim_output(&mut self, offset: Offset, initial: Level) -> Result<Self::Line>;
}

/// A claimed output line.
///
/// Dropping the line returns it to the kernel; `release` does the same but
/// reports failures.
pub trait OutputLine: digital::OutputPin<Error = Error> {
    fn offset(&self) -> Offset;

    fn release(self) -> Result<()>;
}

/// GPIO controller exposed through the Linux character device.
pub struct CdevChip {
    path: PathBuf,
    consumer: String,
}

impl CdevChip {
    pub fn new(path: impl AsRef<Path>, consumer: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            consumer: consumer.to_owned(),
        }
    }
}

impl GpioChip for CdevChip {
    type Line = CdevLine;

    fn claim_output(&mut self, offset: Offset, initial: Level) -> Result<CdevLine> {
        let request = Request::builder()
            .on_chip(&self.path)
            .with_consumer(self.consumer.as_str())
            .with_line(offset)
            .as_output(initial.into())
            .request()
            .map_err(|e| Error::HardwareAccess {
                offset,
                reason: e.to_string(),
            })?;

        tracing::info!("claimed {}:{} as output", self.path.display(), offset);

        Ok(CdevLine { request, offset })
    }
}

pub struct CdevLine {
    request: Request,
    offset: Offset,
}

impl CdevLine {
    /// Line set state
    pub fn blocking_set_state(&mut self, level: Level) -> Result<()> {
        self.request.set_value(self.offset, level.into())?;
        Ok(())
    }
}

impl digital::ErrorType for CdevLine {
    type Error = Error;
}

impl digital::OutputPin for CdevLine {
    fn set_low(&mut self) -> std::result::Result<(), Self::Error> {
        self.blocking_set_state(Level::Low)
    }

    fn set_high(&mut self) -> std::result::Result<(), Self::Error> {
        self.blocking_set_state(Level::High)
    }
}

impl OutputLine for CdevLine {
    fn offset(&self) -> Offset {
        self.offset
    }

    fn release(self) -> Result<()> {
        // closing the request fd hands the line back to the kernel
        drop(self.request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_inverts() {
        assert_eq!(!Level::Low, Level::High);
        assert_eq!(!Level::High, Level::Low);
    }

    #[test]
    fn chip_scheme_is_identity() {
        assert_eq!(NumberingScheme::Chip.resolve(17).unwrap(), 17);
        assert_eq!(NumberingScheme::Chip.resolve(2).unwrap(), 2);
        assert_eq!(NumberingScheme::Chip.resolve(27).unwrap(), 27);
    }

    #[test]
    fn chip_scheme_rejects_lines_outside_gpio_range() {
        for pin in [0, 1, 28, 53, 200, u8::MAX] {
            assert!(matches!(
                NumberingScheme::Chip.resolve(pin),
                Err(Error::InvalidPin(p)) if p == pin
            ));
        }
    }

    #[test]
    fn connector_scheme_maps_header_pins() {
        assert_eq!(NumberingScheme::Connector.resolve(11).unwrap(), 17);
        assert_eq!(NumberingScheme::Connector.resolve(3).unwrap(), 2);
        assert_eq!(NumberingScheme::Connector.resolve(40).unwrap(), 21);
    }

    #[test]
    fn connector_scheme_rejects_power_and_ground() {
        for pin in [1, 2, 4, 6, 9, 14, 17, 20, 25, 30, 34, 39, 41] {
            assert!(matches!(
                NumberingScheme::Connector.resolve(pin),
                Err(Error::InvalidPin(p)) if p == pin
            ));
        }
    }

    #[test]
    fn connector_scheme_rejects_id_eeprom_pins() {
        for pin in [27, 28] {
            assert!(matches!(
                NumberingScheme::Connector.resolve(pin),
                Err(Error::InvalidPin(p)) if p == pin
            ));
        }
    }

    #[test]
    fn every_header_entry_resolves() {
        for (physical, line) in HEADER {
            assert_eq!(NumberingScheme::Connector.resolve(physical).unwrap(), Offset::from(line));
        }
    }

    #[test]
    fn claim_on_missing_chip_is_hardware_access_error() {
        let mut chip = CdevChip::new("/dev/does-not-exist-gpiochip", "blinky-test");
        let err = chip.claim_output(17, Level::Low).err().unwrap();
        assert!(matches!(err, Error::HardwareAccess { offset: 17, .. }));
    }
}
