use embedded_hal::digital;
use thiserror::Error;

mod cancel;
mod config;
mod controller;
mod delay;
mod gpio;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use cancel::{CancellationToken, cancel_on_interrupt};
pub use config::{BlinkConfig, DEFAULT_CHIP, DEFAULT_CONSUMER, HALF_PERIOD, LED_PIN};
pub use controller::{PinController, State};
pub use delay::Delay;
pub use gpio::{CdevChip, CdevLine, GpioChip, HIGHEST_GPIO_LINE, LOWEST_GPIO_LINE, Level, NumberingScheme, OutputLine};

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot claim GPIO line {offset}: {reason}")]
    HardwareAccess { offset: u32, reason: String },
    #[error("gpio error: {0}")]
    Gpio(#[from] gpiocdev::Error),
    #[error("pin {0} is not a usable GPIO line")]
    InvalidPin(u8),
    #[error("pin controller is not initialized")]
    NotInitialized,
    #[error("pin controller is already initialized")]
    AlreadyInitialized,
    #[error("pin controller has been released")]
    Released,
}

pub type Result<T> = std::result::Result<T, Error>;

impl digital::Error for Error {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}
