use crate::NumberingScheme;
use std::path::PathBuf;
use std::time::Duration;

/// LED line, BCM numbering. Physical header pin 11.
pub const LED_PIN: u8 = 17;
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";
pub const DEFAULT_CONSUMER: &str = "blinky";
/// Time each level is held before the next write.
pub const HALF_PERIOD: Duration = Duration::from_secs(1);

/// Everything the pin controller needs to know about its line.
#[derive(Clone, Debug)]
pub struct BlinkConfig {
    pub chip: PathBuf,
    pub consumer: String,
    pub pin: u8,
    pub scheme: NumberingScheme,
    pub half_period: Duration,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            chip: PathBuf::from(DEFAULT_CHIP),
            consumer: DEFAULT_CONSUMER.to_owned(),
            pin: LED_PIN,
            scheme: NumberingScheme::Chip,
            half_period: HALF_PERIOD,
        }
    }
}
