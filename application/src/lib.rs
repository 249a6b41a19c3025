use blinky::{BlinkConfig, CancellationToken, CdevChip, Delay, PinController, cancel_on_interrupt};
use clap::Parser;
use color_eyre::Result;

#[derive(Parser, Debug)]
#[command(
    name = "blinky",
    about = "Blink an LED on BCM GPIO 17 until interrupted",
    long_about = "Blink an LED on BCM GPIO 17 (header pin 11) once a second.\n\n\
                  Press Ctrl-C or send SIGTERM to stop; the line is driven low \
                  and released before exiting. Set RUST_LOG to see progress.",
    version
)]
pub struct Cli {}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let config = BlinkConfig::default();

        let token = CancellationToken::new();
        cancel_on_interrupt(&token);

        let chip = CdevChip::new(&config.chip, &config.consumer);
        let mut delay = Delay::new(token.clone());
        let mut pin = PinController::new(chip, config);

        let writes = pin.run(&mut delay, &token)?;
        tracing::info!("stopped after {} writes", writes);

        Ok(())
    }
}
