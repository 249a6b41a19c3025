use crate::{BlinkConfig, CancellationToken, Error, GpioChip, Level, OutputLine, Result};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use std::time::Duration;

/// Lifecycle of the controlled line.
///
/// `Uninitialized → OutputLow → {OutputHigh ⇄ OutputLow} → Released`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Uninitialized,
    OutputLow,
    OutputHigh,
    Released,
}

/// Owns one output line and blinks it.
///
/// The controller is also the scope guard for the line: dropping it while the
/// line is still claimed drives the line low and releases it.
pub struct PinController<C: GpioChip> {
    chip: C,
    config: BlinkConfig,
    line: Option<C::Line>,
    state: State,
}

impl<C: GpioChip> PinController<C> {
    pub fn new(chip: C, config: BlinkConfig) -> Self {
        Self {
            chip,
            config,
            line: None,
            state: State::Uninitialized,
        }
    }

    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Level last driven on the line. A released line was left low.
    pub fn level(&self) -> Option<Level> {
        match self.state {
            State::Uninitialized => None,
            State::OutputLow | State::Released => Some(Level::Low),
            State::OutputHigh => Some(Level::High),
        }
    }

    /// Claim the line as an output and drive it low.
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            State::Uninitialized => {}
            State::OutputLow | State::OutputHigh => return Err(Error::AlreadyInitialized),
            State::Released => return Err(Error::Released),
        }

        let offset = self.config.scheme.resolve(self.config.pin)?;
        let mut line = self.chip.claim_output(offset, Level::Low)?;
        line.set_low()?;

        self.line = Some(line);
        self.state = State::OutputLow;

        Ok(())
    }

    fn write(&mut self, level: Level) -> Result<()> {
        let line = self.line.as_mut().ok_or(Error::NotInitialized)?;
        line.set_state(level.into())?;

        tracing::debug!("line {} {:?}", line.offset(), level);

        self.state = match level {
            Level::Low => State::OutputLow,
            Level::High => State::OutputHigh,
        };

        Ok(())
    }

    /// Toggle the line every half period until `token` is cancelled.
    ///
    /// Each write is followed by one `delay` wait. The token is checked
    /// before every write, so a wait that ends because of cancellation is
    /// never followed by another write. Returns the number of levels written.
    pub fn drive<D: DelayNs>(&mut self, delay: &mut D, token: &CancellationToken) -> Result<usize> {
        if self.line.is_none() {
            return Err(Error::NotInitialized);
        }

        let half_period = self.config.half_period;
        let mut level = match self.state {
            State::OutputHigh => Level::Low,
            _ => Level::High,
        };
        let mut writes = 0;

        while !token.is_cancelled() {
            self.write(level)?;
            writes += 1;

            hold(delay, token, half_period);
            level = !level;
        }

        Ok(writes)
    }

    /// Drive the line low and release it.
    ///
    /// Safe to call more than once, and on a controller that never claimed
    /// its line.
    pub fn shutdown(&mut self) -> Result<()> {
        self.state = State::Released;

        let Some(mut line) = self.line.take() else {
            tracing::debug!("shutdown: no line claimed");
            return Ok(());
        };

        let offset = line.offset();
        let lowered = line.set_low();
        let released = line.release();

        tracing::info!("released line {}", offset);

        lowered.and(released)
    }

    /// Initialize, drive until cancelled, then shut down.
    ///
    /// The line is shut down even if driving fails.
    pub fn run<D: DelayNs>(&mut self, delay: &mut D, token: &CancellationToken) -> Result<usize> {
        self.initialize()?;

        let driven = self.drive(delay, token);
        let shutdown = self.shutdown();

        let writes = driven?;
        shutdown?;

        Ok(writes)
    }
}

/// Wait `period` through `delay`, split into waits `DelayNs` can express.
///
/// Stops between chunks once `token` is cancelled.
fn hold<D: DelayNs>(delay: &mut D, token: &CancellationToken, period: Duration) {
    let mut remaining = period.as_micros();

    while remaining > 0 && !token.is_cancelled() {
        let chunk = u32::try_from(remaining).unwrap_or(u32::MAX);
        delay.delay_us(chunk);
        remaining -= u128::from(chunk);
    }
}

impl<C: GpioChip> Drop for PinController<C> {
    fn drop(&mut self) {
        if self.line.is_some() {
            if let Err(e) = self.shutdown() {
                tracing::warn!("failed to release GPIO line: {}", e);
            }
        }
    }
}
