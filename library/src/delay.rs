use crate::CancellationToken;
use embedded_hal::delay::DelayNs;
use std::time::Duration;

/// Blocking delay that returns early once its token is cancelled.
#[derive(Clone)]
pub struct Delay {
    token: CancellationToken,
}

impl Delay {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        self.token.wait_timeout(Duration::from_nanos(ns.into()));
    }

    fn delay_us(&mut self, us: u32) {
        self.token.wait_timeout(Duration::from_micros(us.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.token.wait_timeout(Duration::from_millis(ms.into()));
    }
}
