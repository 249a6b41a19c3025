use simple_signal::Signal;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// One-shot cancellation flag shared between the signal handler and the
/// drive loop.
///
/// Cancelling wakes any thread blocked in [`CancellationToken::wait_timeout`].
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        // poisoning cannot leave a bool half-written
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cancel(&self) {
        *self.flag() = true;
        self.inner.1.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Block for `timeout` or until cancelled, whichever comes first.
    ///
    /// Returns `true` if the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut cancelled = self.flag();

        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }

            cancelled = self
                .inner
                .1
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        *cancelled
    }
}

/// Cancel `token` when the process receives SIGINT (Ctrl-C) or SIGTERM.
pub fn cancel_on_interrupt(token: &CancellationToken) {
    let token = token.clone();

    simple_signal::set_handler(&[Signal::Int, Signal::Term], move |signals| {
        tracing::info!("received {:?}, stopping", signals);
        token.cancel();
    });
}
