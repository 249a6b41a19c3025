//! In-memory GPIO chip for testing
//!
//! Tracks which lines are claimed and records every claim, write and release
//! with a timestamp so tests can check ordering and timing.

use crate::{Error, GpioChip, Level, OutputLine, Result};
use embedded_hal::digital;
use gpiocdev::line::Offset;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    Claimed { offset: Offset, initial: Level },
    Wrote { offset: Offset, level: Level },
    Released { offset: Offset },
}

#[derive(Debug, Default)]
struct Inner {
    claimed: BTreeSet<Offset>,
    levels: BTreeMap<Offset, Level>,
    events: Vec<(Instant, Event)>,
    failure: Option<String>,
}

impl Inner {
    fn record(&mut self, event: Event) {
        self.events.push((Instant::now(), event));
    }
}

/// Mock GPIO chip
///
/// Clones share state, so a test can keep a handle while the controller owns
/// another one.
#[derive(Clone, Debug, Default)]
pub struct MockChip {
    inner: Arc<Mutex<Inner>>,
}

impl MockChip {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following claim fail with `reason`.
    pub fn fail_claims(&self, reason: &str) {
        self.lock().failure = Some(reason.to_owned());
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.iter().map(|(_, event)| *event).collect()
    }

    pub fn timeline(&self) -> Vec<(Instant, Event)> {
        self.lock().events.clone()
    }

    /// Levels written to `offset`, in order.
    pub fn writes(&self, offset: Offset) -> Vec<Level> {
        self.lock()
            .events
            .iter()
            .filter_map(|(_, event)| match *event {
                Event::Wrote { offset: o, level } if o == offset => Some(level),
                _ => None,
            })
            .collect()
    }

    pub fn is_claimed(&self, offset: Offset) -> bool {
        self.lock().claimed.contains(&offset)
    }

    /// Last level driven on `offset`, if it was ever claimed.
    pub fn level(&self, offset: Offset) -> Option<Level> {
        self.lock().levels.get(&offset).copied()
    }

    fn write(&self, offset: Offset, level: Level) {
        let mut inner = self.lock();
        inner.levels.insert(offset, level);
        inner.record(Event::Wrote { offset, level });
    }

    fn release(&self, offset: Offset) {
        let mut inner = self.lock();
        if inner.claimed.remove(&offset) {
            inner.record(Event::Released { offset });
        }
    }
}

impl GpioChip for MockChip {
    type Line = MockLine;

    fn claim_output(&mut self, offset: Offset, initial: Level) -> Result<MockLine> {
        let mut inner = self.lock();

        if let Some(reason) = &inner.failure {
            return Err(Error::HardwareAccess {
                offset,
                reason: reason.clone(),
            });
        }

        if !inner.claimed.insert(offset) {
            return Err(Error::HardwareAccess {
                offset,
                reason: "line busy".to_owned(),
            });
        }

        inner.levels.insert(offset, initial);
        inner.record(Event::Claimed { offset, initial });

        Ok(MockLine {
            chip: self.clone(),
            offset,
            released: false,
        })
    }
}

#[derive(Debug)]
pub struct MockLine {
    chip: MockChip,
    offset: Offset,
    released: bool,
}

impl digital::ErrorType for MockLine {
    type Error = Error;
}

impl digital::OutputPin for MockLine {
    fn set_low(&mut self) -> std::result::Result<(), Self::Error> {
        self.chip.write(self.offset, Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> std::result::Result<(), Self::Error> {
        self.chip.write(self.offset, Level::High);
        Ok(())
    }
}

impl OutputLine for MockLine {
    fn offset(&self) -> Offset {
        self.offset
    }

    fn release(mut self) -> Result<()> {
        self.chip.release(self.offset);
        self.released = true;
        Ok(())
    }
}

impl Drop for MockLine {
    fn drop(&mut self) {
        if !self.released {
            self.chip.release(self.offset);
        }
    }
}
