// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Monotonic time, busy-wait delays and bounded polling.

use core::time::Duration;

/// A monotonic clock which can also busy-wait.
///
/// Nothing here may block on a scheduler: secondaries are brought up before any wait queue can be
/// trusted, so every wait is a spin on the clock.
pub trait Timer {
    /// Returns the time elapsed since some fixed point in the past.
    fn now(&self) -> Duration;

    /// Busy-waits for at least `duration`.
    fn delay(&self, duration: Duration);
}

/// Polls a condition at a fixed interval until it holds or a deadline passes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BoundedPoll {
    /// How long to wait between checks.
    pub interval: Duration,
    /// How long after the first check to give up.
    pub timeout: Duration,
}

impl BoundedPoll {
    /// Creates a new poller.
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Checks `done` until it returns true or the timeout elapses on `timer`.
    ///
    /// Returns whether `done` was seen to return true. The condition is always checked at least
    /// once, even with a zero timeout.
    pub fn poll(&self, timer: &impl Timer, mut done: impl FnMut() -> bool) -> bool {
        let deadline = timer.now() + self.timeout;
        loop {
            if done() {
                return true;
            }
            if timer.now() >= deadline {
                return false;
            }
            timer.delay(self.interval);
        }
    }
}

/// The ARM generic timer, read through `CNTPCT_EL0`.
#[cfg(target_arch = "aarch64")]
#[derive(Debug)]
pub struct GenericTimer {
    frequency: u64,
}

#[cfg(target_arch = "aarch64")]
impl GenericTimer {
    /// Creates a timer using the counter frequency programmed into `CNTFRQ_EL0` by firmware.
    ///
    /// Returns `None` if firmware left the frequency unset.
    pub fn new() -> Option<Self> {
        let frequency = crate::aarch64::read_cntfrq_el0();
        (frequency != 0).then_some(Self { frequency })
    }

    fn ticks_to_duration(&self, ticks: u64) -> Duration {
        let seconds = ticks / self.frequency;
        let remainder = ticks % self.frequency;
        Duration::from_secs(seconds)
            + Duration::from_nanos(remainder * 1_000_000_000 / self.frequency)
    }
}

#[cfg(target_arch = "aarch64")]
impl Timer for GenericTimer {
    fn now(&self) -> Duration {
        self.ticks_to_duration(crate::aarch64::read_cntpct_el0())
    }

    fn delay(&self, duration: Duration) {
        let end = self.now() + duration;
        while self.now() < end {
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::test::FakeTimer;
    use std::cell::Cell;

    const POLL: BoundedPoll = BoundedPoll::new(Duration::from_micros(10), Duration::from_secs(1));

    #[test]
    fn poll_returns_immediately_when_done() {
        let timer = FakeTimer::new();

        assert!(POLL.poll(&timer, || true));
        assert_eq!(timer.now(), Duration::ZERO);
    }

    #[test]
    fn poll_sees_condition_after_some_intervals() {
        let timer = FakeTimer::new();
        let checks = Cell::new(0);

        assert!(POLL.poll(&timer, || {
            checks.set(checks.get() + 1);
            timer.now() >= Duration::from_micros(30)
        }));
        assert_eq!(checks.get(), 4);
        assert_eq!(timer.now(), Duration::from_micros(30));
    }

    #[test]
    fn poll_gives_up_at_deadline() {
        let timer = FakeTimer::new();

        assert!(!POLL.poll(&timer, || false));
        assert_eq!(timer.now(), Duration::from_secs(1));
    }

    #[test]
    fn zero_timeout_checks_once() {
        let timer = FakeTimer::new();
        let checks = Cell::new(0);
        let poll = BoundedPoll::new(Duration::from_micros(10), Duration::ZERO);

        assert!(!poll.poll(&timer, || {
            checks.set(checks.get() + 1);
            false
        }));
        assert_eq!(checks.get(), 1);
        assert_eq!(timer.now(), Duration::ZERO);
    }
}
