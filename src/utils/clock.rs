//! Millisecond wall clock for marker timestamps

use std::cell::Cell;

/// Source of epoch-millisecond timestamps
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Real clock (`Date.now()` on wasm via chrono's wasmbind)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for tests and replays
#[derive(Debug, Default)]
pub struct FixedClock {
    now: Cell<i64>,
}

impl FixedClock {
    pub fn new(start: i64) -> Self {
        Self { now: Cell::new(start) }
    }

    pub fn set(&self, millis: i64) {
        self.now.set(millis);
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(1_000);
        clock.advance(250);
        assert_eq!(clock.now_millis(), 1_250);

        clock.set(5);
        assert_eq!(clock.now_millis(), 5);
    }
}
