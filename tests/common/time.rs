use std::sync::Mutex;
use std::time::{Duration, Instant};

use retries::clock::Clock;

/// Clock that only moves when told to.
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut guard = self.offset.lock().expect("clock poisoned");
        *guard = guard
            .checked_add(duration)
            .expect("duration advance overflowed");
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().expect("clock poisoned")
    }
}
