//! Wall-clock abstraction so the countdown loop can run on simulated time.

use chrono::{Local, NaiveDateTime};
use std::time::Duration;

pub trait Clock {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
