use chrono::{Duration, NaiveDateTime};
use log::{debug, warn};
use std::collections::HashSet;

use crate::models::{DailySchedule, PrayerType};

/// Minutes before a deadline at which a single reminder fires.
pub const THRESHOLD_LADDER: [i64; 7] = [180, 120, 90, 60, 45, 30, 20];

/// Below this many minutes every whole minute gets a reminder.
pub const MINUTE_BY_MINUTE_BELOW: i64 = 20;

/// How late a crossing may be noticed and still count as "it's time".
/// Anything later (suspend, clock jump) is treated as a missed deadline.
const CROSSING_GRACE_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub prayer: PrayerType,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }

    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }
}

/// First prayer of the day strictly after `now`, or tomorrow's Fajr once
/// Isha has passed. Tomorrow's Fajr reuses today's time of day.
pub fn next_deadline(schedule: &DailySchedule, now: NaiveDateTime) -> Deadline {
    let today = now.date();
    for (prayer, time) in schedule.iter() {
        let at = today.and_time(time);
        if at > now {
            return Deadline { prayer, at };
        }
    }

    let tomorrow = today.succ_opt().unwrap_or(today);
    Deadline {
        prayer: PrayerType::Fajr,
        at: tomorrow.and_time(schedule.time_of(PrayerType::Fajr)),
    }
}

/// Whole-second decomposition of `at - now`. Callers only pass `at > now`;
/// a past instant clamps to zero.
pub fn remaining(now: NaiveDateTime, at: NaiveDateTime) -> Remaining {
    let total = (at - now).num_seconds().max(0);
    Remaining {
        hours: total / 3600,
        minutes: (total % 3600) / 60,
        seconds: total % 60,
    }
}

/// Per-cycle memory of which reminders already fired and whether the
/// current deadline has been announced.
#[derive(Debug, Default, Clone)]
pub struct AnnouncementState {
    fired: HashSet<i64>,
    deadline_announced: bool,
}

impl AnnouncementState {
    /// Returns true at most once per minute value per cycle.
    pub fn should_announce(&mut self, total_minutes: i64) -> bool {
        let eligible = THRESHOLD_LADDER.contains(&total_minutes)
            || (1..MINUTE_BY_MINUTE_BELOW).contains(&total_minutes);
        eligible && self.fired.insert(total_minutes)
    }

    /// Starts a new cycle: every threshold becomes eligible again.
    pub fn reset(&mut self) {
        self.fired.clear();
    }

    #[cfg(test)]
    pub fn fired_thresholds(&self) -> &HashSet<i64> {
        &self.fired
    }

    #[cfg(test)]
    pub fn deadline_announced(&self) -> bool {
        self.deadline_announced
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Counting down. `announcement` carries the minutes-remaining value
    /// when a reminder threshold was crossed on this tick.
    Countdown {
        deadline: Deadline,
        remaining: Remaining,
        announcement: Option<i64>,
    },
    /// The deadline has arrived; fires once per deadline.
    DeadlineReached(Deadline),
}

pub struct CountdownEngine {
    schedule: DailySchedule,
    state: AnnouncementState,
    /// Deadline observed on the previous tick.
    tracked: Option<Deadline>,
}

impl CountdownEngine {
    pub fn new(schedule: DailySchedule) -> Self {
        Self {
            schedule,
            state: AnnouncementState::default(),
            tracked: None,
        }
    }

    pub fn schedule(&self) -> &DailySchedule {
        &self.schedule
    }

    #[cfg(test)]
    pub fn state(&self) -> &AnnouncementState {
        &self.state
    }

    /// Swap in a freshly fetched schedule. Announcement state carries over.
    pub fn replace_schedule(&mut self, schedule: DailySchedule) {
        debug!("Schedule replaced with times for {}", schedule.date());
        self.schedule = schedule;
    }

    pub fn tick(&mut self, now: NaiveDateTime) -> Tick {
        // A deadline may pass between two polls without remaining ever
        // reading exactly zero.
        if let Some(tracked) = self.tracked.take() {
            if now >= tracked.at && !self.state.deadline_announced {
                if now - tracked.at <= Duration::seconds(CROSSING_GRACE_SECS) {
                    return self.cross(tracked);
                }
                warn!(
                    "Missed {} at {} (noticed at {})",
                    tracked.prayer,
                    tracked.at.format("%H:%M"),
                    now.format("%H:%M:%S")
                );
                self.state.reset();
            }
        }

        let deadline = next_deadline(&self.schedule, now);
        let left = remaining(now, deadline.at);
        self.tracked = Some(deadline);

        if left.is_zero() {
            if !self.state.deadline_announced {
                return self.cross(deadline);
            }
            return Tick::Countdown {
                deadline,
                remaining: left,
                announcement: None,
            };
        }

        self.state.deadline_announced = false;
        let minutes = left.total_minutes();
        Tick::Countdown {
            deadline,
            remaining: left,
            announcement: self.state.should_announce(minutes).then_some(minutes),
        }
    }

    fn cross(&mut self, deadline: Deadline) -> Tick {
        self.state.deadline_announced = true;
        self.state.reset();
        self.tracked = Some(deadline);
        Tick::DeadlineReached(deadline)
    }
}
