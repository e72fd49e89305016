use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::announce::AnnouncementSink;
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::countdown::engine::{CountdownEngine, Tick};
use crate::models::DailySchedule;
use crate::prayer_times::ScheduleSource;
use crate::utils::format::reminder_message;

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Pause after a prayer time has been announced.
pub const DEADLINE_COOLDOWN: Duration = Duration::from_secs(60);
/// Pause after a failed iteration.
pub const ERROR_COOLDOWN: Duration = Duration::from_secs(5);
const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// The sequential countdown loop. Owns the engine; everything else is
/// borrowed for the duration of the run.
pub struct Runner<'a, C, S, K>
where
    C: Clock,
    S: ScheduleSource,
    K: AnnouncementSink,
{
    clock: &'a C,
    source: &'a S,
    sink: &'a mut K,
    config: &'a AppConfig,
    shutdown: &'a AtomicBool,
    engine: CountdownEngine,
    /// Earliest time a failed day-change fetch is tried again.
    next_refetch_at: Option<NaiveDateTime>,
}

impl<'a, C, S, K> Runner<'a, C, S, K>
where
    C: Clock,
    S: ScheduleSource,
    K: AnnouncementSink,
{
    pub fn new(
        clock: &'a C,
        source: &'a S,
        sink: &'a mut K,
        config: &'a AppConfig,
        shutdown: &'a AtomicBool,
        schedule: DailySchedule,
    ) -> Self {
        Self {
            clock,
            source,
            sink,
            config,
            shutdown,
            engine: CountdownEngine::new(schedule),
            next_refetch_at: None,
        }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    /// Loop until the shutdown flag is raised. Iteration errors are
    /// reported and followed by a short cooldown.
    pub fn run(&mut self) {
        info!("Countdown loop started");
        while !self.stopping() {
            let pause = match self.step() {
                Ok(pause) => pause,
                Err(e) => {
                    error!("Countdown iteration failed: {e:#}");
                    self.sink.loop_error(&e);
                    ERROR_COOLDOWN
                }
            };
            self.pause(pause);
        }
        info!("Countdown loop stopped");
    }

    /// One iteration. Returns how long to wait before the next one.
    pub fn step(&mut self) -> Result<Duration> {
        let now = self.clock.now();
        // A failed fetch must not stall the countdown on the stale schedule.
        if let Err(e) = self.refresh_schedule(now) {
            error!("{e:#}");
            self.sink.loop_error(&e);
        }

        match self.engine.tick(now) {
            Tick::Countdown {
                deadline,
                remaining,
                announcement,
            } => {
                self.sink.countdown(&deadline, remaining)?;
                if let Some(minutes) = announcement {
                    if self.config.announcement_voice {
                        self.sink
                            .announce(&reminder_message(minutes, deadline.prayer));
                    } else {
                        debug!("Reminder at {minutes}m suppressed");
                    }
                }
                Ok(POLL_INTERVAL)
            }
            Tick::DeadlineReached(deadline) => {
                info!("Prayer time reached: {}", deadline.prayer);
                self.sink
                    .deadline_reached(&deadline, self.engine.schedule(), self.shutdown)?;
                Ok(DEADLINE_COOLDOWN)
            }
        }
    }

    // The schedule belongs to one calendar day; fetch the next day's once
    // local midnight has passed. A failed fetch keeps the stale schedule and
    // is retried after ERROR_COOLDOWN.
    fn refresh_schedule(&mut self, now: NaiveDateTime) -> Result<()> {
        let today = now.date();
        if self.engine.schedule().date() == today {
            return Ok(());
        }
        if self.next_refetch_at.is_some_and(|retry_at| now < retry_at) {
            return Ok(());
        }
        info!("Day changed to {}, fetching new prayer times", today);
        let fetched = self
            .source
            .fetch(self.config, today)
            .with_context(|| format!("Fetching prayer times for {}", today));
        let schedule = match fetched {
            Ok(schedule) => schedule,
            Err(e) => {
                let cooldown = chrono::Duration::from_std(ERROR_COOLDOWN)?;
                self.next_refetch_at = Some(now + cooldown);
                return Err(e);
            }
        };
        self.next_refetch_at = None;
        self.sink.schedule_changed(&schedule);
        self.engine.replace_schedule(schedule);
        Ok(())
    }

    fn pause(&self, total: Duration) {
        let mut left = total;
        while !left.is_zero() && !self.stopping() {
            let slice = left.min(SLEEP_SLICE);
            self.clock.sleep(slice);
            left -= slice;
        }
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}
