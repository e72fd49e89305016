use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use log::info;
use std::io::{self, Stdout, Write};
use std::sync::atomic::AtomicBool;

use crate::announce::audio::{AzanPlayer, Playback};
use crate::config::AppConfig;
use crate::countdown::{Deadline, Remaining};
use crate::models::DailySchedule;
use crate::utils::format::{format_time, format_time_remaining};
use crate::utils::hijri::hijri_string;
use crate::utils::term::{AMBER, BOLD, DIM, GOLD, RED, rule};

/// Everything the countdown loop shows or plays.
pub trait AnnouncementSink {
    /// Rewrite the live countdown line.
    fn countdown(&mut self, deadline: &Deadline, remaining: Remaining) -> Result<()>;

    /// A reminder before the next prayer.
    fn announce(&mut self, message: &str);

    /// The prayer time has arrived. May block for the azan's duration.
    fn deadline_reached(
        &mut self,
        deadline: &Deadline,
        schedule: &DailySchedule,
        shutdown: &AtomicBool,
    ) -> Result<()>;

    /// A new day's schedule was fetched.
    fn schedule_changed(&mut self, schedule: &DailySchedule);

    fn loop_error(&mut self, err: &anyhow::Error);
}

pub struct ConsoleSink {
    config: AppConfig,
    player: AzanPlayer,
    out: Stdout,
}

impl ConsoleSink {
    pub fn new(config: AppConfig, player: AzanPlayer) -> Self {
        Self {
            config,
            player,
            out: io::stdout(),
        }
    }
}

impl AnnouncementSink for ConsoleSink {
    fn countdown(&mut self, deadline: &Deadline, remaining: Remaining) -> Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        write!(
            self.out,
            "⏰ Next Prayer: {:8} at {} | Time Remaining: {:12}",
            deadline.prayer.display_name(),
            deadline.at.format("%H:%M"),
            format_time_remaining(remaining)
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn announce(&mut self, message: &str) {
        println!();
        println_colored!(AMBER, "🔔 ANNOUNCEMENT: {}", message);
    }

    fn deadline_reached(
        &mut self,
        deadline: &Deadline,
        schedule: &DailySchedule,
        shutdown: &AtomicBool,
    ) -> Result<()> {
        println!("\n");
        println_colored!(GOLD, "{}", rule());
        println_colored!(
            GOLD,
            "🕌 IT'S TIME FOR {} PRAYER!",
            deadline.prayer.display_name().to_uppercase()
        );
        println_colored!(GOLD, "{}", rule());
        println!();

        let playback = self.player.play(shutdown);
        info!("Azan for {}: {:?}", deadline.prayer, playback);
        if playback != Playback::Interrupted {
            print_schedule(&self.config, schedule, Local::now().naive_local());
        }
        Ok(())
    }

    fn schedule_changed(&mut self, schedule: &DailySchedule) {
        println!();
        print_schedule(&self.config, schedule, Local::now().naive_local());
    }

    fn loop_error(&mut self, err: &anyhow::Error) {
        println!();
        println_colored!(RED, "✗ Error: {:#}", err);
    }
}

/// Print the day's table; prayers already past `now` are dimmed.
pub fn print_schedule(config: &AppConfig, schedule: &DailySchedule, now: NaiveDateTime) {
    let date = schedule.date();
    let heading = date.format("%A, %B %d, %Y").to_string().to_uppercase();

    println!();
    println_colored!(GOLD, "{}", rule());
    println_colored!(GOLD, "🕌 PRAYER TIMES FOR {}", heading);
    if let Some(hijri) = hijri_string(date) {
        println_colored!(DIM, "   {}", hijri);
    }
    println!("📍 {}, {}", config.city, config.country);
    println_colored!(GOLD, "{}", rule());

    for (prayer, time) in schedule.iter() {
        let line = format!("  {:10} : {}", prayer.display_name(), format_time(time));
        if date.and_time(time) <= now {
            println_colored!(DIM, "{}", line);
        } else {
            println_colored!(BOLD, "{}", line);
        }
    }

    println_colored!(GOLD, "{}", rule());
    println!();
}
