use anyhow::{Context, Result};
use std::path::Path;

use crate::announce::{AzanPlayer, ConsoleSink, print_schedule};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::config::settings::ConfigOrigin;
use crate::countdown::Runner;
use crate::countdown::engine::{next_deadline, remaining};
use crate::location::{GeoOutcome, IpApiLocator};
use crate::prayer_times::{AladhanClient, ScheduleSource};
use crate::signals::install_shutdown_flag;
use crate::utils::format::{format_duration_secs, format_time};
use crate::utils::term::{AMBER, GOLD, GREEN, rule};

// ─── Setup ───────────────────────────────────────────────────────────────────

pub fn handle_setup(config_path: &Path, reset: bool) -> Result<()> {
    if !reset && config_path.exists() {
        println!(
            "Configuration already exists at {}. Use --reset to re-detect the location.",
            config_path.display()
        );
        return Ok(());
    }

    println!("📍 Auto-detecting location...");
    let locator = IpApiLocator::new()?;
    let (config, outcome) = AppConfig::detect(&locator);
    report_location(&config, &outcome);
    config.save(config_path)?;
    println_colored!(GREEN, "✓ Configuration saved to {}", config_path.display());
    Ok(())
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let client = AladhanClient::new()?;
    let now = SystemClock.now();

    let schedule = client
        .fetch(&config, now.date())
        .context("Fetching prayer times")?;
    print_schedule(&config, &schedule, now);

    let next = next_deadline(&schedule, now);
    let left = remaining(now, next.at);
    let secs = left.hours * 3600 + left.minutes * 60 + left.seconds;
    println_colored!(
        AMBER,
        "  Next: {} at {} in {}",
        next.prayer,
        format_time(next.at.time()),
        format_duration_secs(secs)
    );
    println!();
    Ok(())
}

// ─── Countdown ───────────────────────────────────────────────────────────────

pub fn handle_run(config_path: &Path) -> Result<()> {
    println!();
    println_colored!(GOLD, "🕌 MUSLIM PRAYER COUNTDOWN TIMER");
    println_colored!(GOLD, "{}", rule());

    let config = load_config(config_path)?;

    let client = AladhanClient::new()?;
    let clock = SystemClock;
    let now = clock.now();
    let schedule = client
        .fetch(&config, now.date())
        .context("Fetching prayer times")?;
    print_schedule(&config, &schedule, now);

    println!("⏰ Timer started. Press Ctrl+C to exit.\n");

    let player = AzanPlayer::new(config.azan_path(config_path), config.use_default_azan);
    let mut sink = ConsoleSink::new(config.clone(), player);

    // Until here SIGINT keeps its default action, so Ctrl+C during the
    // lookup or the fetch exits at once.
    let shutdown = install_shutdown_flag()?;
    Runner::new(&clock, &client, &mut sink, &config, &shutdown, schedule).run();

    println!("\n");
    println_colored!(GREEN, "✓ Timer stopped. May Allah accept your prayers.");
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn load_config(config_path: &Path) -> Result<AppConfig> {
    let locator = IpApiLocator::new()?;
    let (config, origin) = AppConfig::load_or_create(config_path, &locator)?;

    match origin {
        ConfigOrigin::Loaded => {
            println_colored!(
                GREEN,
                "✓ Loading configuration from {}",
                config_path.display()
            );
            println_colored!(GREEN, "✓ Location: {}, {}", config.city, config.country);
        }
        ConfigOrigin::Created(outcome) => {
            println!("⚙ Configuration file not found. Created a new one.");
            report_location(&config, &outcome);
            println_colored!(GREEN, "✓ Configuration saved to {}", config_path.display());
        }
    }
    Ok(config)
}

fn report_location(config: &AppConfig, outcome: &GeoOutcome) {
    match outcome {
        GeoOutcome::Detected(_) => {
            println_colored!(
                GREEN,
                "✓ Location detected: {}, {}",
                config.city,
                config.country
            );
        }
        GeoOutcome::DefaultFallback => {
            println_colored!(AMBER, "⚠ Using default location: Mecca, Saudi Arabia");
        }
    }
    println_colored!(
        GREEN,
        "✓ Coordinates: {:.4}, {:.4}",
        config.latitude,
        config.longitude
    );
}
