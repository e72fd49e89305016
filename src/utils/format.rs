use chrono::NaiveTime;

use crate::countdown::Remaining;
use crate::models::PrayerType;

/// Format a duration in seconds to "Xh Ym" or "Ym" string
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Live countdown text: "2h 5m 9s", "5m 9s" or "9s".
pub fn format_time_remaining(remaining: Remaining) -> String {
    if remaining.hours > 0 {
        format!(
            "{}h {}m {}s",
            remaining.hours, remaining.minutes, remaining.seconds
        )
    } else if remaining.minutes > 0 {
        format!("{}m {}s", remaining.minutes, remaining.seconds)
    } else {
        format!("{}s", remaining.seconds)
    }
}

/// Reminder text for `total_minutes` left before `prayer`.
pub fn reminder_message(total_minutes: i64, prayer: PrayerType) -> String {
    if total_minutes >= 60 {
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;
        if minutes > 0 {
            format!(
                "{} hour(s) and {} minute(s) until {} prayer",
                hours, minutes, prayer
            )
        } else {
            format!("{} hour(s) until {} prayer", hours, prayer)
        }
    } else {
        format!("{} minute(s) until {} prayer", total_minutes, prayer)
    }
}

/// Format a NaiveTime to "HH:MM"
pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rem(hours: i64, minutes: i64, seconds: i64) -> Remaining {
        Remaining {
            hours,
            minutes,
            seconds,
        }
    }

    #[test]
    fn countdown_drops_leading_zero_units() {
        assert_eq!(format_time_remaining(rem(2, 0, 9)), "2h 0m 9s");
        assert_eq!(format_time_remaining(rem(0, 5, 0)), "5m 0s");
        assert_eq!(format_time_remaining(rem(0, 0, 42)), "42s");
    }

    #[test]
    fn reminder_wording() {
        assert_eq!(
            reminder_message(90, PrayerType::Asr),
            "1 hour(s) and 30 minute(s) until Asr prayer"
        );
        assert_eq!(
            reminder_message(120, PrayerType::Isha),
            "2 hour(s) until Isha prayer"
        );
        assert_eq!(
            reminder_message(7, PrayerType::Fajr),
            "7 minute(s) until Fajr prayer"
        );
    }

    #[test]
    fn short_duration_summary() {
        assert_eq!(format_duration_secs(0), "now");
        assert_eq!(format_duration_secs(3_900), "1h 5m");
        assert_eq!(format_duration_secs(600), "10m");
    }
}
