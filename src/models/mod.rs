pub mod prayer;
pub mod schedule;

pub use prayer::PrayerType;
pub use schedule::DailySchedule;
