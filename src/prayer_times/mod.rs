pub mod client;

pub use client::{AladhanClient, ScheduleSource};
#[cfg(test)]
pub use client::ScheduleError;
