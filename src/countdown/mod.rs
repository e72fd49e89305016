pub mod engine;
pub mod runner;

pub use engine::{Deadline, Remaining};
pub use runner::Runner;
