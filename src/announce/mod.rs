pub mod audio;
pub mod sink;

pub use audio::AzanPlayer;
pub use sink::{AnnouncementSink, ConsoleSink, print_schedule};
