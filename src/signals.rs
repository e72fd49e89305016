//! Shutdown on SIGINT/SIGTERM.

use anyhow::{Context, Result};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Returns a flag that turns true once an interrupt or terminate signal
/// arrives. Sleeps and azan playback poll it.
pub fn install_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        flag::register(signal, Arc::clone(&shutdown))
            .with_context(|| format!("Registering handler for signal {signal}"))?;
    }
    Ok(shutdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn terminate_signal_raises_the_flag() {
        let shutdown = install_shutdown_flag().unwrap();
        assert!(!shutdown.load(Ordering::SeqCst));
        signal_hook::low_level::raise(SIGTERM).unwrap();
        assert!(shutdown.load(Ordering::SeqCst));
    }
}
