//! Azan download and playback.
//!
//! Playback blocks the caller until the audio finishes, but polls the
//! shutdown flag so an interrupt stops the sound instead of waiting it out.

use log::{debug, info, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_AZAN_URL: &str = "https://www.islamcan.com/audio/adhan/azan1.mp3";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);
const PLAYBACK_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("download failed with HTTP {0}")]
    Status(StatusCode),
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("playback failed: {0}")]
    Play(#[from] rodio::PlayError),
    #[error("cannot decode azan: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Finished,
    Interrupted,
    /// Nothing was played: the file is absent, the default download
    /// failed, or the audio device or decoder refused it.
    Skipped,
}

pub struct AzanPlayer {
    path: PathBuf,
    use_default: bool,
    url: String,
}

impl AzanPlayer {
    pub fn new(path: PathBuf, use_default: bool) -> Self {
        Self::with_url(path, use_default, DEFAULT_AZAN_URL)
    }

    pub fn with_url(path: PathBuf, use_default: bool, url: &str) -> Self {
        Self {
            path,
            use_default,
            url: url.to_string(),
        }
    }

    /// Make sure the azan file is on disk, downloading the default one
    /// when allowed. Returns whether there is something to play.
    pub fn ensure_asset(&self) -> Result<bool, AudioError> {
        if self.path.exists() {
            return Ok(true);
        }
        if !self.use_default {
            return Ok(false);
        }
        self.download()?;
        Ok(true)
    }

    fn download(&self) -> Result<(), AudioError> {
        println!("📥 Downloading default azan...");
        debug!("Fetching {}", self.url);

        let http = Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;
        let response = http.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AudioError::Status(status));
        }
        let bytes = response.bytes()?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, &bytes)?;
        info!("Azan downloaded to {:?} ({} bytes)", self.path, bytes.len());
        println!("✓ Azan downloaded to {}", self.path.display());
        Ok(())
    }

    /// Play the azan to completion or until `shutdown` is raised. Any
    /// download or playback failure is logged and reported as skipped.
    pub fn play(&self, shutdown: &AtomicBool) -> Playback {
        match self.ensure_asset() {
            Ok(true) => {}
            Ok(false) => {
                warn!("Azan file not found: {:?}", self.path);
                println!("⚠ Azan file not found: {}", self.path.display());
                return Playback::Skipped;
            }
            Err(e) => {
                warn!("Could not download azan: {e}");
                println!("⚠ Could not download azan: {e}");
                return Playback::Skipped;
            }
        }

        match self.play_file(shutdown) {
            Ok(playback) => playback,
            Err(e) => {
                warn!("Error playing azan: {e}");
                println!("⚠ Error playing azan: {e}");
                Playback::Skipped
            }
        }
    }

    fn play_file(&self, shutdown: &AtomicBool) -> Result<Playback, AudioError> {
        let (_stream, handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&handle)?;
        let file = File::open(&self.path)?;
        sink.append(Decoder::new(BufReader::new(file))?);

        println!("🎵 Playing Azan...");
        while !sink.empty() {
            if shutdown.load(Ordering::SeqCst) {
                sink.stop();
                debug!("Azan playback interrupted");
                return Ok(Playback::Interrupted);
            }
            thread::sleep(PLAYBACK_POLL);
        }
        Ok(Playback::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn existing_file_needs_no_download() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("azan.mp3");
        std::fs::write(&path, b"ID3").unwrap();

        let player = AzanPlayer::with_url(path, true, "http://127.0.0.1:9/never");
        assert!(player.ensure_asset().unwrap());
    }

    #[test]
    fn missing_file_without_default_is_not_playable() {
        let dir = TempDir::new().unwrap();
        let player = AzanPlayer::new(dir.path().join("azan.mp3"), false);
        assert!(!player.ensure_asset().unwrap());

        let shutdown = AtomicBool::new(false);
        assert_eq!(player.play(&shutdown), Playback::Skipped);
    }

    #[test]
    fn failed_download_skips_playback_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("azan.mp3");
        let player = AzanPlayer::with_url(path.clone(), true, "http://127.0.0.1:9/azan.mp3");

        assert!(player.ensure_asset().is_err());
        let shutdown = AtomicBool::new(false);
        assert_eq!(player.play(&shutdown), Playback::Skipped);
        assert!(!path.exists());
    }

    #[test]
    fn unplayable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("azan.mp3");
        std::fs::write(&path, b"definitely not an mp3 stream").unwrap();

        let player = AzanPlayer::new(path, false);
        let shutdown = AtomicBool::new(false);
        assert_eq!(player.play(&shutdown), Playback::Skipped);
    }
}
