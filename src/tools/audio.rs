//! Audio player transport
//!
//! The transport (position, volume, mute) lives here; actual sound output is
//! delegated to a [`MediaBackend`]. Without the `sound` feature the
//! [`SilentBackend`] only checks that the file can be opened.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Seek step for the arrow keys
pub const SEEK_STEP: Duration = Duration::from_secs(5);

/// Volume step for +/-
pub const VOLUME_STEP: f32 = 0.1;

/// Platform media output
pub trait MediaBackend {
    /// Open `path` and return its length when known
    fn load(&mut self, path: &Path) -> Result<Option<Duration>>;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position: Duration) -> Result<()>;
    fn set_volume(&mut self, volume: f32);
}

/// Backend that produces no sound
#[derive(Debug, Default)]
pub struct SilentBackend;

impl MediaBackend for SilentBackend {
    fn load(&mut self, path: &Path) -> Result<Option<Duration>> {
        File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        Ok(None)
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn seek(&mut self, _position: Duration) -> Result<()> {
        Ok(())
    }

    fn set_volume(&mut self, _volume: f32) {}
}

/// Backend playing through the default output device
#[cfg(feature = "sound")]
pub struct RodioBackend {
    _stream: rodio::OutputStream,
    stream_handle: rodio::OutputStreamHandle,
    sink: Option<rodio::Sink>,
    volume: f32,
}

#[cfg(feature = "sound")]
impl RodioBackend {
    pub fn new() -> Result<Self> {
        let (stream, stream_handle) =
            rodio::OutputStream::try_default().context("No audio output device")?;
        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            volume: 1.0,
        })
    }
}

#[cfg(feature = "sound")]
impl MediaBackend for RodioBackend {
    fn load(&mut self, path: &Path) -> Result<Option<Duration>> {
        use rodio::Source;

        let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        let source = rodio::Decoder::new(std::io::BufReader::new(file))
            .with_context(|| format!("Cannot decode {}", path.display()))?;
        let duration = source.total_duration();

        let sink = rodio::Sink::try_new(&self.stream_handle)?;
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(source);
        self.sink = Some(sink);

        Ok(duration)
    }

    fn play(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        if let Some(sink) = &self.sink {
            sink.try_seek(position)
                .map_err(|e| anyhow::anyhow!("Seek failed: {:?}", e))?;
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }
}

/// Pick the best available backend
pub fn default_backend() -> Box<dyn MediaBackend> {
    #[cfg(feature = "sound")]
    {
        match RodioBackend::new() {
            Ok(backend) => return Box::new(backend),
            Err(e) => tracing::warn!("Falling back to silent audio backend: {:#}", e),
        }
    }
    Box::new(SilentBackend)
}

/// Transport state of the loaded track
pub struct AudioPlayer {
    backend: Box<dyn MediaBackend>,
    source: Option<PathBuf>,
    playing: bool,
    /// Position at the last play/pause/seek
    base_position: Duration,
    /// Set while playing; position advances from here
    resumed_at: Option<Instant>,
    duration: Option<Duration>,
    volume: f32,
    muted: bool,
}

impl std::fmt::Debug for AudioPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPlayer")
            .field("source", &self.source)
            .field("playing", &self.playing)
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

impl AudioPlayer {
    pub fn new(backend: Box<dyn MediaBackend>) -> Self {
        Self {
            backend,
            source: None,
            playing: false,
            base_position: Duration::ZERO,
            resumed_at: None,
            duration: None,
            volume: 1.0,
            muted: false,
        }
    }

    /// Load a track, stopping the current one. On failure the previous
    /// track stays loaded.
    pub fn load(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let duration = self.backend.load(&path)?;
        info!("Loaded audio file {:?} ({:?})", path, duration);

        self.source = Some(path);
        self.duration = duration;
        self.playing = false;
        self.base_position = Duration::ZERO;
        self.resumed_at = None;
        self.backend.set_volume(self.effective_volume());
        Ok(())
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn source_name(&self) -> Option<String> {
        self.source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Current playback position at `now`, clamped to the track length
    pub fn position(&self, now: Instant) -> Duration {
        let elapsed = self
            .resumed_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        let position = self.base_position + elapsed;
        match self.duration {
            Some(total) => position.min(total),
            None => position,
        }
    }

    /// Play/pause. Does nothing without a loaded track.
    pub fn toggle_play(&mut self, now: Instant) -> bool {
        if self.source.is_none() {
            return false;
        }
        if self.playing {
            self.base_position = self.position(now);
            self.resumed_at = None;
            self.playing = false;
            self.backend.pause();
        } else {
            if self.is_at_end(now) {
                self.base_position = Duration::ZERO;
                if let Err(e) = self.backend.seek(Duration::ZERO) {
                    debug!("Rewind failed: {:#}", e);
                }
            }
            self.resumed_at = Some(now);
            self.playing = true;
            self.backend.play();
        }
        true
    }

    /// Stop the clock once the end of a track of known length is reached
    pub fn update(&mut self, now: Instant) {
        if self.playing && self.is_at_end(now) {
            self.base_position = self.position(now);
            self.resumed_at = None;
            self.playing = false;
            self.backend.pause();
        }
    }

    fn is_at_end(&self, now: Instant) -> bool {
        matches!(self.duration, Some(total) if self.position(now) >= total)
    }

    /// Move the position by `delta`, clamped to the track
    pub fn seek_by(&mut self, now: Instant, forward: bool, delta: Duration) -> Result<()> {
        if self.source.is_none() {
            return Ok(());
        }
        let current = self.position(now);
        let mut target = if forward {
            current + delta
        } else {
            current.saturating_sub(delta)
        };
        if let Some(total) = self.duration {
            target = target.min(total);
        }

        self.backend.seek(target)?;
        self.base_position = target;
        if self.playing {
            self.resumed_at = Some(now);
        }
        Ok(())
    }

    /// Set the volume in `[0, 1]`. Zero also mutes, anything else unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = (volume.clamp(0.0, 1.0) * 100.0).round() / 100.0;
        self.volume = volume;
        self.muted = volume == 0.0;
        self.backend.set_volume(self.effective_volume());
    }

    pub fn change_volume(&mut self, delta: f32) {
        let base = if self.muted { 0.0 } else { self.volume };
        self.set_volume(base + delta);
    }

    /// Mute keeps the volume level so unmuting restores it
    pub fn toggle_mute(&mut self) {
        if self.muted && self.volume == 0.0 {
            self.volume = 1.0;
        }
        self.muted = !self.muted;
        self.backend.set_volume(self.effective_volume());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Backend with a fixed track length that accepts any path
    struct FixedLengthBackend(Duration);

    impl MediaBackend for FixedLengthBackend {
        fn load(&mut self, _path: &Path) -> Result<Option<Duration>> {
            Ok(Some(self.0))
        }
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn seek(&mut self, _position: Duration) -> Result<()> {
            Ok(())
        }
        fn set_volume(&mut self, _volume: f32) {}
    }

    fn player_with_track(secs: u64) -> AudioPlayer {
        let mut player = AudioPlayer::new(Box::new(FixedLengthBackend(Duration::from_secs(secs))));
        player.load("track.ogg").unwrap();
        player
    }

    #[test]
    fn test_silent_backend_rejects_missing_file() {
        let mut player = AudioPlayer::new(Box::new(SilentBackend));
        assert!(player.load("/definitely/not/here.mp3").is_err());
        assert!(player.source().is_none());
        assert!(!player.toggle_play(Instant::now()));
    }

    #[test]
    fn test_silent_backend_loads_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not really audio").unwrap();

        let mut player = AudioPlayer::new(Box::new(SilentBackend));
        player.load(file.path()).unwrap();
        assert_eq!(player.source(), Some(file.path()));
        assert_eq!(player.duration(), None);
    }

    #[test]
    fn test_clock_advances_only_while_playing() {
        let t0 = Instant::now();
        let mut player = player_with_track(60);

        player.toggle_play(t0);
        assert_eq!(player.position(t0 + Duration::from_secs(10)), Duration::from_secs(10));

        player.toggle_play(t0 + Duration::from_secs(10));
        assert_eq!(player.position(t0 + Duration::from_secs(30)), Duration::from_secs(10));
    }

    #[test]
    fn test_seek_is_clamped() {
        let t0 = Instant::now();
        let mut player = player_with_track(12);

        player.seek_by(t0, false, SEEK_STEP).unwrap();
        assert_eq!(player.position(t0), Duration::ZERO);
        player.seek_by(t0, true, SEEK_STEP).unwrap();
        player.seek_by(t0, true, SEEK_STEP).unwrap();
        player.seek_by(t0, true, SEEK_STEP).unwrap();
        assert_eq!(player.position(t0), Duration::from_secs(12));
    }

    #[test]
    fn test_playback_stops_at_end_and_restarts_from_zero() {
        let t0 = Instant::now();
        let mut player = player_with_track(3);
        player.toggle_play(t0);

        let later = t0 + Duration::from_secs(5);
        player.update(later);
        assert!(!player.is_playing());
        assert_eq!(player.position(later), Duration::from_secs(3));

        player.toggle_play(later);
        assert_eq!(player.position(later), Duration::ZERO);
    }

    #[test]
    fn test_volume_and_mute() {
        let mut player = player_with_track(10);
        player.change_volume(-0.3);
        assert!((player.volume() - 0.7).abs() < 1e-6);

        player.toggle_mute();
        assert!(player.is_muted());
        player.toggle_mute();
        assert!(!player.is_muted());
        assert!((player.volume() - 0.7).abs() < 1e-6);

        player.set_volume(0.0);
        assert!(player.is_muted());
        player.toggle_mute();
        assert_eq!(player.volume(), 1.0);

        player.set_volume(3.0);
        assert_eq!(player.volume(), 1.0);
    }
}
