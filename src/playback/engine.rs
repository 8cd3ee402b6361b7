//! Audio engine seam and the built-in wall-clock engine.
//!
//! # Overview
//!
//! [`AudioEngine`] is the interface the
//! [`PlaybackController`](crate::playback::PlaybackController) drives.  Every
//! call only *requests* a change; implementations report position through
//! [`AudioEngine::position_ms`], which the session ticker polls to stand in
//! for a periodic position callback.
//!
//! [`ClockEngine`] is a silent engine.  It probes the asset with symphonia
//! (container and codec must be supported, the track length comes from the
//! stream header) and then advances a clock at the playback rate.  It drives
//! the CLI karaoke view and is handy wherever real output is not wanted.
//!
//! [`MockAudioEngine`] (available under `#[cfg(test)]`) records every call and
//! can be told to fail.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Failures reported by an audio engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The asset could not be fetched or opened.
    #[error("failed to load audio: {0}")]
    LoadFailed(String),

    /// The asset was opened but cannot be decoded or played.
    #[error("failed to decode audio: {0}")]
    DecodeFailed(String),

    /// The platform refused access to the asset or the output device.
    #[error("audio permission denied: {0}")]
    PermissionDenied(String),
}

impl PlaybackError {
    /// Stable reason code for callers that branch on the failure kind.
    ///
    /// ```
    /// use chandas_karaoke::playback::PlaybackError;
    ///
    /// assert_eq!(PlaybackError::LoadFailed("x".into()).code(), "load-failed");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            PlaybackError::LoadFailed(_) => "load-failed",
            PlaybackError::DecodeFailed(_) => "decode-failed",
            PlaybackError::PermissionDenied(_) => "permission-denied",
        }
    }
}

// ---------------------------------------------------------------------------
// AudioEngine trait
// ---------------------------------------------------------------------------

/// Opaque handle to one loaded audio asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioHandle(pub u64);

/// Object-safe interface to the platform audio engine.
///
/// The caller owns each handle it receives from [`load`](Self::load) until it
/// passes it to [`unload`](Self::unload).
pub trait AudioEngine: Send {
    fn load(&mut self, uri: &str) -> Result<AudioHandle, PlaybackError>;
    fn play(&mut self, handle: AudioHandle) -> Result<(), PlaybackError>;
    fn pause(&mut self, handle: AudioHandle) -> Result<(), PlaybackError>;
    fn seek(&mut self, handle: AudioHandle, position_ms: u64) -> Result<(), PlaybackError>;
    fn unload(&mut self, handle: AudioHandle);

    /// Track length, when the engine knows it.
    fn duration_ms(&self, handle: AudioHandle) -> Option<u64>;

    /// Current playback position, `None` for unknown handles.
    fn position_ms(&self, handle: AudioHandle) -> Option<u64>;
}

// Compile-time assertion: Box<dyn AudioEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioEngine>) {}
};

// ---------------------------------------------------------------------------
// ClockEngine
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ClockTrack {
    /// Position accumulated up to `started`.
    offset_ms: u64,
    /// Set while playing.
    started: Option<Instant>,
    duration_ms: Option<u64>,
}

/// Probe `path` and return the default track's length in milliseconds, if the
/// stream header carries one.
fn probe_duration(path: &Path) -> Result<Option<u64>, PlaybackError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => {
            PlaybackError::PermissionDenied(format!("{}: {e}", path.display()))
        }
        _ => PlaybackError::LoadFailed(format!("{}: {e}", path.display())),
    })?;
    let decode_failed = |e: symphonia::core::errors::Error| {
        PlaybackError::DecodeFailed(format!("{}: {e}", path.display()))
    };

    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(decode_failed)?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlaybackError::DecodeFailed(format!("{}: no audio track", path.display())))?;
    symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(decode_failed)?;

    let params = &track.codec_params;
    Ok(match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames.saturating_mul(1000) / u64::from(rate)),
        _ => None,
    })
}

/// Silent engine that tracks position against the wall clock.
#[derive(Debug)]
pub struct ClockEngine {
    rate: f64,
    next_id: u64,
    tracks: HashMap<AudioHandle, ClockTrack>,
}

impl ClockEngine {
    /// `rate` scales elapsed time (1.0 = real time); non-positive or
    /// non-finite rates fall back to 1.0.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        Self {
            rate,
            next_id: 1,
            tracks: HashMap::new(),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Number of handles currently held open.
    pub fn open_handles(&self) -> usize {
        self.tracks.len()
    }

    fn track(&mut self, handle: AudioHandle) -> Result<&mut ClockTrack, PlaybackError> {
        self.tracks
            .get_mut(&handle)
            .ok_or_else(|| PlaybackError::LoadFailed(format!("unknown handle {}", handle.0)))
    }

    /// Change the clock rate.  Time already played at the old rate is folded
    /// into each track's offset, so positions stay continuous.
    pub fn set_rate(&mut self, rate: f64) {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        let now = Instant::now();
        for track in self.tracks.values_mut() {
            if let Some(started) = track.started.replace(now) {
                track.offset_ms += scaled_ms(now.duration_since(started), self.rate);
            }
        }
        log::debug!("clock engine: rate {} -> {rate}", self.rate);
        self.rate = rate;
    }

    fn elapsed_ms(&self, track: &ClockTrack) -> u64 {
        track
            .started
            .map(|t| scaled_ms(t.elapsed(), self.rate))
            .unwrap_or(0)
    }
}

fn scaled_ms(elapsed: std::time::Duration, rate: f64) -> u64 {
    (elapsed.as_secs_f64() * 1000.0 * rate) as u64
}

impl Default for ClockEngine {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AudioEngine for ClockEngine {
    fn load(&mut self, uri: &str) -> Result<AudioHandle, PlaybackError> {
        let path = Path::new(uri.strip_prefix("file://").unwrap_or(uri));
        if path.is_dir() {
            return Err(PlaybackError::LoadFailed(format!(
                "{}: is a directory",
                path.display()
            )));
        }
        let duration_ms = probe_duration(path)?;

        let handle = AudioHandle(self.next_id);
        self.next_id += 1;
        self.tracks.insert(
            handle,
            ClockTrack {
                offset_ms: 0,
                started: None,
                duration_ms,
            },
        );
        log::debug!(
            "clock engine: loaded {} as {:?} ({duration_ms:?} ms)",
            path.display(),
            handle
        );
        Ok(handle)
    }

    fn play(&mut self, handle: AudioHandle) -> Result<(), PlaybackError> {
        let track = self.track(handle)?;
        if track.started.is_none() {
            track.started = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self, handle: AudioHandle) -> Result<(), PlaybackError> {
        let rate = self.rate;
        let track = self.track(handle)?;
        if let Some(started) = track.started.take() {
            track.offset_ms += scaled_ms(started.elapsed(), rate);
        }
        Ok(())
    }

    fn seek(&mut self, handle: AudioHandle, position_ms: u64) -> Result<(), PlaybackError> {
        let track = self.track(handle)?;
        track.offset_ms = position_ms;
        if track.started.is_some() {
            track.started = Some(Instant::now());
        }
        Ok(())
    }

    fn unload(&mut self, handle: AudioHandle) {
        if self.tracks.remove(&handle).is_some() {
            log::debug!("clock engine: released {:?}", handle);
        }
    }

    fn duration_ms(&self, handle: AudioHandle) -> Option<u64> {
        self.tracks.get(&handle).and_then(|track| track.duration_ms)
    }

    fn position_ms(&self, handle: AudioHandle) -> Option<u64> {
        self.tracks.get(&handle).map(|track| {
            let position = track.offset_ms + self.elapsed_ms(track);
            track.duration_ms.map_or(position, |d| position.min(d))
        })
    }
}

// ---------------------------------------------------------------------------
// MockAudioEngine (test only)
// ---------------------------------------------------------------------------

/// Engine call recorded by [`MockAudioEngine`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Load(String),
    Play(AudioHandle),
    Pause(AudioHandle),
    Seek(AudioHandle, u64),
    Unload(AudioHandle),
}

/// Scriptable engine for controller tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockAudioEngine {
    pub calls: Vec<EngineCall>,
    pub live: Vec<AudioHandle>,
    pub duration_ms: Option<u64>,
    pub position_ms: u64,
    pub fail_load: Option<PlaybackError>,
    pub fail_play: Option<PlaybackError>,
    next_id: u64,
}

#[cfg(test)]
impl MockAudioEngine {
    pub fn with_duration(duration_ms: u64) -> Self {
        Self {
            duration_ms: Some(duration_ms),
            ..Self::default()
        }
    }

    pub fn failing_load(err: PlaybackError) -> Self {
        Self {
            fail_load: Some(err),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl AudioEngine for MockAudioEngine {
    fn load(&mut self, uri: &str) -> Result<AudioHandle, PlaybackError> {
        self.calls.push(EngineCall::Load(uri.to_string()));
        if let Some(err) = self.fail_load.clone() {
            return Err(err);
        }
        self.next_id += 1;
        let handle = AudioHandle(self.next_id);
        self.live.push(handle);
        Ok(handle)
    }

    fn play(&mut self, handle: AudioHandle) -> Result<(), PlaybackError> {
        self.calls.push(EngineCall::Play(handle));
        match self.fail_play.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn pause(&mut self, handle: AudioHandle) -> Result<(), PlaybackError> {
        self.calls.push(EngineCall::Pause(handle));
        Ok(())
    }

    fn seek(&mut self, handle: AudioHandle, position_ms: u64) -> Result<(), PlaybackError> {
        self.calls.push(EngineCall::Seek(handle, position_ms));
        self.position_ms = position_ms;
        Ok(())
    }

    fn unload(&mut self, handle: AudioHandle) {
        self.calls.push(EngineCall::Unload(handle));
        self.live.retain(|h| *h != handle);
    }

    fn duration_ms(&self, _handle: AudioHandle) -> Option<u64> {
        self.duration_ms
    }

    fn position_ms(&self, handle: AudioHandle) -> Option<u64> {
        self.live.contains(&handle).then_some(self.position_ms)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
