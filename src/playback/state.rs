//! Playback state machine and the per-session position cursor.
//!
//! [`PlaybackState`] is owned by the
//! [`PlaybackController`](crate::playback::PlaybackController); the UI reads
//! it to decide which transport buttons to show.
//!
//! [`PlaybackCursor`] lives only while audio is loaded.  It remembers the last
//! resolved line/word so steady playback can use the resolver's hint path, and
//! forgets it whenever the position jumps.

use serde::Serialize;

use crate::timing::{resolve, ActivePosition, TimingTree};

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// States of the recitation player.
///
/// ```text
/// Idle/Stopped ──load──▶ Loading ──ok──▶ Paused ⇄ Playing
///                           │                       │
///                           └──fail──▶ Error ◀──fail┘
/// any state ──stop──▶ Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlaybackState {
    /// Nothing loaded yet.
    Idle,
    /// An audio asset is being acquired from the engine.
    Loading,
    Playing,
    /// Loaded and positioned, not advancing.
    Paused,
    /// Stopped explicitly; the audio resource has been released.
    Stopped,
    /// Load or playback failed; only a new `load` recovers.
    Error,
}

impl PlaybackState {
    /// `true` while audio is loaded and seekable.
    ///
    /// ```
    /// use chandas_karaoke::playback::PlaybackState;
    ///
    /// assert!(PlaybackState::Playing.is_active());
    /// assert!(PlaybackState::Paused.is_active());
    /// assert!(!PlaybackState::Stopped.is_active());
    /// ```
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }

    /// A short label for status displays.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::Loading => "Loading",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Error => "Error",
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Idle
    }
}

// ---------------------------------------------------------------------------
// PlaybackCursor
// ---------------------------------------------------------------------------

/// How the cursor reached its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// Advanced by regular position ticks; the last result is a usable hint.
    Forward,
    /// Jumped (explicit seek, backwards tick or fresh load); next lookup is cold.
    Seek,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackCursor {
    pub position_ms: u64,
    pub last_line: Option<usize>,
    pub last_word: Option<usize>,
    pub direction: Direction,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self {
            position_ms: 0,
            last_line: None,
            last_word: None,
            direction: Direction::Seek,
        }
    }

    /// Last resolved position, usable as a resolver hint.
    pub fn hint(&self) -> Option<ActivePosition> {
        match self.direction {
            Direction::Forward => self
                .last_line
                .map(|line| ActivePosition::new(line, self.last_word)),
            Direction::Seek => None,
        }
    }

    /// The highlight produced by the last [`advance`](Self::advance).
    pub fn active(&self) -> Option<ActivePosition> {
        self.last_line
            .map(|line| ActivePosition::new(line, self.last_word))
    }

    /// Jump to `position_ms`, invalidating the hint.
    pub fn seek(&mut self, position_ms: u64) {
        self.position_ms = position_ms;
        self.last_line = None;
        self.last_word = None;
        self.direction = Direction::Seek;
    }

    /// Move to `position_ms` and resolve the highlight there.
    pub fn advance(&mut self, tree: &TimingTree, position_ms: u64) -> Option<ActivePosition> {
        if position_ms < self.position_ms {
            self.direction = Direction::Seek;
        }
        let active = resolve(tree, position_ms, self.hint());
        self.position_ms = position_ms;
        self.last_line = active.map(|a| a.line);
        self.last_word = active.and_then(|a| a.word);
        self.direction = Direction::Forward;
        active
    }
}

impl Default for PlaybackCursor {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
