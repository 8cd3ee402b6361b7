//! Recitation playback: the audio engine seam, the transport state machine
//! and the async session that turns position reports into highlight events.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  PlaybackCommand  ┌─────────────┐   ┌────────────────────┐
//! │ UI / CLI   │ ────────────────▶ │ run_session │──▶│ PlaybackController │
//! └────────────┘                   └─────────────┘   │  TimingTree        │
//!       ▲          PlaybackEvent          │          │  PlaybackCursor    │
//!       └─────────────────────────────────┘          │  AudioEngine       │
//!                                                     └────────────────────┘
//! ```

pub mod controller;
pub mod engine;
pub mod session;
pub mod state;

pub use controller::{
    lock_controller, new_shared_controller, ControllerSlot, PlaybackController, SharedController,
    Tick,
};
pub use engine::{AudioEngine, AudioHandle, ClockEngine, PlaybackError};
pub use session::{apply, run_session, spawn_ticker, PlaybackCommand, PlaybackEvent};
pub use state::{Direction, PlaybackCursor, PlaybackState};

#[cfg(test)]
pub use engine::MockAudioEngine;
