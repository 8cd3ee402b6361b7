//! Async playback session: applies transport commands in arrival order and
//! publishes state changes and highlight updates.
//!
//! # Flow
//!
//! ```text
//! PlaybackCommand ──mpsc──▶ run_session ──▶ PlaybackController
//!       ▲                        │
//!       │                        └──mpsc──▶ PlaybackEvent (UI / renderer)
//! spawn_ticker (polls engine position every tick_interval)
//! ```
//!
//! The controller lock is never held across an `.await`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::timing::{ActivePosition, TimingTree};

use super::controller::{lock_controller, PlaybackController, SharedController};
use super::engine::{AudioEngine, AudioHandle, PlaybackError};
use super::state::PlaybackState;

// ---------------------------------------------------------------------------
// Commands and events
// ---------------------------------------------------------------------------

/// Requests sent to a running session.
#[derive(Debug)]
pub enum PlaybackCommand {
    Load {
        tree: TimingTree,
        uri: String,
        autoplay: bool,
    },
    Play,
    Pause,
    Seek(i64),
    Stop,
    /// Position report from the engine (or the ticker standing in for it).
    Position { handle: AudioHandle, position_ms: u64 },
}

/// Notifications published by a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    StateChanged(PlaybackState),
    Highlight {
        position_ms: u64,
        active: Option<ActivePosition>,
    },
    Seeked(u64),
    /// Playback reached the end of the track; the last word stays lit.
    Finished,
    Error(PlaybackError),
}

// ---------------------------------------------------------------------------
// Session loop
// ---------------------------------------------------------------------------

/// Run until `commands` is closed or every event receiver is gone.
pub async fn run_session<E: AudioEngine>(
    controller: SharedController<E>,
    mut commands: mpsc::Receiver<PlaybackCommand>,
    events: mpsc::Sender<PlaybackEvent>,
) {
    while let Some(command) = commands.recv().await {
        let published = {
            let mut ctl = lock_controller(&controller);
            apply(&mut ctl, command)
        };

        for event in published {
            if events.send(event).await.is_err() {
                log::info!("playback: event receiver dropped, session shutting down");
                return;
            }
        }
    }

    log::info!("playback: command channel closed, session shutting down");
}

/// Apply one command and collect the events it produces.
pub fn apply<E: AudioEngine>(
    ctl: &mut PlaybackController<E>,
    command: PlaybackCommand,
) -> Vec<PlaybackEvent> {
    let before = ctl.state();
    let mut events = Vec::new();

    let result = match command {
        PlaybackCommand::Load {
            tree,
            uri,
            autoplay,
        } => ctl.load(tree, &uri, autoplay),
        PlaybackCommand::Play => ctl.play(),
        PlaybackCommand::Pause => ctl.pause(),
        PlaybackCommand::Seek(position_ms) => ctl.seek(position_ms).map(|target| {
            if let Some(target) = target {
                events.push(PlaybackEvent::Seeked(target));
            }
        }),
        PlaybackCommand::Stop => {
            ctl.stop();
            Ok(())
        }
        PlaybackCommand::Position {
            handle,
            position_ms,
        } => {
            if let Some(tick) = ctl.on_position_update(handle, position_ms) {
                if tick.changed {
                    events.push(PlaybackEvent::Highlight {
                        position_ms: tick.position_ms,
                        active: tick.active,
                    });
                }
                if tick.finished {
                    events.push(PlaybackEvent::Finished);
                }
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        events.push(PlaybackEvent::Error(e));
    }
    if ctl.state() != before {
        events.insert(0, PlaybackEvent::StateChanged(ctl.state()));
    }
    events
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Poll the engine position every `interval` and feed it back as
/// [`PlaybackCommand::Position`].  Ends when the command channel closes.
pub fn spawn_ticker<E: AudioEngine + 'static>(
    controller: SharedController<E>,
    commands: mpsc::Sender<PlaybackCommand>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let polled = lock_controller(&controller).poll_position();
            if let Some((handle, position_ms)) = polled {
                let command = PlaybackCommand::Position {
                    handle,
                    position_ms,
                };
                if commands.send(command).await.is_err() {
                    break;
                }
            } else if commands.is_closed() {
                break;
            }
        }
        log::debug!("playback: ticker stopped");
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
