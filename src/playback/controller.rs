//! Recitation playback controller.
//!
//! [`PlaybackController`] owns the loaded [`TimingTree`], the engine handle
//! and the [`PlaybackCursor`].  It is the single place that mutates playback
//! state; the UI and the session loop only call its methods.
//!
//! # Lifecycle
//!
//! ```text
//! load(tree, uri, autoplay)
//!   └─▶ release previous handle                    [Loading]
//!         ├─ engine.load ok  → Paused (→ Playing if autoplay)
//!         └─ engine.load err → release everything  [Error]
//!
//! on_position_update(handle, ms)
//!   └─▶ stale handle or not Playing/Paused → ignored
//!   └─▶ clamp to duration, cursor.advance      → Tick
//!
//! stop()  → release handle, drop cursor         [Stopped]
//! ```

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;

use crate::timing::{ActivePosition, TimingTree};

use super::engine::{AudioEngine, AudioHandle, PlaybackError};
use super::state::{PlaybackCursor, PlaybackState};

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// Result of feeding one position update through the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tick {
    /// Position after clamping to the track duration.
    pub position_ms: u64,
    pub active: Option<ActivePosition>,
    /// The highlight differs from the previous tick.
    pub changed: bool,
    /// This tick is the first to reach the end of the track.
    pub finished: bool,
}

// ---------------------------------------------------------------------------
// PlaybackController
// ---------------------------------------------------------------------------

pub struct PlaybackController<E: AudioEngine> {
    engine: E,
    state: PlaybackState,
    handle: Option<AudioHandle>,
    tree: Option<TimingTree>,
    cursor: Option<PlaybackCursor>,
    duration_ms: u64,
    reached_end: bool,
    last_error: Option<PlaybackError>,
    /// Set once a newer controller took over the process-wide slot.
    superseded: bool,
}

impl<E: AudioEngine> PlaybackController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::Idle,
            handle: None,
            tree: None,
            cursor: None,
            duration_ms: 0,
            reached_end: false,
            last_error: None,
            superseded: false,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn handle(&self) -> Option<AudioHandle> {
        self.handle
    }

    pub fn tree(&self) -> Option<&TimingTree> {
        self.tree.as_ref()
    }

    pub fn cursor(&self) -> Option<&PlaybackCursor> {
        self.cursor.as_ref()
    }

    /// Track length: the engine's figure when it has one, otherwise the end
    /// of the last timed line.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    /// The highlight as of the last position update.
    pub fn active(&self) -> Option<ActivePosition> {
        self.cursor.as_ref().and_then(PlaybackCursor::active)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// `true` once a newer controller was installed in the same
    /// [`ControllerSlot`]; such a controller refuses to load again.
    pub fn is_superseded(&self) -> bool {
        self.superseded
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Load a verse and its recitation audio.
    ///
    /// Any previously loaded audio is released first.  On failure the
    /// controller ends in [`PlaybackState::Error`] holding no resources.
    pub fn load(&mut self, tree: TimingTree, uri: &str, autoplay: bool) -> Result<(), PlaybackError> {
        if self.superseded {
            return Err(self.fail(PlaybackError::LoadFailed(
                "controller superseded by a newer session".into(),
            )));
        }
        self.release();
        self.state = PlaybackState::Loading;
        self.last_error = None;
        log::debug!("playback: loading {uri} for verse {:?}", tree.verse().id);

        let handle = match self.engine.load(uri) {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e)),
        };

        self.duration_ms = self
            .engine
            .duration_ms(handle)
            .unwrap_or_else(|| tree.duration_ms());
        self.handle = Some(handle);
        self.tree = Some(tree);
        self.cursor = Some(PlaybackCursor::new());
        self.reached_end = false;
        self.state = PlaybackState::Paused;
        log::info!("playback: loaded {uri} ({} ms)", self.duration_ms);

        if autoplay {
            self.play()?;
        }
        Ok(())
    }

    /// Paused → Playing.  A no-op in every other state.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Paused {
            log::debug!("playback: play ignored in {}", self.state.label());
            return Ok(());
        }
        let Some(handle) = self.handle else {
            return Ok(());
        };
        match self.engine.play(handle) {
            Ok(()) => {
                self.state = PlaybackState::Playing;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Playing → Paused.  A no-op in every other state.
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.state != PlaybackState::Playing {
            log::debug!("playback: pause ignored in {}", self.state.label());
            return Ok(());
        }
        let Some(handle) = self.handle else {
            return Ok(());
        };
        match self.engine.pause(handle) {
            Ok(()) => {
                self.state = PlaybackState::Paused;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Jump to `position_ms`, clamped to `[0, duration]`.
    ///
    /// Returns the clamped target, or `None` when nothing is loaded (the call
    /// is then a no-op).  The resolver hint is discarded, so the next update
    /// is resolved from scratch.
    pub fn seek(&mut self, position_ms: i64) -> Result<Option<u64>, PlaybackError> {
        if !self.state.is_active() {
            log::debug!("playback: seek ignored in {}", self.state.label());
            return Ok(None);
        }
        let Some(handle) = self.handle else {
            return Ok(None);
        };
        let target = position_ms.clamp(0, self.duration_ms.min(i64::MAX as u64) as i64) as u64;

        if let Err(e) = self.engine.seek(handle, target) {
            return Err(self.fail(e));
        }
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.seek(target);
        }
        self.reached_end = target >= self.duration_ms;
        log::debug!("playback: seek to {target} ms");
        Ok(Some(target))
    }

    /// Stop from any state and release the audio resource.
    pub fn stop(&mut self) {
        self.release();
        self.state = PlaybackState::Stopped;
        log::debug!("playback: stopped");
    }

    // -----------------------------------------------------------------------
    // Position updates
    // -----------------------------------------------------------------------

    /// Feed one position report from the engine.
    ///
    /// Reports for a handle other than the current one (a track that was
    /// replaced or stopped) and reports outside Playing/Paused are dropped.
    pub fn on_position_update(&mut self, handle: AudioHandle, position_ms: u64) -> Option<Tick> {
        if self.handle != Some(handle) {
            log::debug!("playback: dropping update for stale {:?}", handle);
            return None;
        }
        if !self.state.is_active() {
            return None;
        }
        let (Some(cursor), Some(tree)) = (self.cursor.as_mut(), self.tree.as_ref()) else {
            return None;
        };

        let position_ms = position_ms.min(self.duration_ms);
        let previous = cursor.active();
        let active = cursor.advance(tree, position_ms);

        let at_end = self.duration_ms > 0 && position_ms >= self.duration_ms;
        let finished = at_end && !self.reached_end;
        self.reached_end = at_end;

        Some(Tick {
            position_ms,
            active,
            changed: active != previous,
            finished,
        })
    }

    /// Current engine position for the loaded handle while Playing.
    pub fn poll_position(&self) -> Option<(AudioHandle, u64)> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        let handle = self.handle?;
        self.engine.position_ms(handle).map(|ms| (handle, ms))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.engine.unload(handle);
            log::debug!("playback: released {:?}", handle);
        }
        self.cursor = None;
        self.tree = None;
        self.duration_ms = 0;
        self.reached_end = false;
    }

    fn retire(&mut self) {
        self.superseded = true;
        if self.handle.is_some() || self.state.is_active() {
            self.stop();
        }
    }

    fn fail(&mut self, err: PlaybackError) -> PlaybackError {
        self.release();
        self.state = PlaybackState::Error;
        self.last_error = Some(err.clone());
        log::error!("playback error [{}]: {err}", err.code());
        err
    }
}

impl<E: AudioEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------------------------------------------------------------------
// SharedController
// ---------------------------------------------------------------------------

/// Thread-safe handle to one controller, shared by the session loop, the
/// position ticker and whatever renders the highlight.
pub type SharedController<E> = Arc<Mutex<PlaybackController<E>>>;

/// Type-erased view of a shared controller, so one slot can hold controllers
/// over different engines.
trait Retire: Send + Sync {
    fn retire(&self);
}

impl<E: AudioEngine> Retire for Mutex<PlaybackController<E>> {
    fn retire(&self) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retire();
    }
}

/// Holds the one active controller of a scope.
///
/// Installing a controller stops the previous one, releases its audio and
/// marks it superseded.  [`ControllerSlot::global`] is the process-wide slot
/// behind [`new_shared_controller`].
///
/// `install` locks the previous controller, so it must not be called while
/// holding that controller's lock.
pub struct ControllerSlot {
    active: Mutex<Option<Weak<dyn Retire>>>,
}

impl ControllerSlot {
    pub const fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    /// The process-wide slot.
    pub fn global() -> &'static ControllerSlot {
        static GLOBAL: ControllerSlot = ControllerSlot::new();
        &GLOBAL
    }

    /// Make a controller over `engine` the active one, retiring its
    /// predecessor first.
    pub fn install<E: AudioEngine + 'static>(&self, engine: E) -> SharedController<E> {
        let controller: SharedController<E> = Arc::new(Mutex::new(PlaybackController::new(engine)));
        let weak: Weak<Mutex<PlaybackController<E>>> = Arc::downgrade(&controller);
        let weak: Weak<dyn Retire> = weak;

        let previous = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(weak);
        // Retire outside the slot lock.
        if let Some(previous) = previous.and_then(|w| w.upgrade()) {
            previous.retire();
            log::info!("playback: previous controller stopped and released");
        }
        controller
    }

    /// `true` when `controller` is the one most recently installed here.
    pub fn is_active<E: AudioEngine + 'static>(&self, controller: &SharedController<E>) -> bool {
        let current = Arc::as_ptr(controller);
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .is_some_and(|w| std::ptr::addr_eq(w.as_ptr(), current))
    }
}

impl Default for ControllerSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the process-wide active controller, stopping any earlier one.
pub fn new_shared_controller<E: AudioEngine + 'static>(engine: E) -> SharedController<E> {
    ControllerSlot::global().install(engine)
}

/// Lock a shared controller, recovering the guard if a holder panicked.
pub fn lock_controller<E: AudioEngine>(
    controller: &SharedController<E>,
) -> MutexGuard<'_, PlaybackController<E>> {
    controller
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::engine::{EngineCall, MockAudioEngine};
    use crate::timing::{Line, Verse, Word};

    fn verse() -> Verse {
        Verse {
            id: "gayatri".into(),
            text: "oṁ bhūr bhuvaḥ svaḥ".into(),
            audio: Some("gayatri.mp3".into()),
            lines: vec![
                Line::from_words(
                    0,
                    4_000,
                    vec![
                        Word::new("oṁ", 0, 1_000),
                        Word::new("bhūr", 1_000, 2_500),
                        Word::new("bhuvaḥ", 2_500, 4_000),
                    ],
                ),
                Line::from_words(4_000, 6_000, vec![Word::new("svaḥ", 4_000, 6_000)]),
            ],
        }
    }

    fn loaded(engine: MockAudioEngine) -> PlaybackController<MockAudioEngine> {
        let mut ctl = PlaybackController::new(engine);
        ctl.load(TimingTree::new(verse()), "gayatri.mp3", false)
            .expect("load");
        ctl
    }

    // ---- load ---

    #[test]
    fn new_controller_is_idle() {
        let ctl = PlaybackController::new(MockAudioEngine::default());
        assert_eq!(ctl.state(), PlaybackState::Idle);
        assert!(ctl.cursor().is_none());
    }

    #[test]
    fn load_without_autoplay_pauses() {
        let ctl = loaded(MockAudioEngine::default());
        assert_eq!(ctl.state(), PlaybackState::Paused);
        assert!(ctl.cursor().is_some());
        assert_eq!(ctl.engine().live.len(), 1);
    }

    #[test]
    fn load_with_autoplay_plays() {
        let mut ctl = PlaybackController::new(MockAudioEngine::default());
        ctl.load(TimingTree::new(verse()), "gayatri.mp3", true).unwrap();
        assert_eq!(ctl.state(), PlaybackState::Playing);
    }

    #[test]
    fn duration_prefers_engine_then_tree() {
        let ctl = loaded(MockAudioEngine::with_duration(7_500));
        assert_eq!(ctl.duration_ms(), 7_500);
        let ctl = loaded(MockAudioEngine::default());
        assert_eq!(ctl.duration_ms(), 6_000);
    }

    #[test]
    fn reload_releases_previous_handle() {
        let mut ctl = loaded(MockAudioEngine::default());
        let first = ctl.handle().unwrap();
        ctl.load(TimingTree::new(verse()), "other.mp3", false).unwrap();
        assert_ne!(ctl.handle(), Some(first));
        assert_eq!(ctl.engine().live, vec![ctl.handle().unwrap()]);
        assert!(ctl.engine().calls.contains(&EngineCall::Unload(first)));
    }

    #[test]
    fn failed_load_enters_error_and_holds_nothing() {
        let mut ctl = PlaybackController::new(MockAudioEngine::failing_load(
            PlaybackError::DecodeFailed("bad header".into()),
        ));
        let err = ctl
            .load(TimingTree::new(verse()), "broken.mp3", true)
            .unwrap_err();
        assert_eq!(err.code(), "decode-failed");
        assert_eq!(ctl.state(), PlaybackState::Error);
        assert_eq!(ctl.last_error(), Some(&err));
        assert!(ctl.handle().is_none());
        assert!(ctl.cursor().is_none());
    }

    #[test]
    fn error_recovers_only_through_load() {
        let mut ctl = PlaybackController::new(MockAudioEngine::failing_load(
            PlaybackError::LoadFailed("404".into()),
        ));
        let _ = ctl.load(TimingTree::new(verse()), "missing.mp3", false);
        ctl.play().unwrap();
        assert_eq!(ctl.state(), PlaybackState::Error);
        assert_eq!(ctl.seek(1_000).unwrap(), None);

        ctl.engine.fail_load = None;
        ctl.load(TimingTree::new(verse()), "found.mp3", false).unwrap();
        assert_eq!(ctl.state(), PlaybackState::Paused);
        assert!(ctl.last_error().is_none());
    }

    #[test]
    fn play_failure_releases_handle() {
        let mut engine = MockAudioEngine::default();
        engine.fail_play = Some(PlaybackError::PermissionDenied("autoplay blocked".into()));
        let mut ctl = PlaybackController::new(engine);
        let err = ctl
            .load(TimingTree::new(verse()), "gayatri.mp3", true)
            .unwrap_err();
        assert_eq!(err.code(), "permission-denied");
        assert_eq!(ctl.state(), PlaybackState::Error);
        assert!(ctl.engine().live.is_empty());
    }

    // ---- transport ---

    #[test]
    fn play_pause_cycle() {
        let mut ctl = loaded(MockAudioEngine::default());
        ctl.play().unwrap();
        assert_eq!(ctl.state(), PlaybackState::Playing);
        ctl.play().unwrap();
        assert_eq!(ctl.state(), PlaybackState::Playing);
        ctl.pause().unwrap();
        assert_eq!(ctl.state(), PlaybackState::Paused);
        ctl.pause().unwrap();
        assert_eq!(ctl.state(), PlaybackState::Paused);
    }

    #[test]
    fn play_before_load_is_noop() {
        let mut ctl = PlaybackController::new(MockAudioEngine::default());
        ctl.play().unwrap();
        assert_eq!(ctl.state(), PlaybackState::Idle);
        assert!(ctl.engine().calls.is_empty());
    }

    #[test]
    fn stop_releases_from_any_state() {
        let mut ctl = loaded(MockAudioEngine::default());
        ctl.play().unwrap();
        ctl.stop();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(ctl.engine().live.is_empty());
        assert!(ctl.cursor().is_none());

        let mut idle = PlaybackController::new(MockAudioEngine::default());
        idle.stop();
        assert_eq!(idle.state(), PlaybackState::Stopped);
    }

    #[test]
    fn stop_right_after_load_leaks_nothing() {
        let mut ctl = loaded(MockAudioEngine::default());
        let handle = ctl.handle().unwrap();
        ctl.stop();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert!(ctl.handle().is_none());
        assert!(ctl.engine().live.is_empty());
        assert_eq!(
            ctl.engine().calls,
            vec![
                EngineCall::Load("gayatri.mp3".into()),
                EngineCall::Unload(handle),
            ]
        );
    }

    #[test]
    fn seek_clamps_to_engine_duration() {
        let mut ctl = loaded(MockAudioEngine::with_duration(45_000));
        ctl.play().unwrap();
        assert_eq!(ctl.seek(-100).unwrap(), Some(0));
        assert_eq!(ctl.seek(99_999).unwrap(), Some(45_000));
        let handle = ctl.handle().unwrap();
        assert!(ctl
            .engine()
            .calls
            .contains(&EngineCall::Seek(handle, 45_000)));
    }

    #[test]
    fn seek_clamps_to_track() {
        let mut ctl = loaded(MockAudioEngine::default());
        assert_eq!(ctl.seek(-50).unwrap(), Some(0));
        assert_eq!(ctl.seek(99_999).unwrap(), Some(6_000));
        assert_eq!(ctl.seek(2_000).unwrap(), Some(2_000));
    }

    #[test]
    fn seek_twice_matches_seek_once() {
        let mut once = loaded(MockAudioEngine::default());
        once.seek(3_000).unwrap();

        let mut twice = loaded(MockAudioEngine::default());
        twice.seek(3_000).unwrap();
        twice.seek(3_000).unwrap();

        assert_eq!(once.state(), twice.state());
        assert_eq!(once.cursor(), twice.cursor());
    }

    #[test]
    fn seek_resets_hint() {
        let mut ctl = loaded(MockAudioEngine::default());
        ctl.play().unwrap();
        let handle = ctl.handle().unwrap();
        ctl.on_position_update(handle, 1_200);
        assert!(ctl.cursor().unwrap().hint().is_some());
        ctl.seek(4_500).unwrap();
        assert!(ctl.cursor().unwrap().hint().is_none());
        let tick = ctl.on_position_update(handle, 4_500).unwrap();
        assert_eq!(tick.active, Some(ActivePosition::new(1, Some(0))));
    }

    // ---- position updates ---

    #[test]
    fn ticks_drive_highlight() {
        let mut ctl = loaded(MockAudioEngine::default());
        ctl.play().unwrap();
        let handle = ctl.handle().unwrap();

        let tick = ctl.on_position_update(handle, 500).unwrap();
        assert_eq!(tick.active, Some(ActivePosition::new(0, Some(0))));
        assert!(tick.changed);

        let tick = ctl.on_position_update(handle, 900).unwrap();
        assert!(!tick.changed);

        let tick = ctl.on_position_update(handle, 1_000).unwrap();
        assert_eq!(tick.active, Some(ActivePosition::new(0, Some(1))));
        assert!(tick.changed);
    }

    #[test]
    fn updates_while_paused_still_resolve() {
        let mut ctl = loaded(MockAudioEngine::default());
        let handle = ctl.handle().unwrap();
        let tick = ctl.on_position_update(handle, 3_000).unwrap();
        assert_eq!(tick.active, Some(ActivePosition::new(0, Some(2))));
    }

    #[test]
    fn stale_handle_is_ignored() {
        let mut ctl = loaded(MockAudioEngine::default());
        let old = ctl.handle().unwrap();
        ctl.load(TimingTree::new(verse()), "again.mp3", true).unwrap();
        assert!(ctl.on_position_update(old, 500).is_none());
        assert!(ctl.cursor().unwrap().active().is_none());
    }

    #[test]
    fn updates_after_stop_are_ignored() {
        let mut ctl = loaded(MockAudioEngine::default());
        let handle = ctl.handle().unwrap();
        ctl.stop();
        assert!(ctl.on_position_update(handle, 500).is_none());
    }

    #[test]
    fn end_of_track_keeps_last_word_and_finishes_once() {
        let mut ctl = loaded(MockAudioEngine::default());
        ctl.play().unwrap();
        let handle = ctl.handle().unwrap();

        let tick = ctl.on_position_update(handle, 6_030).unwrap();
        assert_eq!(tick.position_ms, 6_000);
        assert_eq!(tick.active, Some(ActivePosition::new(1, Some(0))));
        assert!(tick.finished);

        let tick = ctl.on_position_update(handle, 6_080).unwrap();
        assert!(!tick.finished);
        assert_eq!(tick.active, Some(ActivePosition::new(1, Some(0))));
    }

    #[test]
    fn poll_position_only_while_playing() {
        let mut ctl = loaded(MockAudioEngine::default());
        assert!(ctl.poll_position().is_none());
        ctl.play().unwrap();
        ctl.seek(1_500).unwrap();
        assert_eq!(ctl.poll_position(), Some((ctl.handle().unwrap(), 1_500)));
    }

    #[test]
    fn shared_controller_is_shareable() {
        let shared = ControllerSlot::new().install(MockAudioEngine::default());
        let clone = Arc::clone(&shared);
        lock_controller(&shared).stop();
        assert_eq!(lock_controller(&clone).state(), PlaybackState::Stopped);
    }

    #[test]
    fn installing_a_controller_retires_the_previous_one() {
        let slot = ControllerSlot::new();
        let first = slot.install(MockAudioEngine::default());
        lock_controller(&first)
            .load(TimingTree::new(verse()), "gayatri.mp3", true)
            .unwrap();
        assert_eq!(lock_controller(&first).engine().live.len(), 1);

        let second = slot.install(MockAudioEngine::default());
        lock_controller(&second)
            .load(TimingTree::new(verse()), "gayatri.mp3", true)
            .unwrap();

        let a = lock_controller(&first);
        assert_eq!(a.state(), PlaybackState::Stopped);
        assert!(a.engine().live.is_empty());
        assert!(a.is_superseded());
        drop(a);
        assert_eq!(lock_controller(&second).engine().live.len(), 1);
        assert!(slot.is_active(&second));
        assert!(!slot.is_active(&first));
    }

    #[test]
    fn superseded_controller_refuses_to_load() {
        let slot = ControllerSlot::new();
        let first = slot.install(MockAudioEngine::default());
        let _second = slot.install(MockAudioEngine::default());

        let mut ctl = lock_controller(&first);
        let err = ctl
            .load(TimingTree::new(verse()), "gayatri.mp3", true)
            .unwrap_err();
        assert_eq!(err.code(), "load-failed");
        assert_eq!(ctl.state(), PlaybackState::Error);
        assert!(ctl.engine().live.is_empty());
        assert!(ctl.engine().calls.is_empty());
    }

    #[test]
    fn dropped_predecessor_is_skipped() {
        let slot = ControllerSlot::new();
        drop(slot.install(MockAudioEngine::default()));
        let second = slot.install(MockAudioEngine::default());
        assert!(slot.is_active(&second));
        assert_eq!(lock_controller(&second).state(), PlaybackState::Idle);
    }
}
