//! Sanskrit verse syllable-weight alignment and time-indexed karaoke
//! highlighting.
//!
//! * [`prosody`]: classifier tokens, alignment onto verse text, L/G patterns.
//! * [`timing`]: Verse → Line → Word timing tree and the position resolver.
//! * [`playback`]: audio engine seam, transport controller, async session.
//! * [`analysis`]: client for the chandas identification service.
//! * [`render`]: terminal presentation.
//! * [`config`]: TOML settings.

pub mod analysis;
pub mod config;
pub mod playback;
pub mod prosody;
pub mod render;
pub mod timing;
