//! Syllable-weight handling: classifier tokens, text alignment and patterns.
//!
//! ```text
//! analysis service ──▶ SyllableToken[] ──▶ SyllableStream (ordered by position)
//!                                              │
//!                       verse text ───────────▶├─▶ Aligner ──▶ AlignedText (spans)
//!                                              └─▶ to_pattern / render_segments
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use chandas_karaoke::prosody::{align_text, to_pattern, SyllableStream, SyllableToken, Weight};
//!
//! let tokens = vec![
//!     SyllableToken::new("भु", Weight::Heavy, 0),
//!     SyllableToken::new("वः", Weight::Light, 1),
//! ];
//! let aligned = align_text("भुवः", &SyllableStream::new(tokens.clone()));
//! assert_eq!(aligned.to_text(), "भुवः");
//! assert_eq!(to_pattern(&tokens), "GL");
//! ```

pub mod align;
pub mod pattern;
pub mod token;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use align::{
    align_text, align_word, AlignCursor, AlignedSpan, AlignedText, AlignedWord, Aligner,
    SpanWeight, TextPiece, DEFAULT_MAX_SKIP,
};
pub use pattern::{
    grouped_pattern, render_segments, to_pattern, Segment, WeightCounts, DEFAULT_GROUP_SIZE,
};
pub use token::{SyllableStream, SyllableToken, Weight};
