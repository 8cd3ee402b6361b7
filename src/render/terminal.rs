//! ANSI terminal presentation of aligned verses and the karaoke line.

use crate::config::RenderConfig;
use crate::playback::PlaybackState;
use crate::prosody::{render_segments, AlignedText, SpanWeight, SyllableToken, TextPiece, WeightCounts};
use crate::timing::{ActivePosition, TimingTree};

const RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// SGR styles per weight class, or plain text when colour is off.
#[derive(Debug, Clone)]
pub struct Palette {
    enabled: bool,
    heavy: String,
    light: String,
    unclassified: String,
    active: String,
}

impl Palette {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            enabled: config.colour,
            heavy: config.heavy_colour.clone(),
            light: config.light_colour.clone(),
            unclassified: config.unclassified_colour.clone(),
            active: config.active_colour.clone(),
        }
    }

    /// A palette that never emits escapes.
    pub fn plain() -> Self {
        Self::from_config(&RenderConfig {
            colour: false,
            ..RenderConfig::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn style(&self, weight: SpanWeight) -> &str {
        match weight {
            SpanWeight::Heavy => &self.heavy,
            SpanWeight::Light => &self.light,
            SpanWeight::Unclassified => &self.unclassified,
        }
    }

    /// Wrap `text` in the SGR sequence `code`.
    pub fn paint(&self, text: &str, code: &str) -> String {
        if !self.enabled || code.is_empty() || text.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}{RESET}")
    }

    pub fn paint_weight(&self, text: &str, weight: SpanWeight) -> String {
        self.paint(text, self.style(weight))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Verse rendering
// ---------------------------------------------------------------------------

/// The aligned text with each span coloured by weight.  Whitespace is kept
/// verbatim, so stripping the escapes gives back the source text.
pub fn paint_aligned(aligned: &AlignedText, palette: &Palette) -> String {
    let mut out = String::new();
    for piece in &aligned.pieces {
        match piece {
            TextPiece::Word(word) => {
                for span in &word.spans {
                    out.push_str(&palette.paint_weight(&span.text, span.weight));
                }
            }
            TextPiece::Gap { text } => out.push_str(text),
        }
    }
    out
}

/// One row per pattern group: `[n] LGGLGGLG  va su de va ...`, followed by
/// a laghu/guru tally.
pub fn pattern_table(tokens: &[SyllableToken], group_size: usize, palette: &Palette) -> String {
    let mut out = String::new();
    for segment in render_segments(tokens, group_size) {
        let symbols: String = segment
            .weights
            .iter()
            .zip(segment.pattern.chars())
            .map(|(w, c)| palette.paint_weight(&c.to_string(), SpanWeight::from(*w)))
            .collect();
        out.push_str(&format!(
            "[{}] {}  {}\n",
            segment.index + 1,
            symbols,
            segment.syllables.join(" ")
        ));
    }
    let counts = WeightCounts::of(tokens);
    out.push_str(&format!(
        "laghu: {}, guru: {}, syllables: {}, matras: {}",
        counts.laghu,
        counts.guru,
        counts.syllables(),
        counts.matras()
    ));
    out
}

// ---------------------------------------------------------------------------
// Karaoke rendering
// ---------------------------------------------------------------------------

/// The active line with the active word highlighted.
///
/// Lines without word timing show their text unhighlighted; a `None` position
/// (before, between or after lines) renders as an empty string.
pub fn karaoke_line(tree: &TimingTree, active: Option<ActivePosition>, palette: &Palette) -> String {
    let Some(active) = active else {
        return String::new();
    };
    let Some(line) = tree.line(active.line) else {
        return String::new();
    };
    if line.words.is_empty() {
        return line.text.clone();
    }

    line.words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if Some(i) == active.word {
                palette.paint(&word.text, &palette.active)
            } else {
                word.text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `m:ss.mmm`
pub fn format_clock(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let millis = ms % 1000;
    format!("{minutes}:{seconds:02}.{millis:03}")
}

fn state_icon(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "  ",
        PlaybackState::Loading => ". ",
        PlaybackState::Playing => "> ",
        PlaybackState::Paused => "||",
        PlaybackState::Stopped => "[]",
        PlaybackState::Error => "! ",
    }
}

/// `> 0:01.250 / 0:10.330  Playing`
pub fn status_line(state: PlaybackState, position_ms: u64, duration_ms: u64) -> String {
    format!(
        "{} {} / {}  {}",
        state_icon(state),
        format_clock(position_ms),
        format_clock(duration_ms),
        state.label()
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
