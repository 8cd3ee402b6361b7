//! Compact laghu/guru pattern strings and fixed-size display grouping.
//!
//! These work on the token stream directly, never on aligned spans, so a
//! mismatch between tokens and text cannot affect them.

use serde::Serialize;

use super::token::{SyllableToken, Weight};

/// Default group size: one quarter (pāda) of an anuṣṭubh verse.
pub const DEFAULT_GROUP_SIZE: usize = 8;

fn ordered(tokens: &[SyllableToken]) -> Vec<&SyllableToken> {
    let mut refs: Vec<&SyllableToken> = tokens.iter().collect();
    refs.sort_by_key(|t| t.position);
    refs
}

/// `G`/`L` string in `position` order.
///
/// ```
/// use chandas_karaoke::prosody::{to_pattern, SyllableToken, Weight};
///
/// let tokens = vec![
///     SyllableToken::new("वः", Weight::Light, 1),
///     SyllableToken::new("भु", Weight::Heavy, 0),
/// ];
/// assert_eq!(to_pattern(&tokens), "GL");
/// ```
pub fn to_pattern(tokens: &[SyllableToken]) -> String {
    ordered(tokens).iter().map(|t| t.weight.symbol()).collect()
}

/// A fixed-size run of consecutive tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub index: usize,
    pub pattern: String,
    pub syllables: Vec<String>,
    pub weights: Vec<Weight>,
}

/// Group tokens into consecutive segments of `group_size`; the last segment
/// may be shorter.  A `group_size` of zero yields a single segment.
pub fn render_segments(tokens: &[SyllableToken], group_size: usize) -> Vec<Segment> {
    let tokens = ordered(tokens);
    if tokens.is_empty() {
        return Vec::new();
    }
    let size = if group_size == 0 { tokens.len() } else { group_size };

    tokens
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| Segment {
            index,
            pattern: chunk.iter().map(|t| t.weight.symbol()).collect(),
            syllables: chunk.iter().map(|t| t.syllable.clone()).collect(),
            weights: chunk.iter().map(|t| t.weight).collect(),
        })
        .collect()
}

/// Space-separated grouped pattern, e.g. `LGGLGGLG LGGLGGLG`.
pub fn grouped_pattern(tokens: &[SyllableToken], group_size: usize) -> String {
    render_segments(tokens, group_size)
        .into_iter()
        .map(|s| s.pattern)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Laghu/guru tallies for a token stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WeightCounts {
    pub guru: usize,
    pub laghu: usize,
}

impl WeightCounts {
    pub fn of(tokens: &[SyllableToken]) -> Self {
        tokens.iter().fold(Self::default(), |mut acc, t| {
            match t.weight {
                Weight::Heavy => acc.guru += 1,
                Weight::Light => acc.laghu += 1,
            }
            acc
        })
    }

    pub fn syllables(&self) -> usize {
        self.guru + self.laghu
    }

    /// Total mātrā count.
    pub fn matras(&self) -> usize {
        self.guru * 2 + self.laghu
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
