//! Maps a playback position to the active line and word.
//!
//! Intervals are half-open `[start, end)`: a position equal to `end` belongs
//! to whatever starts there.  Two exceptions:
//!
//! * the final line of the verse, and the final word of that line, are closed
//!   on the right so a finished recitation keeps its last word lit;
//! * a zero-duration word `[t, t)` is active at exactly `t`.
//!
//! When several intervals contain the position (malformed data) the first in
//! authored order wins.  Well-ordered sequences are searched with
//! `partition_point`; anything else falls back to a linear first-match scan.
//!
//! A hint (the previous result) enables an O(1) check of the hinted word and
//! its successor.  The hint only ever short-cuts the search: whenever the
//! neighbourhood check cannot prove its answer equals the cold search, the
//! cold search runs.

use serde::Serialize;

use super::tree::{Interval, TimingTree};

/// Active line and, when the position is not in a pause, the active word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ActivePosition {
    pub line: usize,
    pub word: Option<usize>,
}

impl ActivePosition {
    pub fn new(line: usize, word: Option<usize>) -> Self {
        Self { line, word }
    }
}

/// Resolve `position_ms` against `tree`.
///
/// Returns `None` before the first line, after the last line and in any
/// pause between lines.
///
/// ```
/// use chandas_karaoke::timing::{resolve, ActivePosition, Line, TimingTree, Verse, Word};
///
/// let verse = Verse {
///     id: "v".into(),
///     text: "a b".into(),
///     audio: None,
///     lines: vec![
///         Line::from_words(0, 5850, vec![Word::new("a", 0, 5850)]),
///         Line::from_words(5850, 10330, vec![Word::new("b", 5850, 10330)]),
///     ],
/// };
/// let tree = TimingTree::new(verse);
/// assert_eq!(resolve(&tree, 5849, None), Some(ActivePosition::new(0, Some(0))));
/// assert_eq!(resolve(&tree, 5850, None), Some(ActivePosition::new(1, Some(0))));
/// assert_eq!(resolve(&tree, 10330, None), Some(ActivePosition::new(1, Some(0))));
/// assert_eq!(resolve(&tree, 10331, None), None);
/// ```
pub fn resolve(
    tree: &TimingTree,
    position_ms: u64,
    hint: Option<ActivePosition>,
) -> Option<ActivePosition> {
    if let Some(hint) = hint {
        if let Some(found) = resolve_near(tree, position_ms, hint) {
            return found;
        }
    }
    resolve_cold(tree, position_ms)
}

// ---------------------------------------------------------------------------
// Cold search
// ---------------------------------------------------------------------------

fn resolve_cold(tree: &TimingTree, p: u64) -> Option<ActivePosition> {
    let lines = tree.lines();
    let line = find(lines, p, true, tree.lines_ordered())?;
    Some(ActivePosition::new(line, resolve_word(tree, line, p)))
}

fn resolve_word(tree: &TimingTree, line: usize, p: u64) -> Option<usize> {
    let words = &tree.lines()[line].words;
    let closed = is_last(tree.lines().len(), line);
    find(words, p, closed, tree.words_ordered(line)).or_else(|| trailing_word(tree, line, p))
}

/// At the closing instant of the verse the last word stays lit, even when it
/// ends before its line does.
fn trailing_word(tree: &TimingTree, line: usize, p: u64) -> Option<usize> {
    let lines = tree.lines();
    if !is_last(lines.len(), line) || p != lines[line].end {
        return None;
    }
    let words = &lines[line].words;
    let last = words.len().checked_sub(1)?;
    (words[last].start <= p).then_some(last)
}

fn find<T: Interval>(items: &[T], p: u64, closed_last: bool, ordered: bool) -> Option<usize> {
    if items.is_empty() {
        return None;
    }
    let last = items.len() - 1;
    let hit = |i: usize| contains(&items[i], p, closed_last && i == last);

    if !ordered {
        return (0..items.len()).find(|&i| hit(i));
    }

    let upto = items.partition_point(|it| it.start_ms() <= p);
    if upto == 0 {
        return None;
    }
    // Only intervals sharing the latest start can contain `p` in an ordered
    // sequence; earlier ones end at or before it.
    let start = items[upto - 1].start_ms();
    let first = items[..upto].partition_point(|it| it.start_ms() < start);
    (first..upto).find(|&i| hit(i))
}

fn contains<T: Interval>(item: &T, p: u64, closed_right: bool) -> bool {
    let (start, end) = (item.start_ms(), item.end_ms());
    if start > p {
        return false;
    }
    p < end || (start == end && p == start) || (closed_right && p == end)
}

fn is_last(len: usize, index: usize) -> bool {
    index + 1 == len
}

// ---------------------------------------------------------------------------
// Hinted search
// ---------------------------------------------------------------------------

/// `Some(answer)` when the hint's neighbourhood settles the lookup, `None`
/// when a cold search is needed.
fn resolve_near(tree: &TimingTree, p: u64, hint: ActivePosition) -> Option<Option<ActivePosition>> {
    if !tree.lines_ordered() {
        return None;
    }
    let lines = tree.lines();
    let line = [hint.line, hint.line.saturating_add(1)]
        .into_iter()
        .filter(|&i| i < lines.len())
        .find(|&i| contains(&lines[i], p, is_last(lines.len(), i)))?;
    if !first_at_start(lines, line) {
        return None;
    }

    if !tree.words_ordered(line) {
        return Some(Some(ActivePosition::new(line, resolve_word(tree, line, p))));
    }

    let words = &lines[line].words;
    let closed = is_last(lines.len(), line);
    let hit = |i: usize| contains(&words[i], p, closed && is_last(words.len(), i));

    let word = if line == hint.line {
        let w = hint.word?;
        if w >= words.len() {
            return None;
        }
        if hit(w) {
            Some(w)
        } else if w + 1 < words.len() && hit(w + 1) {
            Some(w + 1)
        } else if p >= words[w].end && words.get(w + 1).map_or(true, |next| p < next.start) {
            // Pause after the hinted word.
            None
        } else {
            return None;
        }
    } else {
        match words.first() {
            None => None,
            Some(_) if hit(0) => Some(0),
            Some(first) if p < first.start => None,
            Some(_) => return None,
        }
    };

    if let Some(w) = word {
        if !first_at_start(words, w) {
            return None;
        }
    }
    let word = word.or_else(|| trailing_word(tree, line, p));
    Some(Some(ActivePosition::new(line, word)))
}

/// In an ordered sequence only an earlier interval with the same start can
/// also contain a position; when there is none, `index` is the first match.
fn first_at_start<T: Interval>(items: &[T], index: usize) -> bool {
    index == 0 || items[index - 1].start_ms() < items[index].start_ms()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::tree::{Line, Verse, Word};

    fn verse(lines: Vec<Line>) -> TimingTree {
        TimingTree::new(Verse {
            id: "t".into(),
            text: String::new(),
            audio: None,
            lines,
        })
    }

    fn w(s: u64, e: u64) -> Word {
        Word::new("w", s, e)
    }

    /// Two contiguous lines, the second with an internal pause.
    fn two_lines() -> TimingTree {
        verse(vec![
            Line::from_words(0, 5850, vec![w(0, 1150), w(1150, 2900), w(2900, 5850)]),
            Line::from_words(5850, 10330, vec![w(5850, 7000), w(7400, 10330)]),
        ])
    }

    fn at(line: usize, word: Option<usize>) -> Option<ActivePosition> {
        Some(ActivePosition::new(line, word))
    }

    // ---- Boundaries -----------------------------------------------------------

    #[test]
    fn line_boundary_belongs_to_next_line() {
        let tree = two_lines();
        assert_eq!(resolve(&tree, 5849, None), at(0, Some(2)));
        assert_eq!(resolve(&tree, 5850, None), at(1, Some(0)));
    }

    #[test]
    fn line_start_resolves_first_word() {
        let tree = two_lines();
        assert_eq!(resolve(&tree, 0, None), at(0, Some(0)));
        assert_eq!(resolve(&tree, 1150, None), at(0, Some(1)));
    }

    #[test]
    fn end_of_verse_keeps_last_word() {
        let tree = two_lines();
        assert_eq!(resolve(&tree, 10330, None), at(1, Some(1)));
        assert_eq!(resolve(&tree, 10331, None), None);
    }

    #[test]
    fn end_of_verse_keeps_last_word_after_trailing_silence() {
        let tree = verse(vec![Line::from_words(0, 1_000, vec![w(0, 400), w(400, 900)])]);
        assert_eq!(resolve(&tree, 950, None), at(0, None));
        assert_eq!(resolve(&tree, 1_000, None), at(0, Some(1)));
        assert_eq!(resolve(&tree, 1_000, at(0, Some(1))), at(0, Some(1)));
        assert_eq!(resolve(&tree, 1_000, at(0, None)), at(0, Some(1)));
    }

    #[test]
    fn before_first_line_is_none() {
        let tree = verse(vec![Line::from_words(500, 900, vec![w(500, 900)])]);
        assert_eq!(resolve(&tree, 0, None), None);
        assert_eq!(resolve(&tree, 499, None), None);
        assert_eq!(resolve(&tree, 500, None), at(0, Some(0)));
    }

    #[test]
    fn pause_between_words_has_no_word() {
        let tree = two_lines();
        assert_eq!(resolve(&tree, 7000, None), at(1, None));
        assert_eq!(resolve(&tree, 7399, None), at(1, None));
        assert_eq!(resolve(&tree, 7400, None), at(1, Some(1)));
    }

    #[test]
    fn pause_between_lines_has_no_line() {
        let tree = verse(vec![
            Line::from_words(0, 100, vec![w(0, 100)]),
            Line::from_words(200, 300, vec![w(200, 300)]),
        ]);
        assert_eq!(resolve(&tree, 100, None), None);
        assert_eq!(resolve(&tree, 199, None), None);
        assert_eq!(resolve(&tree, 200, None), at(1, Some(0)));
    }

    #[test]
    fn zero_duration_word_is_instantaneously_active() {
        let tree = verse(vec![Line::from_words(
            0,
            300,
            vec![w(0, 100), w(100, 100), w(100, 300)],
        )]);
        assert_eq!(resolve(&tree, 99, None), at(0, Some(0)));
        assert_eq!(resolve(&tree, 100, None), at(0, Some(1)));
        assert_eq!(resolve(&tree, 101, None), at(0, Some(2)));
    }

    #[test]
    fn line_without_words_resolves_line_only() {
        let tree = verse(vec![Line::from_words(0, 100, vec![])]);
        assert_eq!(resolve(&tree, 50, None), at(0, None));
    }

    #[test]
    fn empty_tree_is_always_none() {
        let tree = verse(vec![]);
        assert_eq!(resolve(&tree, 0, None), None);
        assert_eq!(resolve(&tree, 0, Some(ActivePosition::new(0, Some(0)))), None);
    }

    // ---- Malformed data ---------------------------------------------------------

    #[test]
    fn overlapping_lines_first_match_wins() {
        let tree = verse(vec![
            Line::from_words(0, 200, vec![w(0, 200)]),
            Line::from_words(100, 300, vec![w(100, 300)]),
        ]);
        assert!(!tree.lines_ordered());
        assert_eq!(resolve(&tree, 150, None), at(0, Some(0)));
        assert_eq!(resolve(&tree, 250, None), at(1, Some(0)));
    }

    #[test]
    fn decreasing_starts_do_not_crash() {
        let tree = verse(vec![
            Line::from_words(500, 900, vec![w(800, 900), w(500, 800)]),
            Line::from_words(0, 400, vec![w(0, 400)]),
        ]);
        assert_eq!(resolve(&tree, 600, None), at(0, Some(1)));
        assert_eq!(resolve(&tree, 100, None), at(1, Some(0)));
        assert_eq!(resolve(&tree, 450, None), None);
    }

    #[test]
    fn inverted_word_never_matches() {
        let tree = verse(vec![Line::from_words(0, 100, vec![w(60, 40)])]);
        assert_eq!(resolve(&tree, 50, None), at(0, None));
    }

    // ---- Hint -------------------------------------------------------------------

    #[test]
    fn hint_fast_path_covers_steady_playback() {
        let tree = two_lines();
        let hint = ActivePosition::new(0, Some(0));
        assert_eq!(resolve_near(&tree, 1000, hint), Some(at(0, Some(0))));
        assert_eq!(resolve_near(&tree, 1150, hint), Some(at(0, Some(1))));
        let last = ActivePosition::new(0, Some(2));
        assert_eq!(resolve_near(&tree, 5850, last), Some(at(1, Some(0))));
        let in_pause = ActivePosition::new(1, Some(0));
        assert_eq!(resolve_near(&tree, 7100, in_pause), Some(at(1, None)));
    }

    #[test]
    fn far_hint_defers_to_cold_search() {
        let tree = two_lines();
        let hint = ActivePosition::new(0, Some(0));
        assert_eq!(resolve_near(&tree, 9000, hint), None);
        assert_eq!(resolve(&tree, 9000, Some(hint)), at(1, Some(1)));
    }

    fn trees() -> Vec<TimingTree> {
        vec![
            two_lines(),
            verse(vec![
                Line::from_words(10, 50, vec![w(10, 20), w(20, 20), w(20, 30), w(35, 50)]),
                Line::from_words(50, 50, vec![]),
                Line::from_words(50, 90, vec![w(50, 50), w(55, 90)]),
                Line::from_words(95, 120, vec![w(100, 110)]),
            ]),
            verse(vec![
                Line::from_words(0, 60, vec![w(0, 40), w(30, 60)]),
                Line::from_words(40, 100, vec![w(40, 100)]),
                Line::from_words(20, 30, vec![w(20, 30)]),
            ]),
            verse(vec![Line::from_words(0, 0, vec![w(0, 0)])]),
        ]
    }

    #[test]
    fn any_hint_gives_the_cold_answer() {
        for tree in trees() {
            let end = tree.duration_ms() + 5;
            let mut hints = vec![None];
            for line in 0..tree.lines().len() + 2 {
                hints.push(Some(ActivePosition::new(line, None)));
                for word in 0..6 {
                    hints.push(Some(ActivePosition::new(line, Some(word))));
                }
            }
            for p in 0..=end {
                let cold = resolve(&tree, p, None);
                for hint in &hints {
                    assert_eq!(resolve(&tree, p, *hint), cold, "p={p} hint={hint:?}");
                }
            }
        }
    }

    #[test]
    fn ordered_search_matches_linear_scan() {
        for tree in trees() {
            for p in 0..=tree.duration_ms() + 5 {
                let lines = tree.lines();
                let linear_line = find(lines, p, true, false);
                assert_eq!(find(lines, p, true, tree.lines_ordered()), linear_line);
                if let Some(l) = linear_line {
                    let closed = is_last(lines.len(), l);
                    assert_eq!(
                        find(&lines[l].words, p, closed, tree.words_ordered(l)),
                        find(&lines[l].words, p, closed, false)
                    );
                }
            }
        }
    }
}
