//! Terminal presentation for the CLI: weight-coloured verse text, grouped
//! pattern tables and the karaoke line.

pub mod terminal;

pub use terminal::{
    format_clock, karaoke_line, paint_aligned, pattern_table, status_line, Palette,
};
