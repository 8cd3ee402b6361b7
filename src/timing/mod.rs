//! Recitation timing: the Verse → Line → Word interval tree and the
//! position resolver that drives karaoke highlighting.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use chandas_karaoke::timing::{resolve, TimingTree, Verse};
//!
//! let verse = Verse::load(std::path::Path::new("verses/gayatri.json")).unwrap();
//! let tree = TimingTree::checked(verse); // logs data-quality warnings
//!
//! let mut hint = None;
//! for position_ms in (0..tree.duration_ms()).step_by(50) {
//!     hint = resolve(&tree, position_ms, hint);
//!     if let Some(active) = hint {
//!         println!("{position_ms} ms → line {} word {:?}", active.line, active.word);
//!     }
//! }
//! ```

pub mod resolver;
pub mod tree;

pub use resolver::{resolve, ActivePosition};
pub use tree::{DataWarning, Interval, Line, TimingError, TimingTree, Verse, Word};
