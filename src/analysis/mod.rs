//! Syllable classification from the chandas identification service.
//!
//! * [`ChandasAnalyzer`]: async trait implemented by all analyzer backends.
//! * [`ApiAnalyzer`]: REST client for `POST /chandas/identify`.
//! * [`FallbackAnalyzer`]: wraps any analyzer; yields an empty analysis on failure.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use chandas_karaoke::analysis::{ApiAnalyzer, ChandasAnalyzer, FallbackAnalyzer};
//! use chandas_karaoke::config::AppConfig;
//! use chandas_karaoke::prosody::align_text;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let analyzer = FallbackAnalyzer::new(ApiAnalyzer::from_config(&config.analysis));
//!
//!     let verse = "वसुदेवसुतं देवं कंसचाणूरमर्दनम्";
//!     let analysis = analyzer.analyze(verse).await.unwrap();
//!     let aligned = align_text(verse, &analysis.stream());
//!     println!("{} → {} spans", analysis.chandas_name, aligned.spans().count());
//! }
//! ```

pub mod client;
pub mod fallback;

pub use client::{
    decode_response, AnalysisError, ApiAnalyzer, ChandasAnalysis, ChandasAnalyzer,
    IdentificationStep,
};
pub use fallback::FallbackAnalyzer;
