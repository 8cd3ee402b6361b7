//! Fallback analyzer: wraps any [`ChandasAnalyzer`] and degrades to an empty
//! analysis on error.
//!
//! An empty analysis aligns to fully unclassified text, so the verse still
//! renders when the service is down.

use async_trait::async_trait;

use crate::analysis::client::{AnalysisError, ChandasAnalysis, ChandasAnalyzer};

pub struct FallbackAnalyzer<A: ChandasAnalyzer> {
    inner: A,
}

impl<A: ChandasAnalyzer> FallbackAnalyzer<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: ChandasAnalyzer> ChandasAnalyzer for FallbackAnalyzer<A> {
    /// Never returns `Err(_)`.
    async fn analyze(&self, text: &str) -> Result<ChandasAnalysis, AnalysisError> {
        match self.inner.analyze(text).await {
            Ok(analysis) => Ok(analysis),
            Err(err) => {
                log::warn!("chandas analysis failed ({err}); rendering unclassified");
                Ok(ChandasAnalysis::default())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
