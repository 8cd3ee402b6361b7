//! Core `ChandasAnalyzer` trait and the `ApiAnalyzer` HTTP client.
//!
//! `ApiAnalyzer` posts a verse to the chandas identification service
//! (`POST {base_url}/chandas/identify`) and decodes the syllable breakdown
//! into [`SyllableToken`]s.  The service output is lossy: weight strings are
//! matched loosely and entries with an unknown weight are dropped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::prosody::{SyllableStream, SyllableToken, Weight};

// ---------------------------------------------------------------------------
// AnalysisError
// ---------------------------------------------------------------------------

/// Errors that can occur while asking the service for a syllable breakdown.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("chandas analysis timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("chandas service returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON.
    #[error("failed to parse chandas response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AnalysisError::Timeout
        } else {
            AnalysisError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ChandasAnalysis
// ---------------------------------------------------------------------------

/// One step of the service's identification walkthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationStep {
    pub step_number: u32,
    pub step_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub result: String,
}

/// Decoded identification result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChandasAnalysis {
    /// Meter name, e.g. `"Anushtup"`.  Empty when unidentified.
    pub chandas_name: String,
    /// Classified syllables in service order.
    pub tokens: Vec<SyllableToken>,
    /// Pattern as the service printed it (`"LGGLGGLG LGGLGGLG"`).
    pub pattern: String,
    pub explanation: String,
    pub confidence: f64,
    pub process: Vec<IdentificationStep>,
}

impl ChandasAnalysis {
    /// `true` when no syllable could be classified.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens ordered for alignment.
    pub fn stream(&self) -> SyllableStream {
        SyllableStream::new(self.tokens.clone())
    }
}

// ---- wire format ---

#[derive(Debug, Deserialize)]
struct WireSyllable {
    #[serde(default)]
    syllable: String,
    #[serde(default, rename = "type")]
    kind: String,
    position: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    chandas_name: String,
    #[serde(default)]
    syllable_breakdown: Vec<WireSyllable>,
    #[serde(default)]
    laghu_guru_pattern: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    identification_process: Vec<IdentificationStep>,
}

/// Decode a `/chandas/identify` response body.
///
/// Entries whose `type` is not a recognised weight are skipped with a
/// warning; a missing `position` falls back to the 1-based entry index.
pub fn decode_response(body: &str) -> Result<ChandasAnalysis, AnalysisError> {
    let wire: WireResponse =
        serde_json::from_str(body).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    let mut tokens = Vec::with_capacity(wire.syllable_breakdown.len());
    let mut dropped = 0usize;
    for (i, entry) in wire.syllable_breakdown.into_iter().enumerate() {
        match Weight::parse(&entry.kind) {
            Some(weight) => {
                let position = entry.position.unwrap_or(i as i64 + 1);
                tokens.push(SyllableToken::new(entry.syllable, weight, position));
            }
            None => {
                dropped += 1;
                log::warn!(
                    "analysis: dropping syllable {:?} with unknown type {:?}",
                    entry.syllable,
                    entry.kind
                );
            }
        }
    }
    if dropped > 0 {
        log::warn!("analysis: {dropped} syllable(s) had no usable weight");
    }

    Ok(ChandasAnalysis {
        chandas_name: wire.chandas_name,
        tokens,
        pattern: wire.laghu_guru_pattern,
        explanation: wire.explanation,
        confidence: wire.confidence.clamp(0.0, 1.0),
        process: wire.identification_process,
    })
}

// ---------------------------------------------------------------------------
// ChandasAnalyzer trait
// ---------------------------------------------------------------------------

/// Async source of syllable classifications for a verse.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn ChandasAnalyzer>`.
#[async_trait]
pub trait ChandasAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<ChandasAnalysis, AnalysisError>;
}

// ---------------------------------------------------------------------------
// ApiAnalyzer
// ---------------------------------------------------------------------------

/// Calls the chandas identification REST endpoint.
pub struct ApiAnalyzer {
    client: reqwest::Client,
    config: AnalysisConfig,
}

impl ApiAnalyzer {
    /// Build an `ApiAnalyzer` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chandas/identify", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChandasAnalyzer for ApiAnalyzer {
    async fn analyze(&self, text: &str) -> Result<ChandasAnalysis, AnalysisError> {
        let url = self.endpoint();
        log::debug!("analysis: POST {url} ({} chars)", text.chars().count());

        let body = serde_json::json!({ "shloka": text });
        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;
        let analysis = decode_response(&body)?;
        let name = if analysis.chandas_name.is_empty() {
            "unidentified"
        } else {
            analysis.chandas_name.as_str()
        };
        log::info!(
            "analysis: {name} ({} syllables, confidence {:.2})",
            analysis.tokens.len(),
            analysis.confidence
        );
        Ok(analysis)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
