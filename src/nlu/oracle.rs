//! External classifier collaborators.
//!
//! The zero-shot oracle and the NER tagger live outside this crate (they
//! are large pretrained models); these traits are the narrow seams the
//! host implements. `FallbackOracleAdapter` wraps the oracle so that a
//! collaborator failure degrades to an `unknown` classification instead
//! of propagating.

use super::entities::NerSpan;
use super::intent::Intent;
use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// A ranked classification from the zero-shot oracle. `labels` and
/// `scores` are parallel, best first, scores in [0, 1].
#[derive(Debug, Clone)]
pub struct OracleRanking {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

/// The external zero-shot classifier.
#[async_trait]
pub trait OracleClassifier: Send + Sync + 'static {
    /// Ranks `candidate_labels` for the text. Expensive; called at most
    /// once per utterance.
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&'static str],
    ) -> Result<OracleRanking, AppError>;
}

/// The external named-entity recognizer.
#[async_trait]
pub trait NerProvider: Send + Sync + 'static {
    /// Tags entity spans in document order.
    async fn ner(&self, text: &str) -> Result<Vec<NerSpan>, AppError>;
}

/// A no-op NER provider for hosts that run without a tagger.
pub struct NullNer;

#[async_trait]
impl NerProvider for NullNer {
    async fn ner(&self, _text: &str) -> Result<Vec<NerSpan>, AppError> {
        Ok(Vec::new())
    }
}

/// Wraps the oracle with the degradation policy: one call per utterance,
/// no retries, and any failure yields `(Intent::Unknown, 0.0)`.
pub struct FallbackOracleAdapter {
    oracle: Arc<dyn OracleClassifier>,
}

impl FallbackOracleAdapter {
    pub fn new(oracle: Arc<dyn OracleClassifier>) -> Self {
        Self { oracle }
    }

    /// Consults the oracle and reduces its ranking to the top pair.
    /// Never fails: collaborator errors, empty rankings and unrecognized
    /// labels all degrade to `(Unknown, 0.0)`.
    pub async fn classify(&self, text: &str) -> (Intent, f32) {
        match self.oracle.classify(text, Intent::candidate_labels()).await {
            Ok(ranking) => {
                let top = ranking
                    .labels
                    .first()
                    .zip(ranking.scores.first())
                    .and_then(|(label, score)| Intent::from_label(label).map(|i| (i, *score)));
                match top {
                    Some(pair) => pair,
                    None => {
                        warn!("oracle returned an empty or unrecognized ranking");
                        (Intent::Unknown, 0.0)
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "oracle unavailable; degrading to unknown");
                (Intent::Unknown, 0.0)
            }
        }
    }
}
