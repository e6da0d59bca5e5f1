//! Scripted stand-ins for the external model collaborators.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::AppError;
use crate::nlu::{NerProvider, NerSpan, OracleClassifier, OracleRanking};

/// Returns a fixed label/score pair and counts how often it is asked.
pub struct ScriptedOracle {
    pub label: &'static str,
    pub score: f32,
    pub calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(label: &'static str, score: f32) -> Self {
        Self {
            label,
            score,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OracleClassifier for ScriptedOracle {
    async fn classify(
        &self,
        _text: &str,
        _candidate_labels: &[&'static str],
    ) -> Result<OracleRanking, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(OracleRanking {
            labels: vec![self.label.to_string()],
            scores: vec![self.score],
        })
    }
}

/// Always fails, as an unreachable model service would.
pub struct FailingOracle;

#[async_trait]
impl OracleClassifier for FailingOracle {
    async fn classify(
        &self,
        _text: &str,
        _candidate_labels: &[&'static str],
    ) -> Result<OracleRanking, AppError> {
        Err(AppError::Oracle("connection refused".to_string()))
    }
}

/// Returns a fixed span list for every input.
pub struct ScriptedNer(pub Vec<NerSpan>);

#[async_trait]
impl NerProvider for ScriptedNer {
    async fn ner(&self, _text: &str) -> Result<Vec<NerSpan>, AppError> {
        Ok(self.0.clone())
    }
}
