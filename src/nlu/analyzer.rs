//! NLU orchestrator.
//!
//! Coordinates the two-tier classification (the pattern cascade first,
//! the zero-shot oracle only when no rule matches) together with entity
//! extraction, and assembles one immutable `ClassificationResult` per
//! utterance.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use tracing::{info, warn};

use super::cascade::PatternCascadeClassifier;
use super::entities::{EntityBag, EntityExtractor};
use super::intent::{ConfidenceTier, Intent};
use super::normalizer::normalize;
use super::oracle::{FallbackOracleAdapter, NerProvider, OracleClassifier};
use crate::error::AppError;

/// Inputs shorter than this (after normalization) are rejected as noise.
const MIN_INPUT_LEN: usize = 3;

static REMOVAL_VERBS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(remove|delete|kick|eliminate)\b").expect("invalid removal verb pattern")
});

/// The outcome of classifying one utterance. Produced fresh per
/// utterance and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The normalized query text.
    pub query: String,
    /// Classified intent.
    pub intent: Intent,
    /// Extracted entities.
    pub entities: EntityBag,
    /// Confidence tier derived from `score`.
    pub tier: ConfidenceTier,
    /// The numeric score behind the tier.
    pub score: f32,
    /// Wall time spent classifying, in milliseconds.
    pub elapsed_ms: u64,
    /// When the classification was produced.
    pub timestamp: DateTime<Utc>,
}

impl ClassificationResult {
    fn unclassified(query: String, elapsed_ms: u64) -> Self {
        Self {
            query,
            intent: Intent::Unknown,
            entities: EntityBag::default(),
            tier: ConfidenceTier::Low,
            score: 0.0,
            elapsed_ms,
            timestamp: Utc::now(),
        }
    }

    /// One-line summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "intent={} tier={:?} score={:.2} elapsed={}ms",
            self.intent, self.tier, self.score, self.elapsed_ms
        )
    }
}

/// Two-tier intent/entity analyzer.
pub struct NluAnalyzer {
    cascade: PatternCascadeClassifier,
    extractor: EntityExtractor,
    oracle: FallbackOracleAdapter,
    ner: Arc<dyn NerProvider>,
}

impl NluAnalyzer {
    pub fn new(oracle: Arc<dyn OracleClassifier>, ner: Arc<dyn NerProvider>) -> Self {
        Self {
            cascade: PatternCascadeClassifier::new(),
            extractor: EntityExtractor::new(),
            oracle: FallbackOracleAdapter::new(oracle),
            ner,
        }
    }

    /// Classifies one utterance.
    ///
    /// Empty or too-short input yields `(Unknown, Low)` rather than an
    /// error. The only error path is a confidence score outside [0, 1],
    /// which indicates a broken oracle contract.
    pub async fn analyze(&self, raw: &str) -> Result<ClassificationResult, AppError> {
        let start = Instant::now();
        let text = normalize(raw);

        if text.len() < MIN_INPUT_LEN {
            return Ok(ClassificationResult::unclassified(
                text,
                start.elapsed().as_millis() as u64,
            ));
        }

        // Tier 1: the pattern cascade, first match wins.
        if let Some(hit) = self.cascade.classify(&text) {
            let mut entities = self.extractor.extract(&text, &[]);
            // rule captures are more precise than the generic chains
            for (field, value) in &hit.captures {
                entities.set(field, value);
            }
            let tier = ConfidenceTier::from_score(hit.score)?;
            let result = ClassificationResult {
                query: text,
                intent: hit.intent,
                entities,
                tier,
                score: hit.score,
                elapsed_ms: start.elapsed().as_millis() as u64,
                timestamp: Utc::now(),
            };
            info!(cascade = true, "{}", result.summary());
            return Ok(result);
        }

        // Tier 2: NER hints plus the zero-shot oracle.
        let hints = match self.ner.ner(&text).await {
            Ok(spans) => spans,
            Err(err) => {
                warn!(error = %err, "NER collaborator failed; extracting without hints");
                Vec::new()
            }
        };
        let entities = self.extractor.extract(&text, &hints);
        let (oracle_intent, score) = self.oracle.classify(&text).await;
        let intent = post_process(oracle_intent, &entities, &text);
        let tier = ConfidenceTier::from_score(score)?;

        let result = ClassificationResult {
            query: text,
            intent,
            entities,
            tier,
            score,
            elapsed_ms: start.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        };
        info!(cascade = false, "{}", result.summary());
        Ok(result)
    }
}

/// Domain-specific corrections applied to the oracle's pick.
fn post_process(intent: Intent, entities: &EntityBag, text: &str) -> Intent {
    // a team name alongside "list teams" is really a lookup for that team
    if intent == Intent::ListTeams && entities.team().is_some() {
        return Intent::ShowTeamInfo;
    }
    // a removal verb plus a person name outranks whatever the oracle said
    if entities.name.is_some() && REMOVAL_VERBS.is_match(text) {
        return Intent::RemoveMember;
    }
    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlu::oracle::{NullNer, OracleRanking};
    use async_trait::async_trait;

    struct FixedOracle {
        label: &'static str,
        score: f32,
    }

    #[async_trait]
    impl crate::nlu::oracle::OracleClassifier for FixedOracle {
        async fn classify(
            &self,
            _text: &str,
            _candidate_labels: &[&'static str],
        ) -> Result<OracleRanking, AppError> {
            Ok(OracleRanking {
                labels: vec![self.label.to_string()],
                scores: vec![self.score],
            })
        }
    }

    fn analyzer(label: &'static str, score: f32) -> NluAnalyzer {
        NluAnalyzer::new(Arc::new(FixedOracle { label, score }), Arc::new(NullNer))
    }

    #[tokio::test]
    async fn test_cascade_hit_is_high_confidence() {
        // the oracle would say list_teams, but the cascade must win and
        // never be consulted
        let analyzer = analyzer("list_teams", 0.99);
        let result = analyzer.analyze("delete team Avengers").await.unwrap();
        assert_eq!(result.intent, Intent::DeleteTeam);
        assert_eq!(result.tier, ConfidenceTier::High);
        assert_eq!(result.score, crate::config::CASCADE_SCORE);
        assert_eq!(result.entities.team_name.as_deref(), Some("Avengers"));
    }

    #[tokio::test]
    async fn test_short_input_rejected() {
        let analyzer = analyzer("greeting", 0.9);
        let result = analyzer.analyze("  hm ").await.unwrap();
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.tier, ConfidenceTier::Low);
    }

    #[tokio::test]
    async fn test_oracle_path_uses_oracle_score() {
        let analyzer = analyzer("get_member_info", 0.62);
        let result = analyzer
            .analyze("I was wondering what Zoe has been doing lately")
            .await
            .unwrap();
        assert_eq!(result.intent, Intent::GetMemberInfo);
        assert_eq!(result.tier, ConfidenceTier::Medium);
        assert_eq!(result.score, 0.62);
    }

    #[tokio::test]
    async fn test_score_out_of_range_is_fatal() {
        let analyzer = analyzer("help", 1.7);
        let err = analyzer
            .analyze("something nobody has a rule for, honestly")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ScoreOutOfRange(_)));
    }

    #[tokio::test]
    async fn test_post_process_list_teams_with_team_name() {
        let mut entities = EntityBag::default();
        entities.set("team_name", "Apollo");
        assert_eq!(
            post_process(Intent::ListTeams, &entities, "whatever"),
            Intent::ShowTeamInfo
        );
        assert_eq!(
            post_process(Intent::ListTeams, &EntityBag::default(), "whatever"),
            Intent::ListTeams
        );
    }

    #[tokio::test]
    async fn test_post_process_removal_verb() {
        let mut entities = EntityBag::default();
        entities.set("name", "Alex");
        assert_eq!(
            post_process(Intent::AssignRole, &entities, "please kick Alex out"),
            Intent::RemoveMember
        );
    }

    #[tokio::test]
    async fn test_cascade_captures_override_extractor() {
        let analyzer = analyzer("unknown", 0.0);
        let result = analyzer
            .analyze("update members of Bravo to Carol, David")
            .await
            .unwrap();
        assert_eq!(result.intent, Intent::UpdateTeamMembers);
        assert_eq!(result.entities.team_name.as_deref(), Some("Bravo"));
        assert_eq!(
            result.entities.members,
            Some(vec!["Carol".to_string(), "David".to_string()])
        );
    }
}
