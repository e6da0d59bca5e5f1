//! Classification pipeline tests with scripted collaborators.

use std::sync::Arc;

use super::doubles::{FailingOracle, ScriptedNer, ScriptedOracle};
use crate::config::CASCADE_SCORE;
use crate::nlu::{ConfidenceTier, Intent, NerSpan, NluAnalyzer, NullNer};

#[tokio::test]
async fn test_cascade_hit_skips_the_oracle() {
    let oracle = Arc::new(ScriptedOracle::new("list_teams", 0.99));
    let analyzer = NluAnalyzer::new(oracle.clone(), Arc::new(NullNer));

    let result = analyzer
        .analyze("assign John as developer in team Apollo")
        .await
        .unwrap();

    assert_eq!(result.intent, Intent::AssignRole);
    assert_eq!(result.score, CASCADE_SCORE);
    assert_eq!(result.entities.name.as_deref(), Some("John"));
    assert_eq!(result.entities.role.as_deref(), Some("developer"));
    assert_eq!(result.entities.team_name.as_deref(), Some("Apollo"));
    assert_eq!(oracle.call_count(), 0);
}

#[tokio::test]
async fn test_oracle_consulted_exactly_once_on_fallback() {
    let oracle = Arc::new(ScriptedOracle::new("get_member_info", 0.7));
    let analyzer = NluAnalyzer::new(oracle.clone(), Arc::new(NullNer));

    let result = analyzer
        .analyze("could you tell me what our newest colleague is up to")
        .await
        .unwrap();

    assert_eq!(result.intent, Intent::GetMemberInfo);
    assert_eq!(result.tier, ConfidenceTier::Medium);
    assert_eq!(oracle.call_count(), 1);
}

#[tokio::test]
async fn test_ner_hints_feed_the_extractor() {
    let oracle = Arc::new(ScriptedOracle::new("get_member_info", 0.7));
    let ner = Arc::new(ScriptedNer(vec![NerSpan::new("PER", "Priya")]));
    let analyzer = NluAnalyzer::new(oracle, ner);

    let result = analyzer
        .analyze("could you tell me what Priya is up to these days")
        .await
        .unwrap();

    assert_eq!(result.entities.name.as_deref(), Some("Priya"));
}

#[tokio::test]
async fn test_oracle_failure_degrades_to_unknown() {
    let analyzer = NluAnalyzer::new(Arc::new(FailingOracle), Arc::new(NullNer));

    let result = analyzer
        .analyze("what a lovely afternoon this turned out to be")
        .await
        .unwrap();

    assert_eq!(result.intent, Intent::Unknown);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.tier, ConfidenceTier::Low);
}

#[tokio::test]
async fn test_removal_verb_overrides_oracle_pick() {
    // no `from`, so the removal cascade rule misses; the oracle's guess
    // is then corrected because a person plus a removal verb is present
    let oracle = Arc::new(ScriptedOracle::new("update_team_members", 0.7));
    let analyzer = NluAnalyzer::new(oracle, Arc::new(NullNer));

    let result = analyzer.analyze("kick Charlie out").await.unwrap();

    assert_eq!(result.entities.name.as_deref(), Some("Charlie"));
    assert_eq!(result.intent, Intent::RemoveMember);
}

#[tokio::test]
async fn test_whitespace_is_normalized_before_matching() {
    let analyzer = NluAnalyzer::new(
        Arc::new(ScriptedOracle::new("greeting", 0.9)),
        Arc::new(NullNer),
    );

    let result = analyzer
        .analyze("  delete   team\t Avengers  ")
        .await
        .unwrap();

    assert_eq!(result.query, "delete team Avengers");
    assert_eq!(result.intent, Intent::DeleteTeam);
}
