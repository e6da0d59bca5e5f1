//! Pattern cascade classification.
//!
//! Fast, precise regex rules tried before any statistical fallback.
//! Evaluation is strictly sequential and the FIRST matching rule wins;
//! later rules are never consulted. Rule order is therefore part of the
//! public contract: specific phrasings (explicit verbs, explicit field
//! names) are listed before generic catch-alls (a bare `team X`). The
//! ordering is pinned by tests.

use super::intent::Intent;
use crate::config::CASCADE_SCORE;
use regex::Regex;
use std::collections::HashMap;

/// One ordered cascade entry: a pattern and the intent it signals.
///
/// Named capture groups use the canonical entity keys (`team_name`,
/// `name`, `role`, `repo`, `members`, `status`, `role_name`, `colour`)
/// so a hit can seed the entity bag directly.
struct CascadeRule {
    intent: Intent,
    pattern: Regex,
}

/// A successful cascade hit.
#[derive(Debug, Clone)]
pub struct CascadeMatch {
    pub intent: Intent,
    /// Fixed high score assigned to rule hits by convention.
    pub score: f32,
    /// Named captures, keyed by canonical entity name.
    pub captures: HashMap<String, String>,
}

/// Ordered first-match-wins rule classifier.
pub struct PatternCascadeClassifier {
    rules: Vec<CascadeRule>,
}

impl Default for PatternCascadeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// Patterns are compiled once at construction; a failure to compile is a
// programming error, so expect() is acceptable here.
fn rule(intent: Intent, pattern: &str) -> CascadeRule {
    CascadeRule {
        intent,
        pattern: Regex::new(pattern).expect("invalid cascade rule pattern"),
    }
}

impl PatternCascadeClassifier {
    /// Builds the rule list. Order matters and is part of the contract.
    pub fn new() -> Self {
        let rules = vec![
            // Help and short greetings first: cheap, unambiguous.
            rule(Intent::Help, r"(?i)\b(help|how to use|what can you do)\b"),
            rule(
                Intent::Greeting,
                r"(?i)^(hi|hello|hey|greetings|good (morning|afternoon|evening))(\s+there)?[\s!.,]*$",
            ),
            // Chat-platform role creation, with optional name and hex colour.
            rule(
                Intent::CreateRole,
                r"(?i)\b(?:add|create|make)\s+(?:a\s+)?role\b(?:\s+(?P<role_name>[A-Za-z][\w-]*))?(?:.*?(?P<colour>#[0-9a-fA-F]{6}))?",
            ),
            // Member info lookups.
            rule(Intent::GetMemberInfo, r"(?i)\binfo\s+(?:about|on)\s+(?P<name>\w+)"),
            rule(
                Intent::GetMemberInfo,
                r"(?i)\bwhat\s+role\s+does\s+(?P<name>\w+)\s+have\b",
            ),
            // Explicit role-assignment phrasings.
            rule(
                Intent::AssignRole,
                r"(?i)\bset\s+role\s+of\s+(?P<name>\w+)\s+as\s+(?P<role>[A-Za-z ]+?)\s+in\s+(?:team\s+)?(?P<team_name>[A-Za-z][\w.-]*)",
            ),
            rule(
                Intent::AssignRole,
                r"(?i)\bassign\s+(?:role\s+)?(?P<role0>[A-Za-z ]+?\s+)?(?P<name>[A-Z]\w*)\s+as\s+(?P<role>[A-Za-z ]+?)\s+in\s+(?:team\s+)?(?P<team_name>[A-Za-z][\w.-]*)",
            ),
            rule(
                Intent::AssignRole,
                r"(?i)\bassign\s+(?P<name>\w+)\s+(?P<role>[A-Za-z ]+?)\s+to\s+(?:team\s+)?(?P<team_name>[A-Za-z][\w.-]*)",
            ),
            rule(
                Intent::AssignRole,
                r"(?i)\bmake\s+(?P<name>\w+)\s+(?P<role>[A-Za-z ]+?)\s+in\s+(?:team\s+)?(?P<team_name>[A-Za-z][\w.-]*)",
            ),
            // Field-specific team updates.
            rule(
                Intent::UpdateTeamRepo,
                r"(?i)\bupdate\s+(?:the\s+)?repo(?:sitory)?\s+(?:of|for)\s+(?P<team_name>[A-Za-z][\w.-]*)\s+to\s+(?P<repo>\S+)",
            ),
            rule(
                Intent::UpdateTeamRepo,
                r"(?i)\b(?P<team_name>[A-Za-z][\w.-]*)'s\s+repo(?:sitory)?\s+to\s+(?P<repo>\S+)",
            ),
            rule(
                Intent::UpdateTeamStatus,
                r"(?i)\bupdate\s+(?:the\s+)?status\s+of\s+(?P<team_name>[A-Za-z][\w.-]*)\s+to\s+(?P<status>[\w ]+)",
            ),
            rule(
                Intent::UpdateTeamStatus,
                r"(?i)\b(?P<team_name>[A-Za-z][\w.-]*)'s\s+status\s+to\s+(?P<status>[\w ]+)",
            ),
            rule(
                Intent::UpdateTeamMembers,
                r"(?i)\bupdate\s+(?:the\s+)?members\s+of\s+(?P<team_name>[A-Za-z][\w.-]*)\s+to\s+(?P<members>.+)",
            ),
            rule(
                Intent::UpdateTeamMembers,
                r"(?i)\b(?P<team_name>[A-Za-z][\w.-]*)'s\s+members\s+to\s+(?P<members>.+)",
            ),
            rule(
                Intent::UpdateTeamRole,
                r"(?i)\bupdate\s+(?:the\s+)?role\s+of\s+(?P<team_name>[A-Za-z][\w.-]*)\s+to\s+(?P<role>[A-Za-z ]+)",
            ),
            // Member-list statements anchored on the team word.
            rule(
                Intent::UpdateTeamMembers,
                r"(?i)\bteam\s+(?P<team_name>[A-Za-z][\w.-]*)\s+members\s+are\s+(?P<members>.+)",
            ),
            // Member removal must precede team deletion: both use delete/remove
            // verbs, but removal is distinguished by the `from` preposition.
            rule(
                Intent::RemoveMember,
                r"(?i)\b(?:remove|kick|eliminate|delete)\s+(?P<name>\w+)\s+from\s+(?:team\s+)?(?P<team_name>[A-Za-z][\w.-]*)",
            ),
            rule(
                Intent::DeleteTeam,
                r"(?i)\b(?:delete|remove)\s+team\s+(?P<team_name>[A-Za-z][\w.-]*)",
            ),
            rule(
                Intent::DeleteTeam,
                r"(?i)\bdelete\s+(?P<team_name>[A-Za-z][\w.-]*)\s+team\b",
            ),
            rule(
                Intent::CreateTeam,
                r"(?i)\b(?:create|make|start)\s+(?:a\s+)?(?:new\s+)?team\b(?:[,\s]+(?P<team_name>[A-Za-z][\w.-]*))?",
            ),
            rule(Intent::ListTeams, r"(?i)\b(?:list|show)\s+(?:all\s+)?(?:the\s+)?teams\b"),
            rule(
                Intent::ShowTeamInfo,
                r"(?i)\b(?:who\s+(?:are|is)\s+(?:the\s+)?members?\s+of|members\s+of)\s+(?:team\s+)?(?P<team_name>[A-Za-z][\w.-]*)",
            ),
            rule(
                Intent::ShowTeamInfo,
                r"(?i)\bshow\s+(?:details\s+(?:for|of)\s+)?(?:team\s+)?(?P<team_name>[A-Za-z][\w.-]*)",
            ),
            // Generic catch-alls last: a bare `teams` or `team X` mention.
            rule(Intent::ListTeams, r"(?i)^teams$"),
            rule(
                Intent::ShowTeamInfo,
                r"(?i)\bteam\s+(?P<team_name>[A-Za-z][\w.-]*)",
            ),
        ];
        Self { rules }
    }

    /// Tries rules in order against the normalized text and returns the
    /// first hit, or `None` to signal the caller to consult the fallback
    /// oracle.
    pub fn classify(&self, text: &str) -> Option<CascadeMatch> {
        for rule in &self.rules {
            if let Some(found) = rule.pattern.captures(text) {
                let mut captures = HashMap::new();
                for group in rule.pattern.capture_names().flatten() {
                    // Helper groups like `role0` are not canonical entity keys.
                    if group.chars().any(|c| c.is_ascii_digit()) {
                        continue;
                    }
                    if let Some(value) = found.name(group) {
                        let trimmed = value.as_str().trim();
                        if !trimmed.is_empty() {
                            captures.insert(group.to_string(), trimmed.to_string());
                        }
                    }
                }
                return Some(CascadeMatch {
                    intent: rule.intent,
                    score: CASCADE_SCORE,
                    captures,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> CascadeMatch {
        PatternCascadeClassifier::new()
            .classify(text)
            .unwrap_or_else(|| panic!("expected a cascade hit for '{text}'"))
    }

    #[test]
    fn test_help_and_greeting() {
        assert_eq!(classify("help me use this system").intent, Intent::Help);
        assert_eq!(classify("Hello there!").intent, Intent::Greeting);
        assert_eq!(classify("good morning").intent, Intent::Greeting);
    }

    #[test]
    fn test_greeting_requires_short_form() {
        // A greeting buried in a command must not short-circuit the cascade.
        let hit = classify("hey, delete team Avengers");
        assert_eq!(hit.intent, Intent::DeleteTeam);
        assert_eq!(hit.captures["team_name"], "Avengers");
    }

    #[test]
    fn test_assign_role_phrasings() {
        for text in [
            "Assign John as developer in team Apollo",
            "assign John developer to Apollo",
            "Make John developer in Apollo",
            "set role of John as developer in team Apollo",
        ] {
            let hit = classify(text);
            assert_eq!(hit.intent, Intent::AssignRole, "for '{text}'");
            assert_eq!(hit.captures["name"], "John", "for '{text}'");
            assert_eq!(hit.captures["role"], "developer", "for '{text}'");
            assert_eq!(hit.captures["team_name"], "Apollo", "for '{text}'");
        }
    }

    #[test]
    fn test_update_rules() {
        let hit = classify("update repo of Alpha to https://github.com/org/alpha");
        assert_eq!(hit.intent, Intent::UpdateTeamRepo);
        assert_eq!(hit.captures["repo"], "https://github.com/org/alpha");

        let hit = classify("Update Alpha's repository to https://github.com/org/alpha");
        assert_eq!(hit.intent, Intent::UpdateTeamRepo);
        assert_eq!(hit.captures["team_name"], "Alpha");

        let hit = classify("update status of Bravo to inactive");
        assert_eq!(hit.intent, Intent::UpdateTeamStatus);
        assert_eq!(hit.captures["status"], "inactive");

        let hit = classify("update members of Bravo to Carol, David and Erin");
        assert_eq!(hit.intent, Intent::UpdateTeamMembers);
        assert_eq!(hit.captures["members"], "Carol, David and Erin");

        let hit = classify("update role of Zeta to senior developer");
        assert_eq!(hit.intent, Intent::UpdateTeamRole);
        assert_eq!(hit.captures["role"], "senior developer");
    }

    #[test]
    fn test_delete_variants() {
        assert_eq!(classify("delete team Avengers").captures["team_name"], "Avengers");
        assert_eq!(classify("remove team Innovators").intent, Intent::DeleteTeam);
        let hit = classify("delete Avengers team");
        assert_eq!(hit.intent, Intent::DeleteTeam);
        assert_eq!(hit.captures["team_name"], "Avengers");
    }

    #[test]
    fn test_rule_order_remove_member_beats_delete_team() {
        // `delete X from team Y` matches both the removal rule and, were it
        // tried, the later bare-team catch-all. The earlier rule must win.
        let hit = classify("delete Alex from team Delta");
        assert_eq!(hit.intent, Intent::RemoveMember);
        assert_eq!(hit.captures["name"], "Alex");
        assert_eq!(hit.captures["team_name"], "Delta");
    }

    #[test]
    fn test_rule_order_create_team_beats_team_catch_all() {
        // `create team Alpha` also matches the generic `team X` rule at the
        // end of the list; sequential evaluation must stop at create_team.
        let hit = classify("create a new team Alpha");
        assert_eq!(hit.intent, Intent::CreateTeam);
        assert_eq!(hit.captures["team_name"], "Alpha");
    }

    #[test]
    fn test_show_team_info_and_catch_all() {
        let hit = classify("show team Cosmic");
        assert_eq!(hit.intent, Intent::ShowTeamInfo);
        assert_eq!(hit.captures["team_name"], "Cosmic");

        let hit = classify("team Apollo");
        assert_eq!(hit.intent, Intent::ShowTeamInfo);
        assert_eq!(hit.captures["team_name"], "Apollo");

        assert_eq!(classify("List all teams").intent, Intent::ListTeams);
        assert_eq!(classify("teams").intent, Intent::ListTeams);
    }

    #[test]
    fn test_members_are_statement() {
        let hit = classify("team Alpha members are Carol, David");
        assert_eq!(hit.intent, Intent::UpdateTeamMembers);
        assert_eq!(hit.captures["team_name"], "Alpha");
        assert_eq!(hit.captures["members"], "Carol, David");
    }

    #[test]
    fn test_create_role_with_colour() {
        let hit = classify("Create role Moderator with colour #00ff7f");
        assert_eq!(hit.intent, Intent::CreateRole);
        assert_eq!(hit.captures["role_name"], "Moderator");
        assert_eq!(hit.captures["colour"], "#00ff7f");
    }

    #[test]
    fn test_no_match_returns_none() {
        let classifier = PatternCascadeClassifier::new();
        assert!(classifier.classify("what a lovely afternoon for gardening").is_none());
        assert!(classifier.classify("").is_none());
    }

    #[test]
    fn test_member_info() {
        let hit = classify("give me info about Sarah");
        assert_eq!(hit.intent, Intent::GetMemberInfo);
        assert_eq!(hit.captures["name"], "Sarah");

        let hit = classify("What role does John have?");
        assert_eq!(hit.intent, Intent::GetMemberInfo);
        assert_eq!(hit.captures["name"], "John");
    }
}
