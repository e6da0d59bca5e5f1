//! Entity extraction.
//!
//! `EntityBag` is the fixed-shape bag of extracted field values; aliases
//! seen in the wild (`member_name`, `team`, `color`) are normalized once
//! at the boundary by [`EntityBag::set`]. `EntityExtractor` fills a bag
//! from text using a per-field priority chain and stops at the first
//! success. Extraction is fully deterministic for a given text and hint
//! list.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Role keywords, in scan order; the first hit wins.
const ROLE_KEYWORDS: &[&str] = &[
    "developer",
    "lead",
    "manager",
    "designer",
    "architect",
    "tester",
    "qa",
    "frontend",
    "backend",
    "fullstack",
    "devops",
    "product owner",
    "scrum master",
    "head",
    "director",
    "engineer",
    "analyst",
    "admin",
    "coordinator",
    "ui",
    "ux",
    "project manager",
    "technical writer",
];

/// Status keywords, in scan order. `inactive` precedes `active` so the
/// longer keyword wins on overlapping text.
const STATUS_KEYWORDS: &[&str] = &[
    "inactive",
    "active",
    "on hold",
    "in progress",
    "paused",
    "completed",
    "archived",
    "blocked",
];

/// Tokens that look like names in short inputs but never are.
const NAME_STOPLIST: &[&str] = &[
    "team", "teams", "info", "role", "roles", "show", "list", "help", "status", "repo", "member",
    "members", "create", "delete", "update", "remove", "assign", "skip",
];

/// Repository hosts accepted by the strict extractor variant.
const KNOWN_REPO_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

/// One entity span reported by the external NER collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerSpan {
    /// The collaborator's entity tag (e.g. `PER` for persons).
    pub entity_group: String,
    /// The covered text.
    pub text: String,
}

impl NerSpan {
    pub fn new(entity_group: &str, text: &str) -> Self {
        Self {
            entity_group: entity_group.to_string(),
            text: text.to_string(),
        }
    }

    fn is_person(&self) -> bool {
        matches!(self.entity_group.to_ascii_uppercase().as_str(), "PER" | "PERSON")
    }
}

/// The structured bag of extracted field values for one utterance or one
/// completed wizard flow. Fields are absent when unresolved; callers must
/// treat absence and explicit emptiness as the same "unknown" state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
}

static MEMBER_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*(?:,|&|\band\b)\s*").expect("invalid member split pattern"));

impl EntityBag {
    /// Stores a value under a field name, normalizing known aliases
    /// (`member_name` → `name`, `team` → `team_name`, `color` → `colour`,
    /// `repository` → `repo`). The value is trimmed; `members` is split on
    /// commas, `and`, or `&`. An empty value is stored as an explicit
    /// empty entry (used by the wizard's skip sentinel). Unknown field
    /// names are ignored.
    pub fn set(&mut self, field: &str, value: &str) {
        let value = value.trim();
        match field {
            "name" | "member_name" => self.name = Some(value.to_string()),
            "role" => self.role = Some(value.to_string()),
            "team_name" | "team" => self.team_name = Some(value.to_string()),
            "repo" | "repository" => self.repo = Some(value.to_string()),
            "members" => self.members = Some(split_members(value)),
            "status" => self.status = Some(value.to_string()),
            "role_name" => self.role_name = Some(value.to_string()),
            "colour" | "color" => self.colour = Some(value.to_string()),
            _ => {}
        }
    }

    /// True when no field has been resolved.
    pub fn is_empty(&self) -> bool {
        self == &EntityBag::default()
    }

    /// The team name, if resolved to a non-empty value.
    pub fn team(&self) -> Option<&str> {
        self.team_name.as_deref().filter(|t| !t.is_empty())
    }
}

/// Splits a member listing on commas, the word `and`, or ampersands.
pub fn split_members(raw: &str) -> Vec<String> {
    MEMBER_SPLIT
        .split(raw)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

// Name patterns: a verb immediately preceding a capitalized token. The
// token class is deliberately case-sensitive.
static NAME_VERB_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:(?i:assign|add|promote))\s+([A-Z][a-zA-Z]*)\b")
            .expect("invalid assign-name pattern"),
        Regex::new(r"(?:(?i:remove|kick))\s+([A-Z][a-zA-Z]*)\s+(?i:from)\b")
            .expect("invalid remove-name pattern"),
        Regex::new(r"(?:(?i:make))\s+([A-Z][a-zA-Z]*)\s+[a-z]").expect("invalid make-name pattern"),
        Regex::new(r"(?i:for)\s+([A-Z][a-zA-Z]*)\s+(?i:as)\b").expect("invalid for-name pattern"),
    ]
});

// Team patterns, anchored on the word `team`, quotes, or create/delete verbs.
static TEAM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r#"(?i)\bteam\s+"([^"]+)""#).expect("invalid quoted-team pattern"),
        Regex::new(r"(?i)\bteam\s+([A-Za-z][\w.-]*)").expect("invalid team pattern"),
        Regex::new(r"(?i)\bin\s+([A-Za-z][\w.-]*)\s+team\b").expect("invalid in-team pattern"),
        Regex::new(r"(?i)\b(?:create|make|new)\s+(?:new\s+)?team[,\s]+([A-Za-z][\w.-]*)")
            .expect("invalid create-team pattern"),
        Regex::new(r"(?i)\b(?:delete|remove)\s+([A-Za-z][\w.-]*)\s+team\b")
            .expect("invalid delete-team pattern"),
    ]
});

static CAPITALIZED_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\b").expect("invalid capitalized-group pattern")
});

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("invalid url pattern"));

static MEMBERS_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:members\s+are|with\s+members|consisting\s+of)\s+(.+)")
        .expect("invalid members anchor pattern")
});

static ROLE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:add|create|make)\s+(?:a\s+)?role\s+([A-Za-z][\w-]*)")
        .expect("invalid role-name pattern")
});

static COLOUR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[0-9a-fA-F]{6}\b").expect("invalid colour pattern"));

/// Per-field extraction pipeline.
pub struct EntityExtractor {
    role_patterns: Vec<(&'static str, Regex)>,
    status_patterns: Vec<(&'static str, Vec<Regex>)>,
    name_stoplist: HashSet<&'static str>,
    known_hosts_only: bool,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    pub fn new() -> Self {
        Self::with_repo_policy(false)
    }

    /// Variant that only accepts repository URLs on known hosting domains.
    pub fn known_hosts_only() -> Self {
        Self::with_repo_policy(true)
    }

    fn with_repo_policy(known_hosts_only: bool) -> Self {
        let role_patterns = ROLE_KEYWORDS
            .iter()
            .map(|kw| {
                let pattern = format!(
                    r"(?i)\b(?:(?:senior|junior|lead|principal|chief)\s+)?{}\b",
                    regex::escape(kw)
                );
                (*kw, Regex::new(&pattern).expect("invalid role pattern"))
            })
            .collect();

        let status_patterns = STATUS_KEYWORDS
            .iter()
            .map(|kw| {
                let escaped = regex::escape(kw);
                let anchored = vec![
                    // status/state noun before or after the keyword
                    Regex::new(&format!(r"(?i)\b(?:status|state)\b.*\b{escaped}\b"))
                        .expect("invalid status pattern"),
                    Regex::new(&format!(r"(?i)\b{escaped}\b.*\b(?:status|state)\b"))
                        .expect("invalid status pattern"),
                    // a set/mark/change/update verb shortly before the keyword
                    Regex::new(&format!(
                        r"(?i)\b(?:set|mark|change|update)(?:\s+\w+){{0,3}}\s+{escaped}\b"
                    ))
                    .expect("invalid status pattern"),
                ];
                (*kw, anchored)
            })
            .collect();

        Self {
            role_patterns,
            status_patterns,
            name_stoplist: NAME_STOPLIST.iter().copied().collect(),
            known_hosts_only,
        }
    }

    /// Extracts all resolvable entities from `text`, consuming person
    /// spans from the external NER collaborator when provided.
    pub fn extract(&self, text: &str, hints: &[NerSpan]) -> EntityBag {
        let mut bag = EntityBag::default();

        if let Some(name) = self.extract_name(text, hints) {
            bag.name = Some(name);
        }
        if let Some(team) = self.extract_team(text, bag.name.as_deref()) {
            bag.team_name = Some(team);
        }
        if let Some(role) = self.extract_role(text) {
            bag.role = Some(role);
        }
        if let Some(repo) = self.extract_repo(text) {
            bag.repo = Some(repo);
        }
        if let Some(members) = self.extract_members(text) {
            bag.members = Some(members);
        }
        if let Some(status) = self.extract_status(text) {
            bag.status = Some(status.to_string());
        }
        if let Some(found) = ROLE_NAME_PATTERN.captures(text) {
            bag.role_name = Some(found[1].trim().to_string());
        }
        if let Some(found) = COLOUR_PATTERN.find(text) {
            bag.colour = Some(found.as_str().to_string());
        }

        bag
    }

    fn extract_name(&self, text: &str, hints: &[NerSpan]) -> Option<String> {
        // 1. person spans from the NER collaborator, in span order
        let persons: Vec<&str> = hints
            .iter()
            .filter(|span| span.is_person())
            .map(|span| span.text.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !persons.is_empty() {
            return Some(persons.join(" "));
        }

        // 2. verb-anchored capitalized tokens
        for pattern in NAME_VERB_PATTERNS.iter() {
            if let Some(found) = pattern.captures(text) {
                let candidate = found[1].trim();
                if !self.name_stoplist.contains(candidate.to_lowercase().as_str()) {
                    return Some(candidate.to_string());
                }
            }
        }

        // 3. very short inputs: any bare capitalized token off the stop-list
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() <= 4 {
            for token in tokens {
                let word = token.trim_matches(|c: char| !c.is_alphanumeric());
                let mut chars = word.chars();
                let capitalized = matches!(chars.next(), Some(first) if first.is_uppercase())
                    && chars.all(|c| c.is_lowercase());
                if capitalized && !self.name_stoplist.contains(word.to_lowercase().as_str()) {
                    return Some(word.to_string());
                }
            }
        }
        None
    }

    fn extract_team(&self, text: &str, name: Option<&str>) -> Option<String> {
        for pattern in TEAM_PATTERNS.iter() {
            if let Some(found) = pattern.captures(text) {
                return Some(found[1].trim().to_string());
            }
        }
        // fallback: the first capitalized word-group that is neither a
        // stop-word nor the already-extracted person name
        for found in CAPITALIZED_GROUP.captures_iter(text) {
            let group = found[1].trim();
            if self.name_stoplist.contains(group.to_lowercase().as_str()) {
                continue;
            }
            if name.is_some_and(|n| n.eq_ignore_ascii_case(group)) {
                continue;
            }
            return Some(group.to_string());
        }
        None
    }

    fn extract_role(&self, text: &str) -> Option<String> {
        for (_, pattern) in &self.role_patterns {
            if let Some(found) = pattern.find(text) {
                return Some(found.as_str().trim().to_lowercase());
            }
        }
        None
    }

    fn extract_repo(&self, text: &str) -> Option<String> {
        for found in URL_PATTERN.find_iter(text) {
            let raw = found.as_str().trim_end_matches(['.', ',', ')', '!', '?']);
            let Ok(parsed) = Url::parse(raw) else {
                continue;
            };
            let Some(host) = parsed.host_str() else {
                continue;
            };
            if self.known_hosts_only && !KNOWN_REPO_HOSTS.contains(&host) {
                continue;
            }
            return Some(raw.to_string());
        }
        None
    }

    fn extract_members(&self, text: &str) -> Option<Vec<String>> {
        // never infer membership without an anchor phrase
        let found = MEMBERS_ANCHOR.captures(text)?;
        let members = split_members(found[1].trim());
        if members.is_empty() {
            None
        } else {
            Some(members)
        }
    }

    fn extract_status(&self, text: &str) -> Option<&'static str> {
        for (kw, patterns) in &self.status_patterns {
            if patterns.iter().any(|p| p.is_match(text)) {
                return Some(kw);
            }
        }
        None
    }
}
