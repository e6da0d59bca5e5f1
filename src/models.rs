use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single incoming chat message. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utterance {
    /// Transport-level message identity, used for deduplication.
    pub id: String,
    /// Identity of the sending user.
    pub sender: String,
    /// Identity of the channel the message arrived on.
    pub channel: String,
    /// The raw message text.
    pub text: String,
    /// Receipt timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Utterance {
    /// Creates an utterance with a synthesized message id, for transports
    /// that do not carry one.
    pub fn new(sender: &str, channel: &str, text: &str) -> Self {
        Self::with_id(&Uuid::new_v4().to_string(), sender, channel, text)
    }

    /// Creates an utterance carrying the transport's message id.
    pub fn with_id(id: &str, sender: &str, channel: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            sender: sender.to_string(),
            channel: channel.to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// A team record as exchanged with the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamRecord {
    /// The identifying team name. Identity lookups are case-insensitive.
    pub team_name: String,
    /// The team-level role, empty when not set.
    #[serde(default)]
    pub role: String,
    /// Member names in insertion order.
    #[serde(default)]
    pub members: Vec<String>,
    /// Repository URL, empty when not set.
    #[serde(default)]
    pub repo: String,
    /// Free-form status, empty when not set.
    #[serde(default)]
    pub status: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl TeamRecord {
    /// Creates a new record with both timestamps set to now.
    pub fn new(team_name: &str) -> Self {
        let now = Utc::now();
        Self {
            team_name: team_name.to_string(),
            role: String::new(),
            members: Vec::new(),
            repo: String::new(),
            status: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update for a team record; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamPatch {
    pub role: Option<String>,
    pub members: Option<Vec<String>>,
    pub repo: Option<String>,
    pub status: Option<String>,
}
