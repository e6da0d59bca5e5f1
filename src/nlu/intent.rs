//! Intent vocabulary and confidence tiers.
//!
//! The intent set is closed: the cascade rules, the oracle candidate list
//! and the router dispatch all draw from this one enum.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// One classified user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Assign a role to a member within a team.
    AssignRole,
    /// Begin the interactive team-creation flow.
    CreateTeam,
    /// Delete an existing team.
    DeleteTeam,
    /// Update a team's repository URL.
    UpdateTeamRepo,
    /// Replace a team's member list.
    UpdateTeamMembers,
    /// Update a team's status.
    UpdateTeamStatus,
    /// Update the team-level role.
    UpdateTeamRole,
    /// Show details for one team.
    ShowTeamInfo,
    /// Remove a member from a team.
    RemoveMember,
    /// List all known teams.
    ListTeams,
    /// Show information about one member.
    GetMemberInfo,
    /// Create a chat-platform role.
    CreateRole,
    /// Help request.
    Help,
    /// Greeting / small talk.
    Greeting,
    /// Could not be classified.
    Unknown,
}

impl Intent {
    /// The stable snake_case label, matching the oracle candidate list.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::AssignRole => "assign_role",
            Intent::CreateTeam => "create_team",
            Intent::DeleteTeam => "delete_team",
            Intent::UpdateTeamRepo => "update_team_repo",
            Intent::UpdateTeamMembers => "update_team_members",
            Intent::UpdateTeamStatus => "update_team_status",
            Intent::UpdateTeamRole => "update_team_role",
            Intent::ShowTeamInfo => "show_team_info",
            Intent::RemoveMember => "remove_member",
            Intent::ListTeams => "list_teams",
            Intent::GetMemberInfo => "get_member_info",
            Intent::CreateRole => "create_role",
            Intent::Help => "help",
            Intent::Greeting => "greeting",
            Intent::Unknown => "unknown",
        }
    }

    /// Resolves a label back to an intent. Unrecognized labels map to `None`.
    pub fn from_label(label: &str) -> Option<Intent> {
        CANDIDATE_INTENTS
            .iter()
            .chain(std::iter::once(&Intent::Unknown))
            .copied()
            .find(|intent| intent.label() == label)
    }

    /// The candidate labels handed to the fallback oracle, in a fixed order.
    pub fn candidate_labels() -> &'static [&'static str] {
        &[
            "assign_role",
            "create_team",
            "delete_team",
            "update_team_repo",
            "update_team_members",
            "update_team_status",
            "update_team_role",
            "show_team_info",
            "remove_member",
            "list_teams",
            "get_member_info",
            "create_role",
            "help",
            "greeting",
        ]
    }
}

/// Every classifiable intent (excludes `Unknown`).
pub const CANDIDATE_INTENTS: &[Intent] = &[
    Intent::AssignRole,
    Intent::CreateTeam,
    Intent::DeleteTeam,
    Intent::UpdateTeamRepo,
    Intent::UpdateTeamMembers,
    Intent::UpdateTeamStatus,
    Intent::UpdateTeamRole,
    Intent::ShowTeamInfo,
    Intent::RemoveMember,
    Intent::ListTeams,
    Intent::GetMemberInfo,
    Intent::CreateRole,
    Intent::Help,
    Intent::Greeting,
];

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Confidence category derived from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Maps a score in [0, 1] to a tier: `> 0.8` high, `> 0.5` medium,
    /// otherwise low.
    ///
    /// A score outside [0, 1] violates the oracle contract and is rejected
    /// rather than clamped.
    pub fn from_score(score: f32) -> Result<ConfidenceTier, AppError> {
        if !(0.0..=1.0).contains(&score) || score.is_nan() {
            error!(score, "confidence score outside [0, 1]; oracle contract violated");
            return Err(AppError::ScoreOutOfRange(score));
        }
        Ok(if score > 0.8 {
            ConfidenceTier::High
        } else if score > 0.5 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        })
    }
}
