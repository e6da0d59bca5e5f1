//! Team persistence.
//!
//! The router only needs a handful of operations, expressed as a trait so
//! hosts can plug in a real database. Team identity is the name compared
//! case-insensitively; `Apollo` and `apollo` are the same team.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::AppError;
use crate::models::{TeamPatch, TeamRecord};

/// Storage backend for team records.
#[async_trait]
pub trait TeamStore: Send + Sync + 'static {
    /// Looks a team up by name, case-insensitively.
    async fn find_by_identity(&self, team_name: &str) -> Result<Option<TeamRecord>, AppError>;

    async fn insert(&self, record: TeamRecord) -> Result<(), AppError>;

    /// Applies a patch to a team; returns the number of records updated.
    async fn update(&self, team_name: &str, patch: TeamPatch) -> Result<u64, AppError>;

    /// Deletes a team; returns the number of records removed.
    async fn delete(&self, team_name: &str) -> Result<u64, AppError>;

    async fn list(&self) -> Result<Vec<TeamRecord>, AppError>;
}

/// In-memory backend, suitable for tests and single-process hosts.
#[derive(Default)]
pub struct InMemoryTeamStore {
    teams: Mutex<Vec<TeamRecord>>,
}

impl InMemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_identity(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[async_trait]
impl TeamStore for InMemoryTeamStore {
    async fn find_by_identity(&self, team_name: &str) -> Result<Option<TeamRecord>, AppError> {
        let teams = self.teams.lock().await;
        Ok(teams
            .iter()
            .find(|t| same_identity(&t.team_name, team_name))
            .cloned())
    }

    async fn insert(&self, record: TeamRecord) -> Result<(), AppError> {
        let mut teams = self.teams.lock().await;
        if teams
            .iter()
            .any(|t| same_identity(&t.team_name, &record.team_name))
        {
            return Err(AppError::Store(format!(
                "team '{}' already exists",
                record.team_name
            )));
        }
        debug!(team = %record.team_name, "team inserted");
        teams.push(record);
        Ok(())
    }

    async fn update(&self, team_name: &str, patch: TeamPatch) -> Result<u64, AppError> {
        let mut teams = self.teams.lock().await;
        let Some(team) = teams
            .iter_mut()
            .find(|t| same_identity(&t.team_name, team_name))
        else {
            return Ok(0);
        };
        if let Some(role) = patch.role {
            team.role = role;
        }
        if let Some(members) = patch.members {
            team.members = members;
        }
        if let Some(repo) = patch.repo {
            team.repo = repo;
        }
        if let Some(status) = patch.status {
            team.status = status;
        }
        team.updated_at = chrono::Utc::now();
        Ok(1)
    }

    async fn delete(&self, team_name: &str) -> Result<u64, AppError> {
        let mut teams = self.teams.lock().await;
        let before = teams.len();
        teams.retain(|t| !same_identity(&t.team_name, team_name));
        Ok((before - teams.len()) as u64)
    }

    async fn list(&self) -> Result<Vec<TeamRecord>, AppError> {
        Ok(self.teams.lock().await.clone())
    }
}
