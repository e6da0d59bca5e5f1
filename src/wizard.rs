//! Multi-turn team-creation wizard.
//!
//! A wizard session walks one user through a fixed list of fields, one
//! prompt per turn. Sessions are keyed by the owning user, so each user
//! drives at most one flow at a time while different users proceed
//! independently. The state machine only collects; what happens with a
//! completed field set is the router's business.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::AppError;
use crate::nlu::EntityBag;

/// The fields collected for a new team, in prompt order.
pub const TEAM_CREATION_FIELDS: [&str; 5] = ["team_name", "role", "members", "repo", "status"];

/// Idle sessions older than this are expired.
pub const DEFAULT_WIZARD_TIMEOUT: Duration = Duration::from_secs(300);

/// Typing any of these mid-flow abandons the session.
const CANCEL_WORDS: [&str; 2] = ["cancel", "exit"];

/// The word that leaves the current field empty and moves on.
const SKIP_WORD: &str = "skip";

/// Where a session currently stands. Reported for observability; the
/// table itself only ever holds `Collecting` sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Idle,
    Collecting(usize),
    Completed,
    Cancelled,
}

/// One in-flight flow.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub owner: String,
    pub channel: String,
    index: usize,
    data: EntityBag,
    created_at: Instant,
    last_activity: Instant,
}

impl WizardSession {
    fn new(owner: &str, channel: &str) -> Self {
        let now = Instant::now();
        Self {
            owner: owner.to_string(),
            channel: channel.to_string(),
            index: 0,
            data: EntityBag::default(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    fn stale(&self, timeout: Option<Duration>) -> bool {
        matches!(timeout, Some(limit) if self.last_activity.elapsed() > limit)
    }
}

/// What the wizard wants next after a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardStep {
    /// Ask the user for `field` (`position` of `total`, 1-based).
    Prompt {
        field: &'static str,
        position: usize,
        total: usize,
    },
    /// Every field answered; the collected values, skips left empty.
    Completed(EntityBag),
    /// The user cancelled mid-flow.
    Cancelled,
}

/// Per-user session table over a fixed field schema.
pub struct DialogueWizard {
    sessions: HashMap<String, WizardSession>,
    fields: Vec<&'static str>,
    timeout: Option<Duration>,
}

impl DialogueWizard {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self::with_fields(TEAM_CREATION_FIELDS.to_vec(), timeout)
    }

    /// A wizard over a custom field schema. The schema must be non-empty.
    pub fn with_fields(fields: Vec<&'static str>, timeout: Option<Duration>) -> Self {
        debug_assert!(!fields.is_empty());
        Self {
            sessions: HashMap::new(),
            fields,
            timeout,
        }
    }

    fn prompt(&self, index: usize) -> WizardStep {
        WizardStep::Prompt {
            field: self.fields[index],
            position: index + 1,
            total: self.fields.len(),
        }
    }

    /// Opens a session for `owner` and returns the first prompt.
    ///
    /// A user with a live session cannot start a second one; an expired
    /// leftover is silently replaced.
    pub fn start(&mut self, owner: &str, channel: &str) -> Result<WizardStep, AppError> {
        if let Some(existing) = self.sessions.get(owner) {
            if !existing.stale(self.timeout) {
                return Err(AppError::SessionConflict(owner.to_string()));
            }
            debug!(owner, "replacing an expired wizard session");
        }
        self.sessions
            .insert(owner.to_string(), WizardSession::new(owner, channel));
        info!(owner, channel, "wizard session opened");
        Ok(self.prompt(0))
    }

    /// Feeds one answer into `owner`'s session.
    ///
    /// Returns `None` when the user has no live session (including when
    /// it had already timed out, in which case it is dropped here). On
    /// the last field the session is removed and the collected bag is
    /// handed back.
    pub fn advance(&mut self, owner: &str, input: &str) -> Option<WizardStep> {
        if self
            .sessions
            .get(owner)
            .is_some_and(|s| s.stale(self.timeout))
        {
            self.sessions.remove(owner);
            info!(owner, "wizard session expired");
            return None;
        }
        let session = self.sessions.get_mut(owner)?;

        let input = input.trim();
        if CANCEL_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w)) {
            self.sessions.remove(owner);
            info!(owner, "wizard session cancelled");
            return Some(WizardStep::Cancelled);
        }

        let field = self.fields[session.index];
        if input.eq_ignore_ascii_case(SKIP_WORD) {
            session.data.set(field, "");
        } else {
            session.data.set(field, input);
        }
        session.last_activity = Instant::now();
        session.index += 1;

        let index = session.index;
        if index >= self.fields.len() {
            let session = self.sessions.remove(owner)?;
            info!(owner, "wizard session completed");
            return Some(WizardStep::Completed(session.data));
        }
        Some(self.prompt(index))
    }

    /// Drops `owner`'s session, if any.
    pub fn cancel(&mut self, owner: &str) -> bool {
        let removed = self.sessions.remove(owner).is_some();
        if removed {
            info!(owner, "wizard session cancelled");
        }
        removed
    }

    /// Opens a fresh session at the first field, discarding anything
    /// collected so far. Used when a completed flow fails validation.
    pub fn restart(&mut self, owner: &str, channel: &str) -> WizardStep {
        self.sessions
            .insert(owner.to_string(), WizardSession::new(owner, channel));
        info!(owner, "wizard session restarted");
        self.prompt(0)
    }

    /// True when `owner` has a live (non-stale) session.
    pub fn is_collecting(&self, owner: &str) -> bool {
        self.sessions
            .get(owner)
            .is_some_and(|s| !s.stale(self.timeout))
    }

    /// The observable state of `owner`'s session.
    pub fn state(&self, owner: &str) -> WizardState {
        match self.sessions.get(owner) {
            Some(session) if !session.stale(self.timeout) => {
                WizardState::Collecting(session.index)
            }
            _ => WizardState::Idle,
        }
    }

    /// Sweeps out every stale session; returns how many were dropped.
    /// Intended for a periodic scheduler task.
    pub fn expire_stale(&mut self) -> usize {
        let before = self.sessions.len();
        match self.timeout {
            Some(limit) => {
                self.sessions
                    .retain(|_, s| s.last_activity.elapsed() <= limit);
            }
            None => return 0,
        }
        let expired = before - self.sessions.len();
        if expired > 0 {
            info!(expired, "expired stale wizard sessions");
        }
        expired
    }
}
