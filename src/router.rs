//! Message routing.
//!
//! One entry point, `Router::route`, takes each incoming utterance
//! through deduplication, the wizard (when the sender owns a live
//! session), and classification, and reduces it to a single `Action`
//! the host renders. The router also owns what happens when a wizard
//! flow completes: validating the collected fields and persisting the
//! new team.

use rand::seq::SliceRandom;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::RouterConfig;
use crate::dedup::MessageDeduper;
use crate::error::AppError;
use crate::models::{TeamRecord, Utterance};
use crate::nlu::{ClassificationResult, ConfidenceTier, EntityBag, Intent, NluAnalyzer};
use crate::store::TeamStore;
use crate::wizard::{DialogueWizard, WizardStep};
use std::time::Duration;

/// Phrasings for asking the user to rephrase, picked at random so the
/// bot does not parrot the same line every time.
const CLARIFY_PHRASES: [&str; 4] = [
    "I didn't quite catch that. Could you rephrase?",
    "Sorry, I'm not sure what you mean. Can you say that another way?",
    "Hmm, that one's beyond me. Could you try rewording it?",
    "I couldn't work out what you're asking for. Mind rephrasing?",
];

/// What the host should do with an utterance. Serializable so hosts can
/// log decisions as structured JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Redelivered message; say nothing.
    Drop,
    /// Ask the sender for the next wizard field.
    WizardPrompt {
        field: &'static str,
        position: usize,
        total: usize,
    },
    /// The sender already has a flow in progress.
    WizardConflict,
    /// The sender abandoned their flow.
    WizardCancelled,
    /// A completed flow failed validation and was restarted.
    WizardRestarted {
        reason: String,
        field: &'static str,
    },
    /// A wizard flow completed and the team was persisted.
    TeamCreated(TeamRecord),
    /// A classified command for the host to execute.
    Command(ClassificationResult),
    /// Classification was too weak to act on; ask the user to rephrase.
    Clarify {
        message: String,
        result: ClassificationResult,
    },
}

/// Routes utterances to actions.
pub struct Router {
    analyzer: NluAnalyzer,
    dedup: Mutex<MessageDeduper>,
    wizard: Mutex<DialogueWizard>,
    store: Arc<dyn TeamStore>,
}

impl Router {
    pub fn new(
        analyzer: NluAnalyzer,
        store: Arc<dyn TeamStore>,
        config: RouterConfig,
    ) -> Result<Self, AppError> {
        config.validated()?;
        let timeout = match config.wizard_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self {
            analyzer,
            dedup: Mutex::new(MessageDeduper::new(
                config.dedup_capacity,
                config.dedup_retain,
            )),
            wizard: Mutex::new(DialogueWizard::new(timeout)),
            store,
        })
    }

    /// Processes one utterance.
    pub async fn route(&self, utterance: &Utterance) -> Result<Action, AppError> {
        if self.dedup.lock().await.check_and_remember(&utterance.id) {
            debug!(id = %utterance.id, "dropping redelivered message");
            return Ok(Action::Drop);
        }

        // A sender with a live session talks to the wizard, not the
        // classifier.
        {
            let mut wizard = self.wizard.lock().await;
            if wizard.is_collecting(&utterance.sender) {
                match wizard.advance(&utterance.sender, &utterance.text) {
                    Some(WizardStep::Prompt {
                        field,
                        position,
                        total,
                    }) => {
                        return Ok(Action::WizardPrompt {
                            field,
                            position,
                            total,
                        })
                    }
                    Some(WizardStep::Cancelled) => return Ok(Action::WizardCancelled),
                    Some(WizardStep::Completed(bag)) => {
                        drop(wizard);
                        return self.finish_team_creation(utterance, bag).await;
                    }
                    // expired between the check and the advance
                    None => {}
                }
            }
        }

        let result = self.analyzer.analyze(&utterance.text).await?;

        if result.intent == Intent::CreateTeam && result.tier != ConfidenceTier::Low {
            let mut wizard = self.wizard.lock().await;
            return match wizard.start(&utterance.sender, &utterance.channel) {
                Ok(WizardStep::Prompt {
                    field,
                    position,
                    total,
                }) => Ok(Action::WizardPrompt {
                    field,
                    position,
                    total,
                }),
                Ok(step) => {
                    warn!(?step, "unexpected first wizard step");
                    Ok(Action::Drop)
                }
                Err(AppError::SessionConflict(_)) => Ok(Action::WizardConflict),
                Err(err) => Err(err),
            };
        }

        if result.intent == Intent::Unknown || result.tier == ConfidenceTier::Low {
            let message = CLARIFY_PHRASES
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(CLARIFY_PHRASES[0])
                .to_string();
            return Ok(Action::Clarify { message, result });
        }

        Ok(Action::Command(result))
    }

    /// Validates a completed wizard flow and persists the team, or
    /// restarts the flow at the first field.
    async fn finish_team_creation(
        &self,
        utterance: &Utterance,
        bag: EntityBag,
    ) -> Result<Action, AppError> {
        let team_name = match bag.team() {
            Some(name) => name.to_string(),
            None => {
                return self
                    .restart_wizard(utterance, "a team needs a name".to_string())
                    .await;
            }
        };
        if self.store.find_by_identity(&team_name).await?.is_some() {
            return self
                .restart_wizard(utterance, format!("team '{team_name}' already exists"))
                .await;
        }

        let mut record = TeamRecord::new(&team_name);
        record.role = bag.role.unwrap_or_default();
        record.members = bag.members.unwrap_or_default();
        record.repo = bag.repo.unwrap_or_default();
        record.status = bag.status.unwrap_or_default();
        self.store.insert(record.clone()).await?;
        info!(team = %record.team_name, owner = %utterance.sender, "team created");
        Ok(Action::TeamCreated(record))
    }

    async fn restart_wizard(
        &self,
        utterance: &Utterance,
        reason: String,
    ) -> Result<Action, AppError> {
        let mut wizard = self.wizard.lock().await;
        let step = wizard.restart(&utterance.sender, &utterance.channel);
        let WizardStep::Prompt { field, .. } = step else {
            return Err(AppError::Internal(
                "wizard restart did not yield a prompt".to_string(),
            ));
        };
        warn!(owner = %utterance.sender, reason, "team creation rejected; flow restarted");
        Ok(Action::WizardRestarted { reason, field })
    }

    /// Abandons `user`'s wizard session, if any. For an explicit cancel
    /// command or an administrative reset.
    pub async fn cancel_session(&self, user: &str) -> bool {
        self.wizard.lock().await.cancel(user)
    }

    /// Sweeps out idle wizard sessions. Intended to be called from a
    /// periodic host task.
    pub async fn expire_stale_sessions(&self) -> usize {
        self.wizard.lock().await.expire_stale()
    }
}
