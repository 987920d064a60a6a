// One live draft: state, lifecycle status and the log of committed actions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use draftline_core::catalog::{ChampionId, RoleCatalog};
use draftline_core::insights::{DraftInsights, InsightsAnalyzer};
use draftline_core::recommend::{RecommendationEngine, Recommendations};
use draftline_core::sequence::{ActionType, Side};
use draftline_core::state::{DraftParts, DraftState, TeamId};
use draftline_core::DraftError;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no draft session with id '{id}'")]
    NotFound { id: String },

    #[error("draft session '{id}' already exists")]
    AlreadyExists { id: String },

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("recommendation worker failed: {0}")]
    Worker(String),
}

// ---------------------------------------------------------------------------
// Session types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

/// An action committed through this session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommittedAction {
    pub step: usize,
    pub side: Side,
    pub action: ActionType,
    pub champion: ChampionId,
    pub committed_at: DateTime<Utc>,
}

/// Report produced for one decision point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftReport {
    pub recommendations: Recommendations,
    pub insights: DraftInsights,
}

#[derive(Debug, Clone)]
pub struct DraftSession {
    id: String,
    state: DraftState,
    status: SessionStatus,
    log: Vec<CommittedAction>,
    created_at: DateTime<Utc>,
}

impl DraftSession {
    pub fn new(id: impl Into<String>, blue_team: TeamId, red_team: TeamId) -> Self {
        DraftSession::with_state(id.into(), DraftState::new(blue_team, red_team))
    }

    /// Resume a draft already in progress. Actions made before the session
    /// was opened are part of the state but not of the log.
    pub fn from_parts(
        id: impl Into<String>,
        parts: &DraftParts,
        catalog: &RoleCatalog,
    ) -> Result<Self, SessionError> {
        let state = DraftState::from_parts(parts, catalog)?;
        Ok(DraftSession::with_state(id.into(), state))
    }

    fn with_state(id: String, state: DraftState) -> Self {
        let status = if state.is_complete() {
            SessionStatus::Completed
        } else {
            SessionStatus::InProgress
        };
        DraftSession {
            id,
            state,
            status,
            log: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn log(&self) -> &[CommittedAction] {
        &self.log
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Fail with `DraftCompleted` once the last step has been played.
    pub fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::InProgress => Ok(()),
            SessionStatus::Completed => Err(DraftError::DraftCompleted {
                steps: self.state.step(),
            }
            .into()),
        }
    }

    /// Commit the champion for the current step.
    pub fn commit(
        &mut self,
        champion: ChampionId,
        catalog: &RoleCatalog,
    ) -> Result<CommittedAction, SessionError> {
        self.ensure_in_progress()?;
        let turn = self.state.commit(champion.clone(), catalog)?;

        let entry = CommittedAction {
            step: turn.step,
            side: turn.side,
            action: turn.action,
            champion,
            committed_at: Utc::now(),
        };
        self.log.push(entry.clone());

        if self.state.is_complete() {
            self.status = SessionStatus::Completed;
        }
        info!(
            session = %self.id,
            step = entry.step,
            side = %entry.side,
            action = %entry.action,
            champion = %entry.champion,
            "action committed"
        );
        Ok(entry)
    }

    pub fn recommend(&self, engine: &RecommendationEngine) -> Result<Recommendations, SessionError> {
        self.ensure_in_progress()?;
        Ok(engine.recommend(&self.state)?)
    }

    pub fn insights(&self, engine: &RecommendationEngine) -> Result<DraftInsights, SessionError> {
        self.ensure_in_progress()?;
        Ok(InsightsAnalyzer::new(engine).analyze(&self.state)?)
    }

    pub fn report(&self, engine: &RecommendationEngine) -> Result<DraftReport, SessionError> {
        Ok(DraftReport {
            recommendations: self.recommend(engine)?,
            insights: self.insights(engine)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
