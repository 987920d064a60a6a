// Concurrent registry of draft sessions sharing one recommendation engine.
//
// Each session sits behind its own mutex so commits on one draft never wait
// on another. Recommendation runs on a cloned snapshot inside
// `spawn_blocking`, so the session lock is held only for the clone.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use draftline_core::catalog::ChampionId;
use draftline_core::insights::{DraftInsights, InsightsAnalyzer};
use draftline_core::recommend::{RecommendationEngine, Recommendations};
use draftline_core::simulate::{DraftSimulator, Replay, Simulation};
use draftline_core::state::{DraftParts, DraftState, TeamId};

use crate::session::{CommittedAction, DraftReport, DraftSession, SessionError, SessionStatus};

type SharedSession = Arc<Mutex<DraftSession>>;

pub struct SessionRegistry {
    engine: Arc<RecommendationEngine>,
    sessions: RwLock<HashMap<String, SharedSession>>,
}

impl SessionRegistry {
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        SessionRegistry {
            engine,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &Arc<RecommendationEngine> {
        &self.engine
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Start a fresh draft.
    pub async fn create(
        &self,
        id: &str,
        blue_team: TeamId,
        red_team: TeamId,
    ) -> Result<(), SessionError> {
        self.insert(DraftSession::new(id, blue_team, red_team)).await
    }

    /// Resume a draft from its unordered parts.
    pub async fn open(&self, id: &str, parts: &DraftParts) -> Result<(), SessionError> {
        let session = DraftSession::from_parts(id, parts, self.engine.catalog())?;
        self.insert(session).await
    }

    async fn insert(&self, session: DraftSession) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session.id()) {
            return Err(SessionError::AlreadyExists {
                id: session.id().to_string(),
            });
        }
        info!(
            session = %session.id(),
            step = session.state().step(),
            "draft session opened"
        );
        sessions.insert(session.id().to_string(), Arc::new(Mutex::new(session)));
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<(), SessionError> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                info!(session = %id, "draft session closed");
                Ok(())
            }
            None => Err(not_found(id)),
        }
    }

    async fn get(&self, id: &str) -> Result<SharedSession, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    pub async fn status(&self, id: &str) -> Result<SessionStatus, SessionError> {
        Ok(self.get(id).await?.lock().await.status())
    }

    pub async fn state(&self, id: &str) -> Result<DraftState, SessionError> {
        Ok(self.get(id).await?.lock().await.state().clone())
    }

    pub async fn log(&self, id: &str) -> Result<Vec<CommittedAction>, SessionError> {
        Ok(self.get(id).await?.lock().await.log().to_vec())
    }

    pub async fn commit(
        &self,
        id: &str,
        champion: ChampionId,
    ) -> Result<CommittedAction, SessionError> {
        let session = self.get(id).await?;
        let mut session = session.lock().await;
        session.commit(champion, self.engine.catalog())
    }

    pub async fn recommend(&self, id: &str) -> Result<Recommendations, SessionError> {
        self.with_snapshot(id, |engine, state| Ok(engine.recommend(&state)?))
            .await
    }

    pub async fn insights(&self, id: &str) -> Result<DraftInsights, SessionError> {
        self.with_snapshot(id, |engine, state| {
            Ok(InsightsAnalyzer::new(engine).analyze(&state)?)
        })
        .await
    }

    pub async fn report(&self, id: &str) -> Result<DraftReport, SessionError> {
        self.with_snapshot(id, |engine, state| {
            Ok(DraftReport {
                recommendations: engine.recommend(&state)?,
                insights: InsightsAnalyzer::new(engine).analyze(&state)?,
            })
        })
        .await
    }

    /// Play the session's draft out on a copy. The session itself does not
    /// advance.
    pub async fn simulate(&self, id: &str) -> Result<Simulation, SessionError> {
        self.with_snapshot(id, |engine, state| Ok(DraftSimulator::new(engine).run(state)?))
            .await
    }

    /// Rank every action committed so far. Finished drafts are accepted.
    pub async fn replay(&self, id: &str) -> Result<Replay, SessionError> {
        let snapshot = self.get(id).await?.lock().await.state().clone();
        self.run_blocking(id, snapshot, |engine, state| {
            Ok(DraftSimulator::new(engine).replay(&state)?)
        })
        .await
    }

    /// Clone the state of an in-progress session under its lock, then run
    /// `work` on the blocking pool.
    async fn with_snapshot<T, F>(&self, id: &str, work: F) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(&RecommendationEngine, DraftState) -> Result<T, SessionError> + Send + 'static,
    {
        let snapshot = {
            let session = self.get(id).await?;
            let session = session.lock().await;
            session.ensure_in_progress()?;
            session.state().clone()
        };
        self.run_blocking(id, snapshot, work).await
    }

    async fn run_blocking<T, F>(
        &self,
        id: &str,
        snapshot: DraftState,
        work: F,
    ) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(&RecommendationEngine, DraftState) -> Result<T, SessionError> + Send + 'static,
    {
        debug!(session = %id, step = snapshot.step(), "running analysis on snapshot");
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || work(&engine, snapshot))
            .await
            .map_err(|e| SessionError::Worker(e.to_string()))?
    }
}

fn not_found(id: &str) -> SessionError {
    SessionError::NotFound { id: id.to_string() }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
