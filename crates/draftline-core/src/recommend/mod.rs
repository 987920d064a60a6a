// Recommendation engine: oracle scores -> masked, role-aware, ranked and
// annotated candidates for the current draft step.
//
// Pipeline per request:
//   1. query the oracle for the current state
//   2. drop every picked or banned champion, and every zero-score one
//   3. discount picks our roster cannot fit, and bans of champions the enemy
//      roster cannot fit anyway
//   4. renormalize and rank (score desc, then champion ID asc)
//   5. attach hints to the top candidates only; each costs an oracle call

pub mod hints;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::assignment;
use crate::catalog::{ChampionId, RoleCatalog};
use crate::config::{EngineConfig, Limits, Thresholds};
use crate::delta::DeltaAnalyzer;
use crate::error::DraftError;
use crate::oracle::{self, OracleInput, ScoringOracle};
use crate::pressure::{DisplayedRole, RolePressure, RolePressureCalculator};
use crate::role::RoleSet;
use crate::sequence::{ActionType, Turn};
use crate::state::{DraftState, TeamView};
use crate::tables::PairTables;

pub use hints::{Explanation, Hints, PairHint, UrgencyHint};
use hints::HintContext;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRecommendation {
    pub champion: ChampionId,
    pub name: String,
    /// Final score; all candidates of a request sum to 1 (or all are 0).
    pub score: f64,
    /// Oracle probability before masking and penalties.
    pub probability: f64,
    /// False when the viability penalty was applied.
    pub role_viable: bool,
    /// Picks only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub displayed_role: Option<DisplayedRole>,
    pub hints: Hints,
}

/// Everything produced for one decision point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub turn: Turn,
    /// Pressure on the acting side.
    pub role_pressure: RolePressure,
    pub enemy_role_pressure: RolePressure,
    pub candidates: Vec<CandidateRecommendation>,
}

/// A masked, scored candidate before hints are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Catalog index.
    pub index: usize,
    pub champion: ChampionId,
    pub probability: f64,
    pub score: f64,
    pub role_viable: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Holds the reference data, oracle and tuning for recommendation requests.
///
/// Immutable once built; share it behind an `Arc` across sessions.
pub struct RecommendationEngine {
    catalog: Arc<RoleCatalog>,
    tables: Arc<PairTables>,
    oracle: Arc<dyn ScoringOracle>,
    thresholds: Thresholds,
    limits: Limits,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<RoleCatalog>,
        tables: Arc<PairTables>,
        oracle: Arc<dyn ScoringOracle>,
    ) -> Self {
        RecommendationEngine {
            catalog,
            tables,
            oracle,
            thresholds: Thresholds::default(),
            limits: Limits::default(),
        }
    }

    /// Build with thresholds and limits from a loaded config.
    pub fn from_config(
        config: &EngineConfig,
        catalog: Arc<RoleCatalog>,
        tables: Arc<PairTables>,
        oracle: Arc<dyn ScoringOracle>,
    ) -> Self {
        RecommendationEngine::new(catalog, tables, oracle)
            .with_thresholds(config.thresholds)
            .with_limits(config.limits)
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn tables(&self) -> &PairTables {
        &self.tables
    }

    pub fn oracle(&self) -> &dyn ScoringOracle {
        self.oracle.as_ref()
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn pressure_calculator(&self) -> RolePressureCalculator<'_> {
        RolePressureCalculator::new(&self.catalog)
    }

    pub fn delta_analyzer(&self) -> DeltaAnalyzer<'_> {
        DeltaAnalyzer::new(self.oracle.as_ref(), &self.catalog, &self.thresholds)
    }

    /// Rank candidates for the state's current step.
    ///
    /// Fails with `DraftCompleted` once all 20 steps are committed,
    /// `MalformedState` for an inconsistent state, and `OracleUnavailable`
    /// when the oracle gives nothing usable. No partial results.
    pub fn recommend(&self, state: &DraftState) -> Result<Recommendations, DraftError> {
        state.validate(&self.catalog)?;
        let turn = state.next_turn()?;
        let view = state.view_for(turn.side);

        let input = OracleInput::encode(state, &self.catalog)?;
        let p_now = oracle::query(self.oracle.as_ref(), &input, self.catalog.len())?;
        let ranked = self.rank(&view, turn.action, &p_now);

        let calc = self.pressure_calculator();
        let role_pressure = calc.compute(&view.own_picks, &view.enemy_picks, &view.bans);
        let enemy_role_pressure = calc.compute(&view.enemy_picks, &view.own_picks, &view.bans);

        let ctx = HintContext {
            catalog: &self.catalog,
            tables: &self.tables,
            thresholds: &self.thresholds,
            limits: &self.limits,
            turn,
            view: &view,
            pressure: &role_pressure,
        };
        let analyzer = self.delta_analyzer();

        let mut candidates = Vec::with_capacity(ranked.len().min(self.limits.result_limit));
        for (rank, c) in ranked.into_iter().take(self.limits.result_limit).enumerate() {
            let hints = if rank < self.limits.hint_limit {
                let delta = analyzer.delta_from(&input, &p_now, c.index)?;
                let report = analyzer.report(c.champion.clone(), delta);
                ctx.build(&c.champion, Some(&report))
            } else {
                Hints::default()
            };
            let displayed_role = match turn.action {
                ActionType::Pick => Some(calc.displayed_role(&c.champion, &role_pressure)),
                ActionType::Ban => None,
            };

            candidates.push(CandidateRecommendation {
                name: self.catalog.name_of(&c.champion).to_string(),
                champion: c.champion,
                score: c.score,
                probability: c.probability,
                role_viable: c.role_viable,
                displayed_role,
                hints,
            });
        }

        info!(
            step = turn.step,
            side = %turn.side,
            action = %turn.action,
            candidates = candidates.len(),
            "recommendations ready"
        );

        Ok(Recommendations {
            turn,
            role_pressure,
            enemy_role_pressure,
            candidates,
        })
    }

    /// Mask, penalize, renormalize and sort every untaken champion with a
    /// nonzero score. Zero-score champions are left out entirely.
    ///
    /// `p_now` is indexed like the catalog.
    pub fn rank(&self, view: &TeamView, action: ActionType, p_now: &[f64]) -> Vec<ScoredCandidate> {
        let roster = match action {
            ActionType::Pick => &view.own_picks,
            ActionType::Ban => &view.enemy_picks,
        };
        let roster_sets: Vec<RoleSet> = roster
            .iter()
            .map(|c| self.catalog.assignable_roles(c))
            .collect();

        let mut penalized = 0usize;
        let mut ranked: Vec<ScoredCandidate> = Vec::with_capacity(self.catalog.len());
        for (index, champ) in self.catalog.champions().iter().enumerate() {
            let taken = view.own_picks.contains(&champ.id)
                || view.enemy_picks.contains(&champ.id)
                || view.bans.contains(&champ.id);
            if taken {
                continue;
            }

            let probability = p_now.get(index).copied().unwrap_or(0.0);
            let role_viable = fits_roster(&roster_sets, self.catalog.assignable_roles(&champ.id));
            let score = if role_viable {
                probability
            } else {
                penalized += 1;
                probability * self.thresholds.viability_penalty
            };

            ranked.push(ScoredCandidate {
                index,
                champion: champ.id.clone(),
                probability,
                score,
                role_viable,
            });
        }

        // Candidates the oracle gives no mass can never win.
        let before = ranked.len();
        ranked.retain(|c| c.score > 0.0);
        let zero_mass = before - ranked.len();

        let total: f64 = ranked.iter().map(|c| c.score).sum();
        if total > 0.0 {
            for c in ranked.iter_mut() {
                c.score /= total;
            }
        }

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.champion.cmp(&b.champion))
        });

        debug!(
            action = %action,
            candidates = ranked.len(),
            penalized,
            zero_mass,
            "ranked candidates"
        );
        ranked
    }
}

/// Whether `roster` plus one more champion still admits a role assignment.
fn fits_roster(roster: &[RoleSet], candidate: RoleSet) -> bool {
    let mut sets = roster.to_vec();
    sets.push(candidate);
    assignment::solve_exact(&sets).is_feasible()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
