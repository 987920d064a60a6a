// Draft simulation and replay.
//
// `run` plays a draft out to its last step by committing the top-ranked
// candidate every turn. `replay` walks a recorded draft action by action and
// shows where each actual choice sat in the engine's ranking at the time.
// Both go through `RecommendationEngine::rank`, so masking, the viability
// penalty and the tie-break match live recommendations exactly.

use serde::Serialize;
use tracing::{debug, info};

use crate::assignment;
use crate::catalog::ChampionId;
use crate::delta::Urgency;
use crate::error::DraftError;
use crate::oracle::{self, OracleInput};
use crate::recommend::{RecommendationEngine, ScoredCandidate};
use crate::role::{Role, RoleSet};
use crate::sequence::{Side, Turn, DRAFT_LENGTH};
use crate::state::DraftState;

/// Alternatives listed per step unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 5;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub champion: ChampionId,
    pub name: String,
    /// Share of the ranked distribution after masking and penalties.
    pub score: f64,
}

/// One step played by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedStep {
    pub turn: Turn,
    pub chosen: ChampionId,
    pub chosen_name: String,
    /// Counterfactual delta of the chosen champion at this step.
    pub delta: f64,
    pub urgency: Urgency,
    /// Shannon entropy (nats) of the ranked distribution.
    pub entropy: f64,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterSlot {
    pub champion: ChampionId,
    pub name: String,
    /// `None` when the roster admits no assignment.
    pub role: Option<Role>,
}

/// Final picks and bans of one side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideSummary {
    pub side: Side,
    pub picks: Vec<RosterSlot>,
    pub bans: Vec<ChampionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    /// Steps played by the simulator, in order. Actions already in the
    /// starting state are not repeated here.
    pub steps: Vec<SimulatedStep>,
    pub state: DraftState,
    pub blue: SideSummary,
    pub red: SideSummary,
}

/// One recorded action seen against the ranking it was made from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    pub turn: Turn,
    pub actual: ChampionId,
    pub actual_name: String,
    /// 1-based position in the ranking, `None` if the engine left it out.
    pub actual_rank: Option<usize>,
    pub actual_score: f64,
    pub entropy: f64,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replay {
    pub steps: Vec<ReplayStep>,
    /// Steps where the actual choice was the engine's first choice.
    pub top_choice_matches: usize,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Ranking at one decision point.
struct Decision {
    turn: Turn,
    input: OracleInput,
    p_now: Vec<f64>,
    ranked: Vec<ScoredCandidate>,
}

pub struct DraftSimulator<'a> {
    engine: &'a RecommendationEngine,
    top_k: usize,
}

impl<'a> DraftSimulator<'a> {
    pub fn new(engine: &'a RecommendationEngine) -> Self {
        DraftSimulator {
            engine,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Play `state` to completion, always committing the top candidate.
    ///
    /// Fails with `DraftCompleted` if nothing is left to play, and with
    /// `OracleUnavailable` if a step has no candidate with any mass.
    pub fn run(&self, mut state: DraftState) -> Result<Simulation, DraftError> {
        let catalog = self.engine.catalog();
        state.validate(catalog)?;
        state.next_turn()?;

        let analyzer = self.engine.delta_analyzer();
        let mut steps = Vec::with_capacity(DRAFT_LENGTH - state.step());
        while !state.is_complete() {
            let decision = self.decide(&state)?;
            let Some(top) = decision.ranked.first() else {
                return Err(DraftError::OracleUnavailable(format!(
                    "no candidate left at step {}",
                    decision.turn.step
                )));
            };

            let delta = analyzer.delta_from(&decision.input, &decision.p_now, top.index)?;
            let step = SimulatedStep {
                turn: decision.turn,
                chosen: top.champion.clone(),
                chosen_name: catalog.name_of(&top.champion).to_string(),
                delta,
                urgency: Urgency::classify(delta, self.engine.thresholds()),
                entropy: entropy(&decision.ranked),
                suggestions: self.suggestions(&decision.ranked),
            };
            state.commit(step.chosen.clone(), catalog)?;
            debug!(
                step = step.turn.step,
                side = %step.turn.side,
                action = %step.turn.action,
                champion = %step.chosen,
                entropy = step.entropy,
                "simulated step"
            );
            steps.push(step);
        }

        info!(steps = steps.len(), "simulation complete");
        Ok(Simulation {
            blue: self.summary(&state, Side::Blue),
            red: self.summary(&state, Side::Red),
            steps,
            state,
        })
    }

    /// Rank every recorded action of `state` against the draft as it stood
    /// just before it. Works on finished and partial drafts alike.
    pub fn replay(&self, state: &DraftState) -> Result<Replay, DraftError> {
        let catalog = self.engine.catalog();
        state.validate(catalog)?;

        let mut prefix = DraftState::new(state.team(Side::Blue), state.team(Side::Red));
        let mut steps = Vec::with_capacity(state.step());
        for action in state.actions() {
            let decision = self.decide(&prefix)?;
            let position = decision
                .ranked
                .iter()
                .position(|c| c.champion == action.champion);
            steps.push(ReplayStep {
                turn: decision.turn,
                actual: action.champion.clone(),
                actual_name: catalog.name_of(&action.champion).to_string(),
                actual_rank: position.map(|p| p + 1),
                actual_score: position.map_or(0.0, |p| decision.ranked[p].score),
                entropy: entropy(&decision.ranked),
                suggestions: self.suggestions(&decision.ranked),
            });
            prefix.commit(action.champion.clone(), catalog)?;
        }

        let top_choice_matches = steps.iter().filter(|s| s.actual_rank == Some(1)).count();
        info!(steps = steps.len(), top_choice_matches, "replay complete");
        Ok(Replay {
            steps,
            top_choice_matches,
        })
    }

    fn decide(&self, state: &DraftState) -> Result<Decision, DraftError> {
        let catalog = self.engine.catalog();
        let turn = state.next_turn()?;
        let view = state.view_for(turn.side);
        let input = OracleInput::encode(state, catalog)?;
        let p_now = oracle::query(self.engine.oracle(), &input, catalog.len())?;
        let ranked = self.engine.rank(&view, turn.action, &p_now);
        Ok(Decision {
            turn,
            input,
            p_now,
            ranked,
        })
    }

    fn suggestions(&self, ranked: &[ScoredCandidate]) -> Vec<Suggestion> {
        let catalog = self.engine.catalog();
        ranked
            .iter()
            .take(self.top_k)
            .map(|c| Suggestion {
                champion: c.champion.clone(),
                name: catalog.name_of(&c.champion).to_string(),
                score: c.score,
            })
            .collect()
    }

    fn summary(&self, state: &DraftState, side: Side) -> SideSummary {
        let catalog = self.engine.catalog();
        let picks = state.picks(side);
        let sets: Vec<RoleSet> = picks.iter().map(|c| catalog.assignable_roles(c)).collect();
        let result = assignment::solve(&sets);
        let roles = result.roles();

        let picks = picks
            .into_iter()
            .enumerate()
            .map(|(i, champion)| RosterSlot {
                name: catalog.name_of(&champion).to_string(),
                role: roles.map(|r| r[i]),
                champion,
            })
            .collect();
        SideSummary {
            side,
            picks,
            bans: state.bans(side),
        }
    }
}

/// Shannon entropy in nats of a ranked distribution. Scores already sum to 1
/// and carry no zeros.
pub fn entropy(ranked: &[ScoredCandidate]) -> f64 {
    ranked
        .iter()
        .filter(|c| c.score > 0.0)
        .map(|c| -c.score * c.score.ln())
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
