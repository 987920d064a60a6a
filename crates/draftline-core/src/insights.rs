// Draft-level insights: how urgent the top choice is, which roles each side
// is missing, and what each side is likely to pick next.

use serde::Serialize;
use tracing::debug;

use crate::catalog::ChampionId;
use crate::delta::Urgency;
use crate::error::DraftError;
use crate::oracle::{self, OracleInput};
use crate::pressure::RolePressure;
use crate::recommend::RecommendationEngine;
use crate::role::{Role, RoleSet, ROLE_COUNT};
use crate::sequence::{ActionType, Phase, Side};
use crate::state::DraftState;

/// Urgency of the best candidate at the current step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCandidateUrgency {
    pub champion: ChampionId,
    pub name: String,
    pub delta: f64,
    pub urgency: Urgency,
    pub label: String,
}

/// A champion a side is expected to go for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentEntry {
    pub champion: ChampionId,
    pub name: String,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideInsights {
    pub side: Side,
    pub role_pressure: RolePressure,
    /// Roles under critical pressure.
    pub missing_roles: Vec<Role>,
    /// Likely next picks, best first.
    pub intent: Vec<IntentEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftInsights {
    pub step: usize,
    pub phase: Phase,
    pub acting_side: Side,
    pub top_candidate: Option<TopCandidateUrgency>,
    /// The top candidate's delta is high enough that waiting is not an option.
    pub forced: bool,
    pub blue: SideInsights,
    pub red: SideInsights,
}

/// Computes [`DraftInsights`] with an engine's data, oracle and thresholds.
pub struct InsightsAnalyzer<'a> {
    engine: &'a RecommendationEngine,
}

impl<'a> InsightsAnalyzer<'a> {
    pub fn new(engine: &'a RecommendationEngine) -> Self {
        InsightsAnalyzer { engine }
    }

    pub fn analyze(&self, state: &DraftState) -> Result<DraftInsights, DraftError> {
        let engine = self.engine;
        let catalog = engine.catalog();
        let thresholds = engine.thresholds();

        state.validate(catalog)?;
        let turn = state.next_turn()?;
        let input = OracleInput::encode(state, catalog)?;
        let p_now = oracle::query(engine.oracle(), &input, catalog.len())?;

        let view = state.view_for(turn.side);
        let ranked = engine.rank(&view, turn.action, &p_now);
        let top_candidate = match ranked.first() {
            Some(top) => {
                let analyzer = engine.delta_analyzer();
                let delta = analyzer.delta_from(&input, &p_now, top.index)?;
                let urgency = Urgency::classify(delta, thresholds);
                let name = catalog.name_of(&top.champion).to_string();
                let label = match urgency {
                    Urgency::Urgent => format!("{} {}", urgency.insight_label(), name),
                    _ => urgency.insight_label().to_string(),
                };
                Some(TopCandidateUrgency {
                    champion: top.champion.clone(),
                    name,
                    delta,
                    urgency,
                    label,
                })
            }
            None => None,
        };
        let forced = top_candidate
            .as_ref()
            .is_some_and(|t| t.delta > thresholds.forced_delta);

        let blue = self.side_insights(state, &input, Side::Blue)?;
        let red = self.side_insights(state, &input, Side::Red)?;

        debug!(
            step = turn.step,
            forced,
            blue_missing = blue.missing_roles.len(),
            red_missing = red.missing_roles.len(),
            "draft insights"
        );

        Ok(DraftInsights {
            step: turn.step,
            phase: turn.phase,
            acting_side: turn.side,
            top_candidate,
            forced,
            blue,
            red,
        })
    }

    fn side_insights(
        &self,
        state: &DraftState,
        input: &OracleInput,
        side: Side,
    ) -> Result<SideInsights, DraftError> {
        let engine = self.engine;
        let catalog = engine.catalog();
        let thresholds = engine.thresholds();

        let view = state.view_for(side);
        let role_pressure =
            engine
                .pressure_calculator()
                .compute(&view.own_picks, &view.enemy_picks, &view.bans);
        let missing_roles = role_pressure.roles_above(thresholds.missing_role);

        // Ask the oracle what this side would pick if it were on the clock.
        let mut as_side = input.clone();
        if as_side.acting_side != side {
            std::mem::swap(&mut as_side.acting_team, &mut as_side.opponent_team);
        }
        as_side.acting_side = side;
        as_side.acting_action = ActionType::Pick;
        let probs = oracle::query(engine.oracle(), &as_side, catalog.len())?;

        let mut candidates: Vec<(usize, &ChampionId)> = catalog
            .champions()
            .iter()
            .enumerate()
            .filter(|(_, c)| !state.is_taken(&c.id))
            .map(|(i, c)| (i, &c.id))
            .collect();
        candidates.sort_by(|a, b| probs[b.0].total_cmp(&probs[a.0]).then_with(|| a.1.cmp(b.1)));

        if view.own_picks.len() < ROLE_COUNT {
            let open: RoleSet = role_pressure
                .roles_above(thresholds.intent_role_gap)
                .into_iter()
                .collect();
            let fitting: Vec<(usize, &ChampionId)> = candidates
                .iter()
                .copied()
                .filter(|(_, id)| catalog.eligible_roles(id).iter().any(|r| open.contains(r)))
                .collect();
            if !fitting.is_empty() {
                candidates = fitting;
            }
        }

        let intent = candidates
            .into_iter()
            .take(engine.limits().intent_size)
            .filter(|(i, _)| probs[*i] > thresholds.intent_min_probability)
            .map(|(i, id)| IntentEntry {
                champion: id.clone(),
                name: catalog.name_of(id).to_string(),
                probability: probs[i],
            })
            .collect();

        Ok(SideInsights {
            side,
            role_pressure,
            missing_roles,
            intent,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
