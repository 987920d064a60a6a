// Scoring oracle: draft state -> per-champion scores.
//
// The engine only sees the `ScoringOracle` trait. Implementations here are a
// uniform baseline and a statistics-driven prior; a trained model plugs in
// the same way, as can any closure in tests.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{ChampionId, RoleCatalog};
use crate::error::{DataError, DraftError, OracleError};
use crate::sequence::{ActionType, Side, DRAFT_LENGTH};
use crate::state::{DraftState, TeamId};
use crate::tables::PairTables;

// ---------------------------------------------------------------------------
// State encoding
// ---------------------------------------------------------------------------

/// One filled slot of the action history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    /// Champion's catalog index.
    pub champion: usize,
    pub action: ActionType,
    pub side: Side,
}

/// What an oracle is conditioned on. Slot position is the draft step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleInput {
    pub slots: [Option<SlotEntry>; DRAFT_LENGTH],
    pub step: usize,
    pub acting_side: Side,
    pub acting_action: ActionType,
    pub acting_team: TeamId,
    pub opponent_team: TeamId,
}

impl OracleInput {
    /// Encode the current state from the acting side's perspective.
    pub fn encode(state: &DraftState, catalog: &RoleCatalog) -> Result<Self, DraftError> {
        let turn = state.next_turn()?;
        let mut slots = [None; DRAFT_LENGTH];
        for action in state.actions() {
            let champion = catalog.index_of(&action.champion).ok_or_else(|| {
                DraftError::MalformedState(format!("unknown champion '{}'", action.champion))
            })?;
            slots[action.step] = Some(SlotEntry {
                champion,
                action: action.action,
                side: action.side,
            });
        }

        Ok(OracleInput {
            slots,
            step: turn.step,
            acting_side: turn.side,
            acting_action: turn.action,
            acting_team: state.team(turn.side),
            opponent_team: state.team(turn.side.opponent()),
        })
    }

    /// The same input with `champion` placed in the first open slot as an
    /// opponent pick. The acting side, action and team ids are unchanged.
    /// Returns `None` when every slot is filled.
    pub fn with_opponent_pick(&self, champion: usize) -> Option<OracleInput> {
        let open = self.slots.iter().position(|s| s.is_none())?;
        let mut next = self.clone();
        next.slots[open] = Some(SlotEntry {
            champion,
            action: ActionType::Pick,
            side: self.acting_side.opponent(),
        });
        next.step = open + 1;
        Some(next)
    }

    /// Catalog indices of every picked or banned champion.
    pub fn taken(&self) -> Vec<usize> {
        self.slots.iter().flatten().map(|s| s.champion).collect()
    }

    /// Catalog indices picked by `side`, in slot order.
    pub fn picks_of(&self, side: Side) -> Vec<usize> {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.side == side && s.action == ActionType::Pick)
            .map(|s| s.champion)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Oracle trait
// ---------------------------------------------------------------------------

/// Anything that scores every catalog champion for a draft state.
///
/// Scores are indexed like the catalog, non-negative, and need not sum to 1.
pub trait ScoringOracle: Send + Sync {
    fn predict(&self, input: &OracleInput) -> Result<Vec<f64>, OracleError>;
}

impl<F> ScoringOracle for F
where
    F: Fn(&OracleInput) -> Result<Vec<f64>, OracleError> + Send + Sync,
{
    fn predict(&self, input: &OracleInput) -> Result<Vec<f64>, OracleError> {
        self(input)
    }
}

/// Query an oracle and return a probability distribution over the catalog.
///
/// Negative and non-finite scores become 0. A wrong length or an all-zero
/// output fails the request.
pub fn query(
    oracle: &dyn ScoringOracle,
    input: &OracleInput,
    expected_len: usize,
) -> Result<Vec<f64>, DraftError> {
    let raw = oracle.predict(input)?;
    let mut scores = sanitize(raw, expected_len)?;
    normalize(&mut scores);
    Ok(scores)
}

/// Clamp an oracle output into a usable score vector.
pub fn sanitize(raw: Vec<f64>, expected_len: usize) -> Result<Vec<f64>, OracleError> {
    if raw.len() != expected_len {
        return Err(OracleError::ShapeMismatch {
            expected: expected_len,
            got: raw.len(),
        });
    }

    let scores: Vec<f64> = raw
        .into_iter()
        .map(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 })
        .collect();
    if scores.iter().sum::<f64>() <= 0.0 {
        return Err(OracleError::Unavailable(
            "output carries no probability mass".into(),
        ));
    }
    Ok(scores)
}

/// Scale in place to sum to 1. All-zero input is left unchanged.
pub fn normalize(scores: &mut [f64]) {
    let total: f64 = scores.iter().sum();
    if total > 0.0 {
        for s in scores.iter_mut() {
            *s /= total;
        }
    }
}

// ---------------------------------------------------------------------------
// UniformOracle
// ---------------------------------------------------------------------------

/// Scores every champion equally. Useful as a baseline: all ranking signal
/// then comes from role viability and tie-breaks.
#[derive(Debug, Clone, Copy)]
pub struct UniformOracle {
    size: usize,
}

impl UniformOracle {
    pub fn new(catalog: &RoleCatalog) -> Self {
        UniformOracle {
            size: catalog.len(),
        }
    }
}

impl ScoringOracle for UniformOracle {
    fn predict(&self, _input: &OracleInput) -> Result<Vec<f64>, OracleError> {
        if self.size == 0 {
            return Err(OracleError::Unavailable("empty champion catalog".into()));
        }
        Ok(vec![1.0; self.size])
    }
}

// ---------------------------------------------------------------------------
// PriorOracle
// ---------------------------------------------------------------------------

/// Historical pick and ban weight of one champion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PriorWeights {
    pub pick: f64,
    pub ban: f64,
}

/// Scores champions from precomputed pick/ban statistics, nudged by pair
/// statistics against the current board.
///
/// score = weight * (1 + synergy with own picks + counter vs enemy picks),
/// floored at 0, where `weight` is the pick or ban weight for the acting
/// action.
#[derive(Debug, Clone)]
pub struct PriorOracle {
    ids: Vec<ChampionId>,
    weights: Vec<PriorWeights>,
    tables: PairTables,
}

impl PriorOracle {
    /// Align prior weights with catalog order. Champions without a prior get
    /// zero weight.
    pub fn new(
        catalog: &RoleCatalog,
        priors: &HashMap<ChampionId, PriorWeights>,
        tables: PairTables,
    ) -> Self {
        let ids: Vec<ChampionId> = catalog.champions().iter().map(|c| c.id.clone()).collect();
        let weights = ids
            .iter()
            .map(|id| priors.get(id).copied().unwrap_or_default())
            .collect();

        let unmatched = priors.keys().filter(|id| !catalog.contains(id)).count();
        if unmatched > 0 {
            warn!("{} prior rows name champions missing from the catalog", unmatched);
        }

        PriorOracle {
            ids,
            weights,
            tables,
        }
    }

    fn ids_at(&self, indices: &[usize]) -> Vec<ChampionId> {
        indices
            .iter()
            .filter_map(|&i| self.ids.get(i).cloned())
            .collect()
    }
}

impl ScoringOracle for PriorOracle {
    fn predict(&self, input: &OracleInput) -> Result<Vec<f64>, OracleError> {
        let base: Vec<f64> = self
            .weights
            .iter()
            .map(|w| match input.acting_action {
                ActionType::Pick => w.pick,
                ActionType::Ban => w.ban,
            })
            .collect();
        if base.iter().sum::<f64>() <= 0.0 {
            return Err(OracleError::Unavailable(format!(
                "no {} statistics loaded",
                input.acting_action
            )));
        }

        let own = self.ids_at(&input.picks_of(input.acting_side));
        let enemy = self.ids_at(&input.picks_of(input.acting_side.opponent()));

        Ok(self
            .ids
            .iter()
            .zip(base)
            .map(|(id, weight)| {
                let adjust = 1.0
                    + self.tables.total_synergy(id, &own)
                    + self.tables.total_counter(id, &enemy);
                (weight * adjust).max(0.0)
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct RawPrior {
    champion: String,
    pick_weight: f64,
    ban_weight: f64,
}

fn priors_from_reader<R: Read>(rdr: R) -> Result<HashMap<ChampionId, PriorWeights>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut map = HashMap::new();
    for result in reader.deserialize::<RawPrior>() {
        match result {
            Ok(raw) => {
                let name = raw.champion.trim();
                let valid = |v: f64| v.is_finite() && v >= 0.0;
                if !valid(raw.pick_weight) || !valid(raw.ban_weight) {
                    warn!("skipping prior for '{}': negative or non-finite weight", name);
                    continue;
                }
                let id = ChampionId::from_name(name);
                if map.contains_key(&id) {
                    warn!("duplicate prior for '{}', using latest value", name);
                }
                map.insert(
                    id,
                    PriorWeights {
                        pick: raw.pick_weight,
                        ban: raw.ban_weight,
                    },
                );
            }
            Err(e) => {
                warn!("skipping malformed prior row: {}", e);
            }
        }
    }
    Ok(map)
}

/// Load per-champion pick/ban weights from a CSV file
/// (`champion,pick_weight,ban_weight`).
pub fn load_priors(path: &Path) -> Result<HashMap<ChampionId, PriorWeights>, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    priors_from_reader(file).map_err(|e| DataError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
