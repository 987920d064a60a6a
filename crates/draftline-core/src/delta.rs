// Counterfactual urgency: how much the board shifts if the opponent takes a
// candidate before we do.
//
// The oracle is asked twice: once for the real state and once for a copy in
// which the opponent has just picked the candidate. The KL divergence between
// the two distributions, over champions still available in both, is the
// candidate's delta.

use serde::Serialize;
use tracing::trace;

use crate::catalog::{ChampionId, RoleCatalog};
use crate::config::Thresholds;
use crate::error::DraftError;
use crate::oracle::{self, OracleInput, ScoringOracle};
use crate::state::DraftState;

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// Classification of a candidate's delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    CanWait,
    Contested,
    Urgent,
}

impl Urgency {
    /// `delta > urgent_delta` is urgent, `delta > contested_delta` contested.
    pub fn classify(delta: f64, thresholds: &Thresholds) -> Self {
        if delta > thresholds.urgent_delta {
            Urgency::Urgent
        } else if delta > thresholds.contested_delta {
            Urgency::Contested
        } else {
            Urgency::CanWait
        }
    }

    /// Phrase used in candidate explanations. `None` when there is nothing to
    /// say.
    pub fn hint_phrase(&self) -> Option<&'static str> {
        match self {
            Urgency::Urgent => Some("Urgent: Highly contested"),
            Urgency::Contested => Some("Contested pick"),
            Urgency::CanWait => None,
        }
    }

    /// Label used in draft-level insights.
    pub fn insight_label(&self) -> &'static str {
        match self {
            Urgency::Urgent => "Urgent: Pick or lose",
            Urgency::Contested => "Contested",
            Urgency::CanWait => "Can wait",
        }
    }
}

/// Delta and urgency for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaReport {
    pub champion: ChampionId,
    pub delta: f64,
    pub urgency: Urgency,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

pub struct DeltaAnalyzer<'a> {
    oracle: &'a dyn ScoringOracle,
    catalog: &'a RoleCatalog,
    thresholds: &'a Thresholds,
}

impl<'a> DeltaAnalyzer<'a> {
    pub fn new(
        oracle: &'a dyn ScoringOracle,
        catalog: &'a RoleCatalog,
        thresholds: &'a Thresholds,
    ) -> Self {
        DeltaAnalyzer {
            oracle,
            catalog,
            thresholds,
        }
    }

    /// Full analysis of one candidate at the state's current decision point.
    pub fn analyze(&self, state: &DraftState, champion: &ChampionId) -> Result<DeltaReport, DraftError> {
        let candidate = self.catalog.index_of(champion).ok_or_else(|| {
            DraftError::MalformedState(format!("unknown champion '{champion}'"))
        })?;
        let input = OracleInput::encode(state, self.catalog)?;
        let p_now = oracle::query(self.oracle, &input, self.catalog.len())?;
        let delta = self.delta_from(&input, &p_now, candidate)?;
        Ok(self.report(champion.clone(), delta))
    }

    /// Delta for `candidate` given an already computed current distribution.
    ///
    /// Lets the caller share one `p_now` query across many candidates. Only
    /// the hypothetical successor state is queried here. With no open slot
    /// left the delta is 0.
    pub fn delta_from(
        &self,
        input: &OracleInput,
        p_now: &[f64],
        candidate: usize,
    ) -> Result<f64, DraftError> {
        let Some(hypothetical) = input.with_opponent_pick(candidate) else {
            return Ok(0.0);
        };
        let p_after = oracle::query(self.oracle, &hypothetical, self.catalog.len())?;

        let mut excluded = vec![false; p_now.len()];
        for idx in input.taken() {
            if let Some(e) = excluded.get_mut(idx) {
                *e = true;
            }
        }
        if let Some(e) = excluded.get_mut(candidate) {
            *e = true;
        }

        let delta = kl_divergence(p_now, &p_after, &excluded, self.thresholds.smoothing_epsilon);
        trace!(candidate, delta, "counterfactual delta");
        Ok(delta)
    }

    pub fn report(&self, champion: ChampionId, delta: f64) -> DeltaReport {
        DeltaReport {
            champion,
            delta,
            urgency: Urgency::classify(delta, self.thresholds),
        }
    }
}

/// Smoothed KL(p || q) over indices not marked in `excluded`.
///
/// Both distributions are renormalized over that shared support first. Each
/// term is `p(x) * ln((p(x) + eps) / (q(x) + eps))`. The result is clamped at
/// 0, and is 0 when `p` has no mass on the support.
pub fn kl_divergence(p: &[f64], q: &[f64], excluded: &[bool], epsilon: f64) -> f64 {
    let support: Vec<usize> = (0..p.len().min(q.len()))
        .filter(|&i| !excluded.get(i).copied().unwrap_or(false))
        .collect();

    let p_mass: f64 = support.iter().map(|&i| p[i]).sum();
    if p_mass <= 0.0 {
        return 0.0;
    }
    let q_mass: f64 = support.iter().map(|&i| q[i]).sum();

    let mut kl = 0.0;
    for &i in &support {
        let pi = p[i] / p_mass;
        if pi <= 0.0 {
            continue;
        }
        let qi = if q_mass > 0.0 { q[i] / q_mass } else { 0.0 };
        kl += pi * ((pi + epsilon) / (qi + epsilon)).ln();
    }
    kl.max(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
