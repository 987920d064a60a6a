// Per-candidate hints and the one-line explanation built from them.

use serde::Serialize;

use crate::catalog::{ChampionId, RoleCatalog};
use crate::config::{Limits, Thresholds};
use crate::delta::{DeltaReport, Urgency};
use crate::pressure::{RolePressure, RolePressureCalculator};
use crate::role::Role;
use crate::sequence::{ActionType, Turn};
use crate::state::TeamView;
use crate::tables::{PairMatch, PairTables};

/// Phrases kept in the explanation text.
const MAX_TEXT_PHRASES: usize = 2;

/// Below this many phrases a flexible early pick still gets called out.
const EARLY_FLEX_PHRASE_ROOM: usize = 3;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Strongest synergy or counter relationship behind a hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairHint {
    pub champion: ChampionId,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrgencyHint {
    pub delta: f64,
    pub level: Urgency,
}

/// Human-readable summary of why a candidate ranks where it does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub text: String,
    /// Every qualifying phrase, in priority order.
    pub phrases: Vec<String>,
    /// More than one phrase qualified.
    pub critical: bool,
}

impl Explanation {
    /// Join the first two phrases with " + ". Several qualifying phrases
    /// make the explanation critical; none gives a generic fallback.
    pub fn compose(phrases: Vec<String>, action: ActionType) -> Self {
        if phrases.is_empty() {
            return Explanation {
                text: format!("Solid tactical {action}"),
                phrases,
                critical: false,
            };
        }

        let critical = phrases.len() > 1;
        let joined = phrases
            .iter()
            .take(MAX_TEXT_PHRASES)
            .cloned()
            .collect::<Vec<_>>()
            .join(" + ");
        let text = if critical {
            format!("CRITICAL: {joined}")
        } else {
            joined
        };

        Explanation {
            text,
            phrases,
            critical,
        }
    }
}

/// Everything attached to a top-ranked candidate. Candidates outside the
/// hint window carry an empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hints {
    /// Roles whose pressure this pick would relieve.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pressure_reduction: Vec<Role>,
    /// Number of eligible roles, when more than one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flex_roles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synergy: Option<PairHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<PairHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<UrgencyHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why: Option<Explanation>,
}

impl Hints {
    pub fn is_empty(&self) -> bool {
        *self == Hints::default()
    }
}

// ---------------------------------------------------------------------------
// Hint builder
// ---------------------------------------------------------------------------

/// Read-only inputs shared by every candidate of one request.
pub(crate) struct HintContext<'a> {
    pub catalog: &'a RoleCatalog,
    pub tables: &'a PairTables,
    pub thresholds: &'a Thresholds,
    pub limits: &'a Limits,
    pub turn: Turn,
    pub view: &'a TeamView,
    /// Own-side pressure before the candidate is added.
    pub pressure: &'a RolePressure,
}

impl HintContext<'_> {
    fn pair_hint(&self, found: Option<PairMatch>) -> Option<PairHint> {
        found
            .filter(|m| m.score > self.thresholds.pair_hint_min)
            .map(|m| PairHint {
                name: self.catalog.name_of(&m.other).to_string(),
                champion: m.other,
                score: m.score,
            })
    }

    /// Build the hints for one candidate.
    ///
    /// Picks look at synergy with our picks and counters against theirs.
    /// Bans look the other way: synergy the enemy would get, and how well
    /// the champion would counter our own picks.
    pub fn build(&self, champion: &ChampionId, delta: Option<&DeltaReport>) -> Hints {
        let is_pick = self.turn.action == ActionType::Pick;
        let roles = self.catalog.eligible_roles(champion);
        let mut hints = Hints::default();
        let mut phrases: Vec<String> = Vec::new();

        let (synergy_group, counter_group) = if is_pick {
            (&self.view.own_picks, &self.view.enemy_picks)
        } else {
            (&self.view.enemy_picks, &self.view.own_picks)
        };
        let best_counter = self.tables.best_counter(champion, counter_group);
        let best_counter_score = best_counter.as_ref().map_or(0.0, |m| m.score);

        hints.synergy = self.pair_hint(self.tables.best_synergy(champion, synergy_group));
        if let Some(s) = &hints.synergy {
            phrases.push(if is_pick {
                format!("Strong synergy with {}", s.name)
            } else {
                format!("Denies synergy with {}", s.name)
            });
        }

        hints.counter = self.pair_hint(best_counter);
        if let Some(c) = &hints.counter {
            phrases.push(if is_pick {
                format!("Counter-pick against {}", c.name)
            } else {
                format!("Prevents counter against {}", c.name)
            });
        }

        if is_pick {
            let mut own = self.view.own_picks.clone();
            own.push(champion.clone());
            let after = RolePressureCalculator::new(self.catalog).compute(
                &own,
                &self.view.enemy_picks,
                &self.view.bans,
            );
            hints.pressure_reduction = self
                .pressure
                .reduced_roles(&after, self.thresholds.pressure_hint);

            if roles.len() == 1 {
                if let Some(role) = roles.iter().next() {
                    if self.pressure.get(role) - after.get(role) > self.thresholds.role_fill {
                        phrases.push(format!("Fills {role} role"));
                    }
                }
            }
        }

        let flexible = roles.len() > 1;
        if flexible {
            hints.flex_roles = Some(roles.len());
            if is_pick {
                phrases.push(format!("Flexible pick ({} roles)", roles.len()));
            }
        }

        if let Some(report) = delta {
            hints.urgency = Some(UrgencyHint {
                delta: report.delta,
                level: report.urgency,
            });
            if let Some(phrase) = report.urgency.hint_phrase() {
                phrases.push(phrase.to_string());
            }
        }

        if is_pick {
            let early = self.turn.step < self.limits.early_phase_steps;
            if early && flexible && phrases.len() < EARLY_FLEX_PHRASE_ROOM {
                phrases.push("Flexible early pick".to_string());
            } else if !early && best_counter_score > self.thresholds.late_counter_min {
                phrases.push("Strategic late-game counter".to_string());
            }
        }

        hints.why = Some(Explanation::compose(phrases, self.turn.action));
        hints
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
