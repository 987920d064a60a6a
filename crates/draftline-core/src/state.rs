// Draft state: committed action history, per-side picks and bans.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{ChampionId, RoleCatalog};
use crate::error::DraftError;
use crate::sequence::{self, ActionType, Side, Turn, DRAFT_LENGTH, DRAFT_SEQUENCE};

/// Numeric team identifier, passed to the oracle as conditioning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

/// One committed draft action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftAction {
    pub step: usize,
    pub side: Side,
    pub action: ActionType,
    pub champion: ChampionId,
}

/// Per-side champion lists as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideLists {
    #[serde(default)]
    pub blue: Vec<ChampionId>,
    #[serde(default)]
    pub red: Vec<ChampionId>,
}

impl SideLists {
    fn get(&self, side: Side) -> &[ChampionId] {
        match side {
            Side::Blue => &self.blue,
            Side::Red => &self.red,
        }
    }
}

/// Unordered description of a draft: teams plus each side's picks and bans
/// in the order that side made them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftParts {
    #[serde(default)]
    pub blue_team: TeamId,
    #[serde(default)]
    pub red_team: TeamId,
    #[serde(default)]
    pub picks: SideLists,
    #[serde(default)]
    pub bans: SideLists,
}

/// The draft seen from one side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamView {
    pub side: Side,
    pub own_team: TeamId,
    pub enemy_team: TeamId,
    pub own_picks: Vec<ChampionId>,
    pub enemy_picks: Vec<ChampionId>,
    /// Bans from both sides.
    pub bans: Vec<ChampionId>,
}

/// The complete state of one draft.
///
/// Mutated only by [`DraftState::commit`], once per action; the step index is
/// the number of committed actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftState {
    blue_team: TeamId,
    red_team: TeamId,
    actions: Vec<DraftAction>,
}

impl DraftState {
    /// Create an empty draft between two teams.
    pub fn new(blue_team: TeamId, red_team: TeamId) -> Self {
        DraftState {
            blue_team,
            red_team,
            actions: Vec::new(),
        }
    }

    /// Rebuild the ordered history from per-side lists by walking the fixed
    /// schedule. Counts that no schedule prefix can produce are rejected.
    pub fn from_parts(parts: &DraftParts, catalog: &RoleCatalog) -> Result<Self, DraftError> {
        let total = parts.picks.blue.len()
            + parts.picks.red.len()
            + parts.bans.blue.len()
            + parts.bans.red.len();
        if total > DRAFT_LENGTH {
            return Err(DraftError::MalformedState(format!(
                "{total} actions exceed the {DRAFT_LENGTH}-step draft"
            )));
        }

        let mut actions = Vec::with_capacity(total);
        for (step, &(side, action)) in DRAFT_SEQUENCE.iter().take(total).enumerate() {
            let list = match action {
                ActionType::Pick => parts.picks.get(side),
                ActionType::Ban => parts.bans.get(side),
            };
            let nth = sequence::count_before(step, side, action);
            let champion = list.get(nth).cloned().ok_or_else(|| {
                DraftError::MalformedState(format!(
                    "{total} actions require {} {side} {action}(s) but {} given",
                    sequence::count_before(total, side, action),
                    list.len()
                ))
            })?;
            actions.push(DraftAction {
                step,
                side,
                action,
                champion,
            });
        }

        let state = DraftState {
            blue_team: parts.blue_team,
            red_team: parts.red_team,
            actions,
        };
        state.validate(catalog)?;
        Ok(state)
    }

    /// Inverse of [`DraftState::from_parts`].
    pub fn to_parts(&self) -> DraftParts {
        let mut parts = DraftParts {
            blue_team: self.blue_team,
            red_team: self.red_team,
            ..DraftParts::default()
        };
        for a in &self.actions {
            let lists = match a.action {
                ActionType::Pick => &mut parts.picks,
                ActionType::Ban => &mut parts.bans,
            };
            match a.side {
                Side::Blue => lists.blue.push(a.champion.clone()),
                Side::Red => lists.red.push(a.champion.clone()),
            }
        }
        parts
    }

    /// Check the history against the schedule, uniqueness and the catalog.
    pub fn validate(&self, catalog: &RoleCatalog) -> Result<(), DraftError> {
        if self.actions.len() > DRAFT_LENGTH {
            return Err(DraftError::MalformedState(format!(
                "{} actions exceed the {DRAFT_LENGTH}-step draft",
                self.actions.len()
            )));
        }

        let mut seen: HashSet<&ChampionId> = HashSet::new();
        for (i, a) in self.actions.iter().enumerate() {
            let (side, action) = DRAFT_SEQUENCE[i];
            if a.step != i || a.side != side || a.action != action {
                return Err(DraftError::MalformedState(format!(
                    "action #{i} is a {} {} at step {}, schedule expects a {side} {action}",
                    a.side, a.action, a.step
                )));
            }
            if !catalog.contains(&a.champion) {
                return Err(DraftError::MalformedState(format!(
                    "unknown champion '{}'",
                    a.champion
                )));
            }
            if !seen.insert(&a.champion) {
                return Err(DraftError::MalformedState(format!(
                    "champion '{}' appears more than once",
                    a.champion
                )));
            }
        }
        Ok(())
    }

    /// Append the action scheduled at the current step.
    pub fn commit(&mut self, champion: ChampionId, catalog: &RoleCatalog) -> Result<Turn, DraftError> {
        let turn = self.next_turn()?;
        if !catalog.contains(&champion) {
            return Err(DraftError::IllegalAction {
                step: turn.step,
                message: format!("unknown champion '{champion}'"),
            });
        }
        if self.is_taken(&champion) {
            return Err(DraftError::IllegalAction {
                step: turn.step,
                message: format!("champion '{champion}' is already picked or banned"),
            });
        }

        debug!(
            step = turn.step,
            side = %turn.side,
            action = %turn.action,
            champion = %champion,
            "committing draft action"
        );
        self.actions.push(DraftAction {
            step: turn.step,
            side: turn.side,
            action: turn.action,
            champion,
        });
        Ok(turn)
    }

    /// Number of committed actions; also the index of the next step.
    pub fn step(&self) -> usize {
        self.actions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.actions.len() >= DRAFT_LENGTH
    }

    /// Who acts next and how.
    pub fn next_turn(&self) -> Result<Turn, DraftError> {
        sequence::turn_at(self.step())
    }

    pub fn actions(&self) -> &[DraftAction] {
        &self.actions
    }

    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::Blue => self.blue_team,
            Side::Red => self.red_team,
        }
    }

    pub fn picks(&self, side: Side) -> Vec<ChampionId> {
        self.filtered(|a| a.side == side && a.action == ActionType::Pick)
    }

    pub fn bans(&self, side: Side) -> Vec<ChampionId> {
        self.filtered(|a| a.side == side && a.action == ActionType::Ban)
    }

    pub fn all_bans(&self) -> Vec<ChampionId> {
        self.filtered(|a| a.action == ActionType::Ban)
    }

    pub fn is_taken(&self, champion: &ChampionId) -> bool {
        self.actions.iter().any(|a| &a.champion == champion)
    }

    /// Every picked or banned champion.
    pub fn taken(&self) -> HashSet<&ChampionId> {
        self.actions.iter().map(|a| &a.champion).collect()
    }

    /// The draft from the acting side's point of view.
    pub fn view(&self) -> Result<TeamView, DraftError> {
        let turn = self.next_turn()?;
        Ok(self.view_for(turn.side))
    }

    /// The draft from `side`'s point of view.
    pub fn view_for(&self, side: Side) -> TeamView {
        TeamView {
            side,
            own_team: self.team(side),
            enemy_team: self.team(side.opponent()),
            own_picks: self.picks(side),
            enemy_picks: self.picks(side.opponent()),
            bans: self.all_bans(),
        }
    }

    fn filtered(&self, pred: impl Fn(&DraftAction) -> bool) -> Vec<ChampionId> {
        self.actions
            .iter()
            .filter(|a| pred(*a))
            .map(|a| a.champion.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Champion, ExpectedPoolSizes};
    use crate::role::Role;

    fn catalog(n: usize) -> RoleCatalog {
        let champions = (0..n)
            .map(|i| Champion::new(&format!("C{i:02}"), &[Role::ALL[i % 5]]))
            .collect();
        RoleCatalog::new(champions, ExpectedPoolSizes::default()).unwrap()
    }

    fn id(i: usize) -> ChampionId {
        ChampionId::new(format!("c{i:02}"))
    }

    fn played(steps: usize, catalog: &RoleCatalog) -> DraftState {
        let mut state = DraftState::new(TeamId(1), TeamId(2));
        for i in 0..steps {
            state.commit(id(i), catalog).unwrap();
        }
        state
    }

    #[test]
    fn commit_follows_schedule() {
        let cat = catalog(30);
        let mut state = DraftState::new(TeamId(1), TeamId(2));

        let turn = state.commit(id(0), &cat).unwrap();
        assert_eq!((turn.step, turn.side, turn.action), (0, Side::Blue, ActionType::Ban));
        let turn = state.commit(id(1), &cat).unwrap();
        assert_eq!((turn.step, turn.side, turn.action), (1, Side::Red, ActionType::Ban));
        assert_eq!(state.step(), 2);
        assert_eq!(state.bans(Side::Blue), vec![id(0)]);
        assert_eq!(state.all_bans(), vec![id(0), id(1)]);
    }

    #[test]
    fn commit_rejects_reuse_and_unknown() {
        let cat = catalog(30);
        let mut state = played(3, &cat);

        let err = state.commit(id(1), &cat).unwrap_err();
        assert!(matches!(err, DraftError::IllegalAction { step: 3, .. }));

        let err = state.commit(ChampionId::new("ghost"), &cat).unwrap_err();
        assert!(matches!(err, DraftError::IllegalAction { .. }));

        // Failed commits leave the state untouched.
        assert_eq!(state.step(), 3);
    }

    #[test]
    fn commit_after_last_step_fails() {
        let cat = catalog(30);
        let mut state = played(19, &cat);
        let turn = state.commit(id(19), &cat).unwrap();
        assert_eq!((turn.side, turn.action), (Side::Red, ActionType::Pick));
        assert!(state.is_complete());

        let err = state.commit(id(20), &cat).unwrap_err();
        assert!(matches!(err, DraftError::DraftCompleted { steps: 20 }));
        assert!(matches!(state.view(), Err(DraftError::DraftCompleted { .. })));
    }

    #[test]
    fn views_split_own_and_enemy() {
        let cat = catalog(30);
        // Steps 0-5 bans, 6 blue pick, 7-8 red picks.
        let state = played(9, &cat);
        let view = state.view().unwrap();
        // Step 9 is a blue pick.
        assert_eq!(view.side, Side::Blue);
        assert_eq!(view.own_team, TeamId(1));
        assert_eq!(view.own_picks, vec![id(6)]);
        assert_eq!(view.enemy_picks, vec![id(7), id(8)]);
        assert_eq!(view.bans.len(), 6);

        let red = state.view_for(Side::Red);
        assert_eq!(red.own_picks, vec![id(7), id(8)]);
        assert_eq!(red.enemy_team, TeamId(1));
    }

    #[test]
    fn parts_round_trip_rebuilds_order() {
        let cat = catalog(30);
        let state = played(14, &cat);
        let parts = state.to_parts();
        assert_eq!(parts.bans.red, vec![id(1), id(3), id(5), id(12)]);
        assert_eq!(parts.picks.blue, vec![id(6), id(9), id(10)]);

        let rebuilt = DraftState::from_parts(&parts, &cat).unwrap();
        assert_eq!(rebuilt, state);
    }

    #[test]
    fn parts_with_impossible_counts_rejected() {
        let cat = catalog(30);
        // Three blue picks and nothing else cannot be a schedule prefix.
        let parts = DraftParts {
            picks: SideLists {
                blue: vec![id(0), id(1), id(2)],
                red: vec![],
            },
            ..DraftParts::default()
        };
        let err = DraftState::from_parts(&parts, &cat).unwrap_err();
        assert!(matches!(err, DraftError::MalformedState(_)));
    }

    #[test]
    fn parts_with_duplicate_champion_rejected() {
        let cat = catalog(30);
        let parts = DraftParts {
            bans: SideLists {
                blue: vec![id(0)],
                red: vec![id(0)],
            },
            ..DraftParts::default()
        };
        let err = DraftState::from_parts(&parts, &cat).unwrap_err();
        match err {
            DraftError::MalformedState(msg) => assert!(msg.contains("more than once")),
            other => panic!("expected MalformedState, got {other}"),
        }
    }

    #[test]
    fn parts_with_unknown_champion_rejected() {
        let cat = catalog(30);
        let parts = DraftParts {
            bans: SideLists {
                blue: vec![ChampionId::new("ghost")],
                red: vec![],
            },
            ..DraftParts::default()
        };
        let err = DraftState::from_parts(&parts, &cat).unwrap_err();
        assert!(matches!(err, DraftError::MalformedState(_)));
    }

    #[test]
    fn deserialized_state_out_of_schedule_is_malformed() {
        let cat = catalog(30);
        let json = r#"{
            "blue_team": 1,
            "red_team": 2,
            "actions": [{"step": 0, "side": "red", "action": "ban", "champion": "c00"}]
        }"#;
        let state: DraftState = serde_json::from_str(json).unwrap();
        assert!(matches!(state.validate(&cat), Err(DraftError::MalformedState(_))));
    }

    #[test]
    fn parts_deserialize_with_defaults() {
        let parts: DraftParts = serde_json::from_str(r#"{"bans": {"blue": ["c00"]}}"#).unwrap();
        assert_eq!(parts.blue_team, TeamId(0));
        assert_eq!(parts.bans.blue, vec![id(0)]);
        assert!(parts.picks.red.is_empty());
    }
}
