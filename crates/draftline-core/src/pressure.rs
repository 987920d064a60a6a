// Role pressure: scarcity of each role weighted by unmet structural need.
//
// For each role, measures how depleted the pool of champions able to play it
// is, then zeroes the value unless the team still has that role open. A team
// whose picks already lock every role feels no pressure however thin the
// pool gets.

use serde::{Serialize, Serializer};

use crate::assignment;
use crate::catalog::{ChampionId, RoleCatalog};
use crate::role::{Role, RoleSet, ROLE_COUNT};

// ---------------------------------------------------------------------------
// Pressure vector
// ---------------------------------------------------------------------------

/// Per-role pressure in [0, 1], indexed like [`Role::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RolePressure(pub [f64; ROLE_COUNT]);

impl RolePressure {
    pub fn get(&self, role: Role) -> f64 {
        self.0[role.index()]
    }

    pub fn as_array(&self) -> [f64; ROLE_COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, f64)> + '_ {
        Role::ALL.into_iter().map(move |r| (r, self.get(r)))
    }

    /// Roles whose pressure exceeds `threshold`.
    pub fn roles_above(&self, threshold: f64) -> Vec<Role> {
        self.iter()
            .filter(|(_, p)| *p > threshold)
            .map(|(r, _)| r)
            .collect()
    }

    /// Roles where `after` is lower than `self` by more than `threshold`.
    pub fn reduced_roles(&self, after: &RolePressure, threshold: f64) -> Vec<Role> {
        self.iter()
            .filter(|(r, p)| p - after.get(*r) > threshold)
            .map(|(r, _)| r)
            .collect()
    }

    /// Largest single-role drop from `self` to `after` (0 if none).
    pub fn max_reduction(&self, after: &RolePressure) -> f64 {
        self.iter()
            .map(|(r, p)| p - after.get(r))
            .fold(0.0, f64::max)
    }
}

/// Per-role detail behind a pressure value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PressureEntry {
    pub role: Role,
    /// Untaken champions able to play this role.
    pub available: u32,
    pub expected_pool: u32,
    /// `1 - available / expected_pool`, clamped to [0, 1].
    pub raw_pressure: f64,
    /// Whether current picks can still be arranged without this role.
    pub needed: bool,
    /// `raw_pressure` if needed, else 0.
    pub pressure: f64,
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Computes role pressure for one team against a catalog snapshot.
///
/// Pressure is always per team: the enemy's pressure is a separate call with
/// the pick lists swapped.
#[derive(Debug, Clone, Copy)]
pub struct RolePressureCalculator<'a> {
    catalog: &'a RoleCatalog,
}

impl<'a> RolePressureCalculator<'a> {
    pub fn new(catalog: &'a RoleCatalog) -> Self {
        RolePressureCalculator { catalog }
    }

    /// Pressure vector for the team owning `own_picks`.
    pub fn compute(
        &self,
        own_picks: &[ChampionId],
        enemy_picks: &[ChampionId],
        bans: &[ChampionId],
    ) -> RolePressure {
        let entries = self.breakdown(own_picks, enemy_picks, bans);
        let mut values = [0.0; ROLE_COUNT];
        for e in &entries {
            values[e.role.index()] = e.pressure;
        }
        RolePressure(values)
    }

    /// Full per-role breakdown, in [`Role::ALL`] order.
    ///
    /// For each role:
    /// 1. Count untaken champions whose declared roles include it.
    /// 2. raw = clamp(1 - available / expected_pool, 0, 1).
    /// 3. The role is needed if every current pick can be placed in one of
    ///    the other four roles, i.e. the role is still open.
    /// 4. pressure = raw if needed, else 0.
    pub fn breakdown(
        &self,
        own_picks: &[ChampionId],
        enemy_picks: &[ChampionId],
        bans: &[ChampionId],
    ) -> Vec<PressureEntry> {
        let available = self.available_counts(own_picks, enemy_picks, bans);
        let own_sets: Vec<RoleSet> = own_picks
            .iter()
            .map(|c| self.catalog.assignable_roles(c))
            .collect();

        Role::ALL
            .into_iter()
            .map(|role| {
                let expected_pool = self.catalog.expected_pool_size(role);
                let avail = available[role.index()];
                let raw_pressure = if expected_pool == 0 {
                    0.0
                } else {
                    (1.0 - avail as f64 / expected_pool as f64).clamp(0.0, 1.0)
                };
                let needed = role_is_open(&own_sets, role);
                PressureEntry {
                    role,
                    available: avail,
                    expected_pool,
                    raw_pressure,
                    needed,
                    pressure: if needed { raw_pressure } else { 0.0 },
                }
            })
            .collect()
    }

    /// Untaken champions per role. Champions without role data count for no
    /// role: they are not evidence of a viable pool.
    fn available_counts(
        &self,
        own_picks: &[ChampionId],
        enemy_picks: &[ChampionId],
        bans: &[ChampionId],
    ) -> [u32; ROLE_COUNT] {
        let mut counts = [0u32; ROLE_COUNT];
        for champ in self.catalog.champions() {
            let taken = own_picks.contains(&champ.id)
                || enemy_picks.contains(&champ.id)
                || bans.contains(&champ.id);
            if taken {
                continue;
            }
            for role in champ.roles.iter() {
                counts[role.index()] += 1;
            }
        }
        counts
    }

    /// Role a candidate would most plausibly be shown in, given the team's
    /// current pressure: the eligible role under the most pressure.
    pub fn displayed_role(&self, champion: &ChampionId, pressure: &RolePressure) -> DisplayedRole {
        let roles = self.catalog.eligible_roles(champion);
        let mut best: Option<Role> = None;
        let mut best_value = f64::NEG_INFINITY;
        let mut tied = false;

        for role in roles.iter() {
            let p = pressure.get(role);
            if p > best_value {
                best_value = p;
                best = Some(role);
                tied = false;
            } else if p == best_value {
                tied = true;
            }
        }

        match best {
            None => DisplayedRole::Unknown,
            Some(_) if tied => DisplayedRole::Flex,
            Some(role) => DisplayedRole::Role(role),
        }
    }
}

/// Whether `role` is still open: all picks fit into the remaining roles.
fn role_is_open(own_sets: &[RoleSet], role: Role) -> bool {
    let restricted: Vec<RoleSet> = own_sets.iter().map(|s| s.without(role)).collect();
    assignment::solve_exact(&restricted).is_feasible()
}

// ---------------------------------------------------------------------------
// Displayed role
// ---------------------------------------------------------------------------

/// Role label shown next to a pick recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayedRole {
    Role(Role),
    /// Several eligible roles are under equal pressure.
    Flex,
    /// No role data for the champion.
    Unknown,
}

impl DisplayedRole {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayedRole::Role(r) => r.display_str(),
            DisplayedRole::Flex => "FLEX",
            DisplayedRole::Unknown => "UNKNOWN",
        }
    }
}

impl Serialize for DisplayedRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
