// Team roles and compact role sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of roles on a team. Also the maximum number of picks per side.
pub const ROLE_COUNT: usize = 5;

/// Positional roles a champion may fill. Mutually exclusive within one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Adc,
    Support,
}

impl Role {
    /// All roles in their natural declared order.
    pub const ALL: [Role; ROLE_COUNT] = [Role::Top, Role::Jungle, Role::Mid, Role::Adc, Role::Support];

    /// Parse a role label.
    ///
    /// Accepts the upper-case names plus the labels found in match data:
    /// - "bot" / "bottom" / "adc" -> Adc
    /// - "support" / "sup" / "utility" -> Support
    /// - "jungle" / "jg" / "jng" -> Jungle
    /// - "mid" / "middle" -> Mid
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "top" => Some(Role::Top),
            "jungle" | "jg" | "jng" => Some(Role::Jungle),
            "mid" | "middle" => Some(Role::Mid),
            "adc" | "bot" | "bottom" => Some(Role::Adc),
            "support" | "sup" | "supp" | "utility" => Some(Role::Support),
            _ => None,
        }
    }

    /// Return the display string for this role.
    pub fn display_str(&self) -> &'static str {
        match self {
            Role::Top => "TOP",
            Role::Jungle => "JUNGLE",
            Role::Mid => "MID",
            Role::Adc => "ADC",
            Role::Support => "SUPPORT",
        }
    }

    /// Position of this role in [`Role::ALL`]; also its bit in a [`RoleSet`].
    pub fn index(&self) -> usize {
        match self {
            Role::Top => 0,
            Role::Jungle => 1,
            Role::Mid => 2,
            Role::Adc => 3,
            Role::Support => 4,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// RoleSet
// ---------------------------------------------------------------------------

/// A set of roles stored as a 5-bit mask. Iteration follows [`Role::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);
    pub const ALL: RoleSet = RoleSet(0b1_1111);

    pub fn single(role: Role) -> Self {
        RoleSet(1 << role.index())
    }

    pub fn from_bits(bits: u8) -> Self {
        RoleSet(bits & Self::ALL.0)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & (1 << role.index()) != 0
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= 1 << role.index();
    }

    pub fn with(self, role: Role) -> Self {
        RoleSet(self.0 | (1 << role.index()))
    }

    pub fn without(self, role: Role) -> Self {
        RoleSet(self.0 & !(1 << role.index()))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Open-world reading of an eligibility set: an empty (unknown) set
    /// means the champion may play anywhere.
    pub fn or_any(self) -> Self {
        if self.is_empty() {
            Self::ALL
        } else {
            self
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }

    pub fn to_vec(&self) -> Vec<Role> {
        self.iter().collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::EMPTY;
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl Serialize for RoleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let roles = Vec::<Role>::deserialize(deserializer)?;
        Ok(roles.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(|r| r.display_str()).collect();
        write!(f, "{}", labels.join("/"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
