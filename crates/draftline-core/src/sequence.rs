// Fixed competitive draft order and phase classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DraftError;

/// Total number of actions in a draft (10 bans + 10 picks).
pub const DRAFT_LENGTH: usize = 20;

/// One of the two drafting parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Blue => "blue",
            Side::Red => "red",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a draft step picks or bans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Pick,
    Ban,
}

impl ActionType {
    pub fn label(&self) -> &'static str {
        match self {
            ActionType::Pick => "pick",
            ActionType::Ban => "ban",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse draft phase derived from the step index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Early,
    Mid,
    Late,
}

/// Side, action and phase of one scheduled step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub step: usize,
    pub side: Side,
    pub action: ActionType,
    pub phase: Phase,
}

use ActionType::{Ban, Pick};
use Side::{Blue, Red};

/// The draft order: three bans each, picks B-R-R-B-B-R, two bans each
/// (red first), then picks R-B-B-R.
pub const DRAFT_SEQUENCE: [(Side, ActionType); DRAFT_LENGTH] = [
    (Blue, Ban),
    (Red, Ban),
    (Blue, Ban),
    (Red, Ban),
    (Blue, Ban),
    (Red, Ban),
    (Blue, Pick),
    (Red, Pick),
    (Red, Pick),
    (Blue, Pick),
    (Blue, Pick),
    (Red, Pick),
    (Red, Ban),
    (Blue, Ban),
    (Red, Ban),
    (Blue, Ban),
    (Red, Pick),
    (Blue, Pick),
    (Blue, Pick),
    (Red, Pick),
];

/// Classify a step index: EARLY below 6, MID for 6..=13, LATE from 14.
pub fn phase(step: usize) -> Phase {
    if step < 6 {
        Phase::Early
    } else if step < 14 {
        Phase::Mid
    } else {
        Phase::Late
    }
}

/// Look up who acts at `step` and how. Steps past the schedule mean the
/// draft is over.
pub fn turn_at(step: usize) -> Result<Turn, DraftError> {
    let (side, action) = DRAFT_SEQUENCE
        .get(step)
        .copied()
        .ok_or(DraftError::DraftCompleted { steps: step })?;
    Ok(Turn {
        step,
        side,
        action,
        phase: phase(step),
    })
}

/// Number of `(side, action)` steps scheduled before `step`.
pub fn count_before(step: usize, side: Side, action: ActionType) -> usize {
    DRAFT_SEQUENCE
        .iter()
        .take(step)
        .filter(|&&(s, a)| s == side && a == action)
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
