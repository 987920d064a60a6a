// Precomputed pairwise statistics: synergy and counter lookups.
//
// Reads a single CSV with a `kind` column so both tables ship in one file:
//
//   kind,champion_a,champion_b,score
//   synergy,Xayah,Rakan,0.08
//   counter,Malphite,Yasuo,0.06
//
// Synergy is symmetric. Counter is directional: `counter(a, b)` is how well
// `a` does against `b`. Pairs that were never recorded score 0.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::catalog::ChampionId;
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which table a pair-statistics row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairKind {
    Synergy,
    Counter,
}

impl PairKind {
    fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "synergy" | "syn" => Some(PairKind::Synergy),
            "counter" | "matchup" => Some(PairKind::Counter),
            _ => None,
        }
    }
}

/// Strongest pairwise relationship between a candidate and a group.
#[derive(Debug, Clone, PartialEq)]
pub struct PairMatch {
    pub other: ChampionId,
    pub score: f64,
}

/// Synergy and counter lookups keyed by champion ID.
#[derive(Debug, Clone, Default)]
pub struct PairTables {
    synergy: HashMap<(ChampionId, ChampionId), f64>,
    counter: HashMap<(ChampionId, ChampionId), f64>,
}

impl PairTables {
    /// Empty tables: every lookup returns 0.
    pub fn new() -> Self {
        PairTables::default()
    }

    pub fn is_empty(&self) -> bool {
        self.synergy.is_empty() && self.counter.is_empty()
    }

    pub fn len(&self) -> usize {
        self.synergy.len() + self.counter.len()
    }

    pub fn insert_synergy(&mut self, a: ChampionId, b: ChampionId, score: f64) {
        self.synergy.insert(synergy_key(a, b), score);
    }

    pub fn insert_counter(&mut self, a: ChampionId, b: ChampionId, score: f64) {
        self.counter.insert((a, b), score);
    }

    /// Synergy between `a` and `b`, in either order.
    pub fn synergy(&self, a: &ChampionId, b: &ChampionId) -> f64 {
        let key = synergy_key(a.clone(), b.clone());
        self.synergy.get(&key).copied().unwrap_or(0.0)
    }

    /// How well `a` counters `b`.
    pub fn counter(&self, a: &ChampionId, b: &ChampionId) -> f64 {
        self.counter
            .get(&(a.clone(), b.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sum of `champion`'s synergy with each member of `group`.
    pub fn total_synergy(&self, champion: &ChampionId, group: &[ChampionId]) -> f64 {
        group.iter().map(|g| self.synergy(champion, g)).sum()
    }

    /// Sum of how well `champion` counters each member of `group`.
    pub fn total_counter(&self, champion: &ChampionId, group: &[ChampionId]) -> f64 {
        group.iter().map(|g| self.counter(champion, g)).sum()
    }

    /// Highest synergy between `champion` and any member of `group`.
    /// Ties keep the earlier group member.
    pub fn best_synergy(&self, champion: &ChampionId, group: &[ChampionId]) -> Option<PairMatch> {
        best_by(group, |g| self.synergy(champion, g))
    }

    /// Highest `counter(champion, g)` over `group`.
    pub fn best_counter(&self, champion: &ChampionId, group: &[ChampionId]) -> Option<PairMatch> {
        best_by(group, |g| self.counter(champion, g))
    }
}

fn synergy_key(a: ChampionId, b: ChampionId) -> (ChampionId, ChampionId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn best_by(group: &[ChampionId], score: impl Fn(&ChampionId) -> f64) -> Option<PairMatch> {
    let mut best: Option<PairMatch> = None;
    for g in group {
        let s = score(g);
        if best.as_ref().map_or(true, |b| s > b.score) {
            best = Some(PairMatch {
                other: g.clone(),
                score: s,
            });
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPairRow {
    kind: String,
    champion_a: String,
    champion_b: String,
    score: f64,
}

fn pair_tables_from_reader<R: Read>(rdr: R) -> Result<PairTables, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut tables = PairTables::new();

    for result in reader.deserialize::<RawPairRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed pair row: {}", e);
                continue;
            }
        };

        let Some(kind) = PairKind::from_label(&raw.kind) else {
            warn!("skipping pair row: unknown kind '{}'", raw.kind.trim());
            continue;
        };
        if !raw.score.is_finite() {
            warn!(
                "skipping {:?} row '{}'/'{}': non-finite score",
                kind,
                raw.champion_a.trim(),
                raw.champion_b.trim()
            );
            continue;
        }

        let a = ChampionId::from_name(&raw.champion_a);
        let b = ChampionId::from_name(&raw.champion_b);
        if a.as_str().is_empty() || b.as_str().is_empty() || a == b {
            warn!(
                "skipping pair row '{}'/'{}': empty or self pair",
                raw.champion_a.trim(),
                raw.champion_b.trim()
            );
            continue;
        }

        match kind {
            PairKind::Synergy => tables.insert_synergy(a, b, raw.score),
            PairKind::Counter => tables.insert_counter(a, b, raw.score),
        }
    }

    Ok(tables)
}

/// Load synergy and counter tables from a CSV file.
pub fn load_pair_tables(path: &Path) -> Result<PairTables, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    pair_tables_from_reader(file).map_err(|e| DataError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
