// Champion reference data: identities, eligible roles, expected pool sizes.
//
// The catalog is built once from reference data and passed explicitly to
// every component that needs it. Catalog order (sorted by champion ID) is also
// the index space of the scoring oracle's output.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DataError;
use crate::role::{Role, RoleSet, ROLE_COUNT};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Stable champion identifier (normalized name, e.g. "kaisa").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChampionId(pub String);

impl ChampionId {
    pub fn new(id: impl Into<String>) -> Self {
        ChampionId(id.into())
    }

    /// Derive an ID from a display name: keep alphanumerics, lower-case.
    /// "Kai'Sa" -> "kaisa", "Dr. Mundo" -> "drmundo".
    pub fn from_name(name: &str) -> Self {
        ChampionId(
            name.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(|c| c.to_lowercase())
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChampionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChampionId {
    fn from(s: &str) -> Self {
        ChampionId(s.to_string())
    }
}

/// Immutable reference record for one champion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub id: ChampionId,
    pub name: String,
    /// Declared eligible roles. Empty means unknown.
    pub roles: RoleSet,
}

impl Champion {
    pub fn new(name: &str, roles: &[Role]) -> Self {
        Champion {
            id: ChampionId::from_name(name),
            name: name.to_string(),
            roles: roles.iter().copied().collect(),
        }
    }
}

/// Historical size of each role's viable champion pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedPoolSizes {
    #[serde(rename = "TOP")]
    pub top: u32,
    #[serde(rename = "JUNGLE")]
    pub jungle: u32,
    #[serde(rename = "MID")]
    pub mid: u32,
    #[serde(rename = "ADC")]
    pub adc: u32,
    #[serde(rename = "SUPPORT")]
    pub support: u32,
}

impl ExpectedPoolSizes {
    pub fn get(&self, role: Role) -> u32 {
        match role {
            Role::Top => self.top,
            Role::Jungle => self.jungle,
            Role::Mid => self.mid,
            Role::Adc => self.adc,
            Role::Support => self.support,
        }
    }

    pub fn as_array(&self) -> [u32; ROLE_COUNT] {
        Role::ALL.map(|r| self.get(r))
    }
}

impl Default for ExpectedPoolSizes {
    fn default() -> Self {
        ExpectedPoolSizes {
            top: 22,
            jungle: 23,
            mid: 25,
            adc: 21,
            support: 23,
        }
    }
}

// ---------------------------------------------------------------------------
// RoleCatalog
// ---------------------------------------------------------------------------

/// Read-only champion/role lookup, point-in-time consistent for its lifetime.
/// Refreshing means building a new catalog.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    champions: Vec<Champion>,
    index: HashMap<ChampionId, usize>,
    pool_sizes: ExpectedPoolSizes,
}

impl RoleCatalog {
    /// Build a catalog. Champions are re-ordered by ID; duplicate IDs are
    /// rejected.
    pub fn new(mut champions: Vec<Champion>, pool_sizes: ExpectedPoolSizes) -> Result<Self, DataError> {
        champions.sort_by(|a, b| a.id.cmp(&b.id));

        let mut index = HashMap::with_capacity(champions.len());
        for (i, champ) in champions.iter().enumerate() {
            if index.insert(champ.id.clone(), i).is_some() {
                return Err(DataError::Validation(format!(
                    "duplicate champion id '{}'",
                    champ.id
                )));
            }
        }

        Ok(RoleCatalog {
            champions,
            index,
            pool_sizes,
        })
    }

    pub fn len(&self) -> usize {
        self.champions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.champions.is_empty()
    }

    /// All champions in oracle index order.
    pub fn champions(&self) -> &[Champion] {
        &self.champions
    }

    pub fn contains(&self, id: &ChampionId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ChampionId) -> Option<&Champion> {
        self.index.get(id).map(|&i| &self.champions[i])
    }

    /// Oracle index of a champion.
    pub fn index_of(&self, id: &ChampionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn champion_at(&self, idx: usize) -> Option<&Champion> {
        self.champions.get(idx)
    }

    /// Declared roles; empty when the champion is unknown or has no role data.
    pub fn eligible_roles(&self, id: &ChampionId) -> RoleSet {
        self.get(id).map(|c| c.roles).unwrap_or(RoleSet::EMPTY)
    }

    /// Roles usable for assignment under the open-world rule: a champion with
    /// no role data may fill any role.
    pub fn assignable_roles(&self, id: &ChampionId) -> RoleSet {
        self.eligible_roles(id).or_any()
    }

    pub fn expected_pool_size(&self, role: Role) -> u32 {
        self.pool_sizes.get(role)
    }

    pub fn pool_sizes(&self) -> &ExpectedPoolSizes {
        &self.pool_sizes
    }

    /// Display name for an ID, falling back to the ID itself.
    pub fn name_of<'a>(&'a self, id: &'a ChampionId) -> &'a str {
        self.get(id).map(|c| c.name.as_str()).unwrap_or(id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role derivation from appearance counts
// ---------------------------------------------------------------------------

/// Minimum share of a champion's games a role needs to count as eligible.
pub const DEFAULT_MIN_ROLE_SHARE: f64 = 0.15;

/// Turn per-role appearance counts (indexed like [`Role::ALL`]) into an
/// eligible role set.
///
/// Every role played in at least `min_share` of the champion's games is
/// eligible. If none qualifies, the single most played role is used. A
/// champion never seen at all gets an empty set.
pub fn derive_roles(counts: [u32; ROLE_COUNT], min_share: f64) -> RoleSet {
    let total: u32 = counts.iter().sum();
    if total == 0 {
        return RoleSet::EMPTY;
    }

    let set: RoleSet = Role::ALL
        .into_iter()
        .filter(|r| counts[r.index()] as f64 / total as f64 >= min_share)
        .collect();
    if !set.is_empty() {
        return set;
    }

    // Ties go to the earlier role in declared order.
    let mut best = Role::Top;
    for role in Role::ALL {
        if counts[role.index()] > counts[best.index()] {
            best = role;
        }
    }
    RoleSet::single(best)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse the role artifact: a JSON object mapping display name to a list of
/// role labels, e.g. `{"Kai'Sa": ["bot"], "Sett": ["top", "support"]}`.
fn champions_from_reader<R: Read>(rdr: R) -> Result<Vec<Champion>, serde_json::Error> {
    let raw: BTreeMap<String, Vec<String>> = serde_json::from_reader(rdr)?;
    let mut champions = Vec::with_capacity(raw.len());

    for (name, labels) in raw {
        let name = name.trim().to_string();
        let id = ChampionId::from_name(&name);
        if id.as_str().is_empty() {
            warn!("skipping champion with empty name");
            continue;
        }

        let mut roles = RoleSet::EMPTY;
        for label in &labels {
            match Role::from_label(label) {
                Some(role) => roles.insert(role),
                None => warn!("champion '{}': unknown role label '{}'", name, label),
            }
        }

        champions.push(Champion { id, name, roles });
    }

    Ok(champions)
}

#[derive(Debug, Deserialize)]
struct RawRoleCounts {
    champion: String,
    top: u32,
    jungle: u32,
    mid: u32,
    #[serde(alias = "adc")]
    bot: u32,
    support: u32,
}

/// Parse per-role appearance counts (`champion,top,jungle,mid,bot,support`)
/// and derive each champion's eligible roles with [`derive_roles`].
///
/// Repeated rows for one champion are summed, so a file can be a plain
/// concatenation of per-season exports.
fn champions_from_counts<R: Read>(rdr: R, min_share: f64) -> Result<Vec<Champion>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut totals: BTreeMap<ChampionId, (String, [u32; ROLE_COUNT])> = BTreeMap::new();

    for result in reader.deserialize::<RawRoleCounts>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed role-count row: {}", e);
                continue;
            }
        };
        let name = raw.champion.trim().to_string();
        let id = ChampionId::from_name(&name);
        if id.as_str().is_empty() {
            warn!("skipping role-count row with empty champion name");
            continue;
        }

        let row = [raw.top, raw.jungle, raw.mid, raw.bot, raw.support];
        let entry = totals.entry(id).or_insert_with(|| (name, [0; ROLE_COUNT]));
        for (total, count) in entry.1.iter_mut().zip(row) {
            *total = total.saturating_add(count);
        }
    }

    Ok(totals
        .into_iter()
        .map(|(id, (name, counts))| Champion {
            id,
            name,
            roles: derive_roles(counts, min_share),
        })
        .collect())
}

/// Load champions from a role file.
///
/// `.csv` files hold per-role appearance counts and go through
/// [`derive_roles`] with [`DEFAULT_MIN_ROLE_SHARE`]; anything else is read as
/// the JSON role artifact.
pub fn load_champions(path: &Path) -> Result<Vec<Champion>, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_counts = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_counts {
        return champions_from_counts(file, DEFAULT_MIN_ROLE_SHARE).map_err(|e| DataError::Csv {
            path: path.display().to_string(),
            source: e,
        });
    }

    champions_from_reader(file).map_err(|e| DataError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a role file (artifact JSON or role-count CSV) and build the catalog.
pub fn load_catalog(path: &Path, pool_sizes: ExpectedPoolSizes) -> Result<RoleCatalog, DataError> {
    let champions = load_champions(path)?;
    if champions.is_empty() {
        return Err(DataError::Validation(format!(
            "role file {} produced zero champions",
            path.display()
        )));
    }
    RoleCatalog::new(champions, pool_sizes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_name_strips_punctuation() {
        assert_eq!(ChampionId::from_name("Kai'Sa").as_str(), "kaisa");
        assert_eq!(ChampionId::from_name("Dr. Mundo").as_str(), "drmundo");
        assert_eq!(ChampionId::from_name("Lee Sin").as_str(), "leesin");
    }

    #[test]
    fn catalog_orders_by_id_and_indexes() {
        let catalog = RoleCatalog::new(
            vec![
                Champion::new("Zed", &[Role::Mid]),
                Champion::new("Ahri", &[Role::Mid]),
                Champion::new("Lulu", &[Role::Support, Role::Mid]),
            ],
            ExpectedPoolSizes::default(),
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.index_of(&"ahri".into()), Some(0));
        assert_eq!(catalog.index_of(&"lulu".into()), Some(1));
        assert_eq!(catalog.index_of(&"zed".into()), Some(2));
        assert_eq!(catalog.champion_at(2).map(|c| c.name.as_str()), Some("Zed"));
        assert_eq!(catalog.name_of(&"lulu".into()), "Lulu");
        assert_eq!(catalog.name_of(&"ghost".into()), "ghost");
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = RoleCatalog::new(
            vec![Champion::new("Ahri", &[Role::Mid]), Champion::new("ahri", &[])],
            ExpectedPoolSizes::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DataError::Validation(_)));
    }

    #[test]
    fn unknown_roles_are_open_world_for_assignment() {
        let catalog = RoleCatalog::new(
            vec![Champion::new("Mystery", &[]), Champion::new("Garen", &[Role::Top])],
            ExpectedPoolSizes::default(),
        )
        .unwrap();

        let mystery = ChampionId::from_name("Mystery");
        assert!(catalog.eligible_roles(&mystery).is_empty());
        assert_eq!(catalog.assignable_roles(&mystery), RoleSet::ALL);
        assert_eq!(
            catalog.assignable_roles(&"garen".into()),
            RoleSet::single(Role::Top)
        );
        // IDs missing from the catalog behave the same way.
        assert_eq!(catalog.assignable_roles(&"nobody".into()), RoleSet::ALL);
    }

    #[test]
    fn default_pool_sizes() {
        let sizes = ExpectedPoolSizes::default();
        assert_eq!(sizes.as_array(), [22, 23, 25, 21, 23]);
    }

    #[test]
    fn derive_roles_keeps_significant_roles() {
        // 70% top, 20% mid, 10% jungle
        let roles = derive_roles([70, 10, 20, 0, 0], DEFAULT_MIN_ROLE_SHARE);
        assert_eq!(roles.to_vec(), vec![Role::Top, Role::Mid]);
    }

    #[test]
    fn derive_roles_falls_back_to_most_played() {
        // Spread so thin nothing reaches the threshold.
        let roles = derive_roles([10, 12, 11, 9, 10], 0.5);
        assert_eq!(roles, RoleSet::single(Role::Jungle));
        assert!(derive_roles([0; ROLE_COUNT], 0.15).is_empty());
    }

    #[test]
    fn role_artifact_parses_labels() {
        let json = r#"{
            "Kai'Sa": ["bot"],
            "Sett": ["top", "support"],
            "Mystery": [],
            "Odd": ["coach", "mid"]
        }"#;
        let champions = champions_from_reader(json.as_bytes()).unwrap();
        assert_eq!(champions.len(), 4);

        let kaisa = champions.iter().find(|c| c.id.as_str() == "kaisa").unwrap();
        assert_eq!(kaisa.name, "Kai'Sa");
        assert_eq!(kaisa.roles, RoleSet::single(Role::Adc));

        let sett = champions.iter().find(|c| c.id.as_str() == "sett").unwrap();
        assert_eq!(sett.roles.to_vec(), vec![Role::Top, Role::Support]);

        let mystery = champions.iter().find(|c| c.id.as_str() == "mystery").unwrap();
        assert!(mystery.roles.is_empty());

        // Unknown labels are dropped, known ones kept.
        let odd = champions.iter().find(|c| c.id.as_str() == "odd").unwrap();
        assert_eq!(odd.roles, RoleSet::single(Role::Mid));
    }

    #[test]
    fn role_counts_derive_eligible_roles() {
        let csv = "champion,top,jungle,mid,bot,support\n\
                   Sett,60,0,0,0,40\n\
                   Kai'Sa,0,0,3,97,0\n\
                   Sett,20,0,0,0,0\n\
                   Broken,x,0,0,0,0\n\
                   Unplayed,0,0,0,0,0\n";
        let champions = champions_from_counts(csv.as_bytes(), DEFAULT_MIN_ROLE_SHARE).unwrap();
        assert_eq!(champions.len(), 3);

        // 80 top / 40 support after summing both rows: support is 33%.
        let sett = champions.iter().find(|c| c.id.as_str() == "sett").unwrap();
        assert_eq!(sett.roles.to_vec(), vec![Role::Top, Role::Support]);
        assert_eq!(sett.name, "Sett");

        // 3% mid is noise.
        let kaisa = champions.iter().find(|c| c.id.as_str() == "kaisa").unwrap();
        assert_eq!(kaisa.roles, RoleSet::single(Role::Adc));

        let unplayed = champions.iter().find(|c| c.id.as_str() == "unplayed").unwrap();
        assert!(unplayed.roles.is_empty());
    }

    #[test]
    fn role_counts_accept_adc_header() {
        let csv = "champion,top,jungle,mid,adc,support\nJinx,0,0,0,50,0\n";
        let champions = champions_from_counts(csv.as_bytes(), DEFAULT_MIN_ROLE_SHARE).unwrap();
        assert_eq!(champions[0].roles, RoleSet::single(Role::Adc));
    }

    #[test]
    fn role_artifact_rejects_non_object() {
        assert!(champions_from_reader("[1, 2, 3]".as_bytes()).is_err());
    }
}
