// Integration tests: full recommendation requests against the fixture data
// set in tests/fixtures (26 champions, a handful of pair statistics, priors).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use draftline_core::catalog::{load_catalog, ChampionId, ExpectedPoolSizes, RoleCatalog};
use draftline_core::config::Limits;
use draftline_core::delta::{DeltaAnalyzer, Urgency};
use draftline_core::insights::InsightsAnalyzer;
use draftline_core::oracle::{load_priors, OracleInput, PriorOracle, UniformOracle};
use draftline_core::recommend::RecommendationEngine;
use draftline_core::role::Role;
use draftline_core::sequence::{ActionType, Side, DRAFT_LENGTH};
use draftline_core::state::{DraftParts, DraftState, SideLists, TeamId};
use draftline_core::tables::{load_pair_tables, PairTables};
use draftline_core::{DraftError, OracleError};

const FIXTURES: &str = "tests/fixtures";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(FIXTURES).join(name)
}

fn fixture_catalog() -> RoleCatalog {
    load_catalog(&fixture("champions.json"), ExpectedPoolSizes::default()).unwrap()
}

fn fixture_engine() -> RecommendationEngine {
    let catalog = fixture_catalog();
    let tables = load_pair_tables(&fixture("pair_stats.csv")).unwrap();
    let priors = load_priors(&fixture("priors.csv")).unwrap();
    let oracle = PriorOracle::new(&catalog, &priors, tables.clone());
    RecommendationEngine::new(Arc::new(catalog), Arc::new(tables), Arc::new(oracle))
}

fn ids(names: &[&str]) -> Vec<ChampionId> {
    names.iter().map(|n| ChampionId::from_name(n)).collect()
}

/// Step 12: both sides have banned three and picked three; Red bans next.
fn mid_draft_parts() -> DraftParts {
    DraftParts {
        blue_team: TeamId(10),
        red_team: TeamId(20),
        picks: SideLists {
            blue: ids(&["Nami", "Vi", "Ahri"]),
            red: ids(&["Jinx", "Ornn", "Sejuani"]),
        },
        bans: SideLists {
            blue: ids(&["Zed", "Syndra", "Azir"]),
            red: ids(&["Kai'Sa", "Maokai", "Lee Sin"]),
        },
    }
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[test]
fn fixture_data_loads_and_skips_bad_rows() {
    let catalog = fixture_catalog();
    assert_eq!(catalog.len(), 26);
    let maokai = ChampionId::from_name("Maokai");
    assert_eq!(catalog.eligible_roles(&maokai).len(), 3);
    assert!(catalog.eligible_roles(&ChampionId::from_name("Mystery")).is_empty());
    assert_eq!(catalog.name_of(&ChampionId::from_name("Kai'Sa")), "Kai'Sa");

    // Unknown kind, self pair and unparsable score are dropped.
    let tables = load_pair_tables(&fixture("pair_stats.csv")).unwrap();
    assert_eq!(tables.len(), 7);
    let xayah = ChampionId::from_name("Xayah");
    let rakan = ChampionId::from_name("Rakan");
    assert_eq!(tables.synergy(&rakan, &xayah), 0.11);
    let syndra = ChampionId::from_name("Syndra");
    let zed = ChampionId::from_name("Zed");
    assert_eq!(tables.counter(&syndra, &zed), 0.05);
    assert_eq!(tables.counter(&zed, &syndra), 0.0);

    // Negative weight row is dropped.
    let priors = load_priors(&fixture("priors.csv")).unwrap();
    assert_eq!(priors.len(), 26);
    assert!(!priors.contains_key(&ChampionId::from_name("Ghost")));
}

#[test]
fn role_counts_file_builds_a_catalog() {
    let catalog = load_catalog(&fixture("role_counts.csv"), ExpectedPoolSizes::default()).unwrap();
    assert_eq!(catalog.len(), 7);

    let roles = |name: &str| catalog.eligible_roles(&ChampionId::from_name(name)).to_vec();
    assert_eq!(roles("Aatrox"), vec![Role::Top]);
    // 88/261 top, 130/261 jungle, 31/261 support (under 15%).
    assert_eq!(roles("Gragas"), vec![Role::Top, Role::Jungle]);
    assert_eq!(roles("Maokai"), vec![Role::Top, Role::Jungle, Role::Support]);
    assert_eq!(roles("Kai'Sa"), vec![Role::Adc]);
    assert!(roles("Rookie").is_empty());
    assert_eq!(catalog.name_of(&ChampionId::from_name("Kai'Sa")), "Kai'Sa");
}

#[test]
fn missing_data_file_is_an_error() {
    assert!(load_catalog(&fixture("nope.json"), ExpectedPoolSizes::default()).is_err());
    assert!(load_pair_tables(&fixture("nope.csv")).is_err());
    assert!(load_priors(&fixture("nope.csv")).is_err());
}

// ---------------------------------------------------------------------------
// Recommendation requests
// ---------------------------------------------------------------------------

#[test]
fn opening_ban_ranks_every_champion() {
    let engine = fixture_engine();
    let state = DraftState::new(TeamId(10), TeamId(20));
    let recs = engine.recommend(&state).unwrap();

    assert_eq!(recs.turn.step, 0);
    assert_eq!(recs.turn.side, Side::Blue);
    assert_eq!(recs.turn.action, ActionType::Ban);
    assert_eq!(recs.candidates.len(), 26);

    let total: f64 = recs.candidates.iter().map(|c| c.score).sum();
    assert!((total - 1.0).abs() < 1e-9);
    for pair in recs.candidates.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    // Highest ban weight in the fixture.
    assert_eq!(recs.candidates[0].champion, ChampionId::from_name("Maokai"));

    // Hints only inside the hint window; bans carry no displayed role.
    for (rank, c) in recs.candidates.iter().enumerate() {
        assert_eq!(c.hints.is_empty(), rank >= 10, "rank {rank}");
        assert!(c.displayed_role.is_none());
    }
}

#[test]
fn repeated_requests_are_identical() {
    let engine = fixture_engine();
    let state = DraftState::from_parts(&mid_draft_parts(), engine.catalog()).unwrap();
    let first = engine.recommend(&state).unwrap();
    let second = engine.recommend(&state).unwrap();
    assert_eq!(first, second);
}

#[test]
fn taken_champions_never_reappear() {
    let engine = fixture_engine();
    let parts = mid_draft_parts();
    let state = DraftState::from_parts(&parts, engine.catalog()).unwrap();
    let recs = engine.recommend(&state).unwrap();

    assert_eq!(recs.candidates.len(), 26 - 12);
    for c in &recs.candidates {
        assert!(!state.is_taken(&c.champion), "{} is taken", c.champion);
    }
}

#[test]
fn bans_discount_champions_the_enemy_cannot_field() {
    let engine = fixture_engine();
    let state = DraftState::from_parts(&mid_draft_parts(), engine.catalog()).unwrap();
    let recs = engine.recommend(&state).unwrap();
    assert_eq!(recs.turn.side, Side::Red);
    assert_eq!(recs.turn.action, ActionType::Ban);

    // Blue already fields Nami; another pure support does not fit.
    let find = |name: &str| {
        recs.candidates
            .iter()
            .find(|c| c.champion == ChampionId::from_name(name))
            .unwrap()
    };
    let lulu = find("Lulu");
    let garen = find("Garen");
    let mystery = find("Mystery");
    assert!(!lulu.role_viable);
    assert!(garen.role_viable);
    assert!(mystery.role_viable);

    // Lulu's ban prior is far above Garen's, but the penalty flips them.
    assert!(lulu.probability > garen.probability);
    assert!(lulu.score < garen.score);
    let ratio = (lulu.score / garen.score) / (lulu.probability / garen.probability);
    assert!((ratio - 0.01).abs() < 1e-9);
}

#[test]
fn pick_hints_name_synergy_partners() {
    let limits = Limits {
        hint_limit: 50,
        ..Limits::default()
    };
    let engine = fixture_engine().with_limits(limits);

    // Step 9: Blue's second pick, with Rakan already locked in.
    let parts = DraftParts {
        picks: SideLists {
            blue: ids(&["Rakan"]),
            red: ids(&["Ornn", "Vi"]),
        },
        bans: SideLists {
            blue: ids(&["Zed", "Syndra", "Azir"]),
            red: ids(&["Kai'Sa", "Maokai", "Lee Sin"]),
        },
        ..DraftParts::default()
    };
    let state = DraftState::from_parts(&parts, engine.catalog()).unwrap();
    let recs = engine.recommend(&state).unwrap();
    assert_eq!(recs.turn.step, 9);
    assert_eq!(recs.turn.action, ActionType::Pick);

    let xayah = recs
        .candidates
        .iter()
        .find(|c| c.champion == ChampionId::from_name("Xayah"))
        .unwrap();
    let synergy = xayah.hints.synergy.as_ref().unwrap();
    assert_eq!(synergy.name, "Rakan");
    let why = xayah.hints.why.as_ref().unwrap();
    assert_eq!(why.phrases[0], "Strong synergy with Rakan");
    assert!(why.text.contains("Strong synergy with Rakan"));
    assert!(xayah.displayed_role.is_some());

    // Another support cannot join Rakan.
    let thresh = recs
        .candidates
        .iter()
        .find(|c| c.champion == ChampionId::from_name("Thresh"))
        .unwrap();
    assert!(!thresh.role_viable);
}

// ---------------------------------------------------------------------------
// Deltas and pressure
// ---------------------------------------------------------------------------

#[test]
fn deltas_are_never_negative() {
    let engine = fixture_engine();
    let state = DraftState::from_parts(&mid_draft_parts(), engine.catalog()).unwrap();
    let analyzer = DeltaAnalyzer::new(engine.oracle(), engine.catalog(), engine.thresholds());

    for champ in engine.catalog().champions() {
        if state.is_taken(&champ.id) {
            continue;
        }
        let report = analyzer.analyze(&state, &champ.id).unwrap();
        assert!(report.delta >= 0.0, "{}: {}", champ.id, report.delta);
        assert_eq!(
            report.urgency,
            Urgency::classify(report.delta, engine.thresholds())
        );
    }
}

#[test]
fn filled_roles_carry_no_pressure() {
    let engine = fixture_engine();
    let calc = engine.pressure_calculator();

    let pressure = calc.compute(&ids(&["Garen"]), &[], &[]);
    assert_eq!(pressure.get(Role::Top), 0.0);
    // Five pure mids against an expected pool of 25.
    assert!((pressure.get(Role::Mid) - 0.8).abs() < 1e-9);

    let empty = calc.compute(&[], &[], &[]);
    for (_, p) in empty.iter() {
        assert!((0.0..=1.0).contains(&p));
    }
}

#[test]
fn insights_cover_both_sides() {
    let engine = fixture_engine();
    let state = DraftState::from_parts(&mid_draft_parts(), engine.catalog()).unwrap();
    let insights = InsightsAnalyzer::new(&engine).analyze(&state).unwrap();

    assert_eq!(insights.step, 12);
    assert_eq!(insights.acting_side, Side::Red);
    let top = insights.top_candidate.as_ref().unwrap();
    assert!(top.delta >= 0.0);
    assert_eq!(insights.forced, top.delta > engine.thresholds().forced_delta);

    for side in [&insights.blue, &insights.red] {
        assert!(side.intent.len() <= 5);
        for entry in &side.intent {
            assert!(!state.is_taken(&entry.champion));
            assert!(entry.probability > 0.01);
        }
        for pair in side.intent.windows(2) {
            assert!(pair[0].probability >= pair[1].probability);
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle and failures
// ---------------------------------------------------------------------------

#[test]
fn last_step_is_served_then_draft_completes() {
    let engine = fixture_engine();
    let mut state = DraftState::new(TeamId(10), TeamId(20));

    for _ in 0..DRAFT_LENGTH - 1 {
        let recs = engine.recommend(&state).unwrap();
        let choice = recs.candidates[0].champion.clone();
        state.commit(choice, engine.catalog()).unwrap();
    }
    assert_eq!(state.step(), 19);

    let last = engine.recommend(&state).unwrap();
    assert_eq!(last.turn.side, Side::Red);
    assert_eq!(last.turn.action, ActionType::Pick);
    state
        .commit(last.candidates[0].champion.clone(), engine.catalog())
        .unwrap();

    assert!(state.is_complete());
    assert!(matches!(
        engine.recommend(&state),
        Err(DraftError::DraftCompleted { steps: 20 })
    ));
    assert!(matches!(
        InsightsAnalyzer::new(&engine).analyze(&state),
        Err(DraftError::DraftCompleted { .. })
    ));
}

#[test]
fn empty_priors_make_the_oracle_unavailable() {
    let catalog = fixture_catalog();
    let oracle = PriorOracle::new(&catalog, &Default::default(), PairTables::new());
    let engine = RecommendationEngine::new(
        Arc::new(catalog),
        Arc::new(PairTables::new()),
        Arc::new(oracle),
    );
    let state = DraftState::new(TeamId(1), TeamId(2));
    assert!(matches!(
        engine.recommend(&state),
        Err(DraftError::OracleUnavailable(_))
    ));
}

#[test]
fn wrong_sized_oracle_output_fails_the_request() {
    let catalog = fixture_catalog();
    let short = |_: &OracleInput| -> Result<Vec<f64>, OracleError> { Ok(vec![1.0; 3]) };
    let engine = RecommendationEngine::new(
        Arc::new(catalog),
        Arc::new(PairTables::new()),
        Arc::new(short),
    );
    let state = DraftState::new(TeamId(1), TeamId(2));
    assert!(matches!(
        engine.recommend(&state),
        Err(DraftError::OracleUnavailable(_))
    ));
}

#[test]
fn uniform_oracle_breaks_ties_by_champion_id() {
    let catalog = fixture_catalog();
    let oracle = UniformOracle::new(&catalog);
    let engine = RecommendationEngine::new(
        Arc::new(catalog),
        Arc::new(PairTables::new()),
        Arc::new(oracle),
    );
    let recs = engine
        .recommend(&DraftState::new(TeamId(1), TeamId(2)))
        .unwrap();
    let order: Vec<&str> = recs.candidates.iter().map(|c| c.champion.as_str()).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[test]
fn inconsistent_parts_are_rejected() {
    let catalog = fixture_catalog();
    let mut parts = mid_draft_parts();
    parts.picks.red.push(ChampionId::from_name("Nami"));
    assert!(matches!(
        DraftState::from_parts(&parts, &catalog),
        Err(DraftError::MalformedState(_))
    ));
}
