// End-to-end flow through the app layer: shipped reference data, draft files
// and the session registry.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use draftline_app::bootstrap::{load_engine, read_draft};
use draftline_app::registry::SessionRegistry;
use draftline_app::session::{SessionError, SessionStatus};
use draftline_core::catalog::ChampionId;
use draftline_core::config::{DataPaths, EngineConfig};
use draftline_core::sequence::{ActionType, Side};
use draftline_core::DraftError;

const FIXTURES: &str = "tests/fixtures";

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn fixture(name: &str) -> PathBuf {
    manifest_dir().join(FIXTURES).join(name)
}

/// Config pointing at the reference data shipped in the repository root.
fn shipped_config() -> EngineConfig {
    let data_dir = manifest_dir().join("../../data");
    EngineConfig {
        data: DataPaths {
            champions: data_dir.join("champion_roles.json"),
            pair_stats: data_dir.join("pair_stats.csv"),
            priors: data_dir.join("priors.csv"),
        },
        ..EngineConfig::default()
    }
}

fn registry() -> SessionRegistry {
    let engine = load_engine(&shipped_config()).unwrap();
    SessionRegistry::new(Arc::new(engine))
}

#[test]
fn shipped_data_builds_an_engine() {
    let engine = load_engine(&shipped_config()).unwrap();
    assert!(engine.catalog().len() >= 80);
    assert!(!engine.tables().is_empty());
    assert!(engine.catalog().contains(&ChampionId::from_name("Kai'Sa")));
}

#[test]
fn missing_reference_file_is_reported() {
    let mut config = shipped_config();
    config.data.priors = fixture("no_such_priors.csv");
    assert!(load_engine(&config).is_err());
}

#[tokio::test]
async fn draft_file_opens_at_the_right_step() {
    let reg = registry();
    let parts = read_draft(&fixture("draft_step12.json")).unwrap();
    reg.open("match-1", &parts).await.unwrap();

    let state = reg.state("match-1").await.unwrap();
    assert_eq!(state.step(), 12);

    let report = reg.report("match-1").await.unwrap();
    assert_eq!(report.recommendations.turn.side, Side::Red);
    assert_eq!(report.recommendations.turn.action, ActionType::Ban);
    assert_eq!(report.insights.step, 12);
    for c in &report.recommendations.candidates {
        assert!(!state.is_taken(&c.champion));
    }
}

#[tokio::test]
async fn invalid_draft_file_is_rejected() {
    let reg = registry();
    let parts = read_draft(&fixture("draft_bad.json")).unwrap();
    let err = reg.open("bad", &parts).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Draft(DraftError::MalformedState(_))
    ));
    assert!(reg.is_empty().await);
}

#[tokio::test]
async fn unreadable_draft_file_is_an_error() {
    assert!(read_draft(&fixture("missing.json")).is_err());
}

#[tokio::test]
async fn following_recommendations_finishes_the_draft() {
    let reg = registry();
    let parts = read_draft(&fixture("draft_step12.json")).unwrap();
    reg.open("match-2", &parts).await.unwrap();

    for step in 12..20 {
        let recs = reg.recommend("match-2").await.unwrap();
        assert_eq!(recs.turn.step, step);
        let choice = recs.candidates[0].champion.clone();
        let committed = reg.commit("match-2", choice.clone()).await.unwrap();
        assert_eq!(committed.step, step);
        assert_eq!(committed.champion, choice);
    }

    assert_eq!(reg.status("match-2").await.unwrap(), SessionStatus::Completed);
    assert_eq!(reg.log("match-2").await.unwrap().len(), 8);
    assert!(matches!(
        reg.recommend("match-2").await,
        Err(SessionError::Draft(DraftError::DraftCompleted { steps: 20 }))
    ));
}

#[tokio::test]
async fn committing_a_taken_champion_is_illegal() {
    let reg = registry();
    let parts = read_draft(&fixture("draft_step12.json")).unwrap();
    reg.open("match-3", &parts).await.unwrap();

    let err = reg
        .commit("match-3", ChampionId::from_name("Jinx"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Draft(DraftError::IllegalAction { step: 12, .. })
    ));
    assert_eq!(reg.state("match-3").await.unwrap().step(), 12);
}

#[tokio::test]
async fn simulation_completes_the_draft_with_unique_champions() {
    let reg = registry();
    let parts = read_draft(&fixture("draft_step12.json")).unwrap();
    reg.open("match-4", &parts).await.unwrap();

    let sim = reg.simulate("match-4").await.unwrap();
    assert_eq!(sim.steps.len(), 8);
    assert_eq!(sim.steps[0].turn.step, 12);
    assert!(sim.state.is_complete());
    assert!(sim.state.validate(reg.engine().catalog()).is_ok());

    let mut seen = HashSet::new();
    for action in sim.state.actions() {
        assert!(seen.insert(action.champion.clone()), "{} repeated", action.champion);
    }
    assert_eq!(sim.blue.picks.len(), 5);
    assert_eq!(sim.red.picks.len(), 5);

    // The session itself is untouched.
    assert_eq!(reg.state("match-4").await.unwrap().step(), 12);
}

#[tokio::test]
async fn replay_agrees_with_the_simulated_choices() {
    let reg = registry();
    let parts = read_draft(&fixture("draft_step12.json")).unwrap();
    reg.open("match-5", &parts).await.unwrap();
    let sim = reg.simulate("match-5").await.unwrap();

    reg.open("match-5-final", &sim.state.to_parts()).await.unwrap();
    assert_eq!(reg.status("match-5-final").await.unwrap(), SessionStatus::Completed);

    let replay = reg.replay("match-5-final").await.unwrap();
    assert_eq!(replay.steps.len(), 20);
    for step in &replay.steps[12..] {
        assert_eq!(step.actual_rank, Some(1));
    }
    assert!(replay.top_choice_matches >= 8);
}
