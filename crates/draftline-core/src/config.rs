// Configuration loading and parsing (engine.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::ExpectedPoolSizes;
use crate::role::Role;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub limits: Limits,
    pub pool: ExpectedPoolSizes,
    pub data: DataPaths,
}

// ---------------------------------------------------------------------------
// engine.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct EngineFile {
    #[serde(default)]
    thresholds: Thresholds,
    #[serde(default)]
    limits: Limits,
    #[serde(default)]
    pool: ExpectedPoolSizes,
    #[serde(default)]
    data: DataPaths,
}

/// Numeric cut-offs used by the ranking, urgency and insight logic.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Delta above which a candidate is urgent.
    pub urgent_delta: f64,
    /// Delta above which a candidate is contested.
    pub contested_delta: f64,
    /// Additive smoothing inside the KL divergence.
    pub smoothing_epsilon: f64,
    /// Score multiplier for role-infeasible picks and redundant bans.
    pub viability_penalty: f64,
    /// Minimum per-role pressure drop reported as a pressure-reduction hint.
    pub pressure_hint: f64,
    /// Minimum synergy/counter magnitude surfaced as a hint.
    pub pair_hint_min: f64,
    /// Counter value that makes a late pick a "strategic counter".
    pub late_counter_min: f64,
    /// Pressure drop for a single-role pick to read as filling its role.
    pub role_fill: f64,
    /// Pressure above which a role is reported missing.
    pub missing_role: f64,
    /// Pressure above which a role counts as open for team intent.
    pub intent_role_gap: f64,
    /// Delta above which the top candidate is a forced choice.
    pub forced_delta: f64,
    /// Probability floor for team-intent entries.
    pub intent_min_probability: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            urgent_delta: 0.15,
            contested_delta: 0.05,
            smoothing_epsilon: 1e-9,
            viability_penalty: 0.01,
            pressure_hint: 0.1,
            pair_hint_min: 0.05,
            late_counter_min: 0.03,
            role_fill: 0.3,
            missing_role: 0.8,
            intent_role_gap: 0.1,
            forced_delta: 0.2,
            intent_min_probability: 0.01,
        }
    }
}

/// Bounds on how much work and output one request produces.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Candidates that get full hint analysis (two oracle calls each).
    pub hint_limit: usize,
    /// Candidates returned per request.
    pub result_limit: usize,
    /// Entries per side in the team-intent insight.
    pub intent_size: usize,
    /// Steps before which flexible picks are called out as early picks.
    pub early_phase_steps: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            hint_limit: 10,
            result_limit: 50,
            intent_size: 5,
            early_phase_steps: 10,
        }
    }
}

/// Reference data locations. Relative paths resolve against the base
/// directory the config was loaded from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    /// Role artifact (`.json`) or per-role appearance counts (`.csv`).
    pub champions: PathBuf,
    pub pair_stats: PathBuf,
    pub priors: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            champions: PathBuf::from("data/champion_roles.json"),
            pair_stats: PathBuf::from("data/pair_stats.csv"),
            priors: PathBuf::from("data/priors.csv"),
        }
    }
}

impl DataPaths {
    fn resolved(self, base_dir: &Path) -> DataPaths {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base_dir.join(p) };
        DataPaths {
            champions: resolve(self.champions),
            pair_stats: resolve(self.pair_stats),
            priors: resolve(self.priors),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/engine.toml` relative to
/// `base_dir`.
///
/// Does not copy defaults. Prefer `load_config()`, which does.
pub fn load_config_from(base_dir: &Path) -> Result<EngineConfig, ConfigError> {
    let engine_path = base_dir.join("config").join("engine.toml");
    let text = read_file(&engine_path)?;
    let file: EngineFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: engine_path.clone(),
        source: e,
    })?;

    let config = EngineConfig {
        thresholds: file.thresholds,
        limits: file.limits,
        pool: file.pool,
        data: file.data.resolved(base_dir),
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` with every `defaults/*.toml` it lacks and return the paths
/// written. Files already in `config/` are left alone, and templates such as
/// `engine.toml.example` are not `.toml` files, so they stay behind.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, false) => {
            return Err(seed_error(format!(
                "neither defaults/ nor config/ directory found in {}",
                base_dir.display()
            )));
        }
        (false, true) => {
            debug!("No defaults/ in {}, using config/ as is", base_dir.display());
            return Ok(Vec::new());
        }
        _ => {}
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut seeded = Vec::new();
    for template in default_tomls(&defaults_dir)? {
        let Some(name) = template.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if seed_file(&template, &target)? {
            info!("Seeded {} from {}", target.display(), template.display());
            seeded.push(target);
        }
    }
    Ok(seeded)
}

/// `.toml` files directly under `dir`, sorted by path.
fn default_tomls(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| seed_error(format!("cannot read {}: {e}", dir.display())))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| seed_error(format!("cannot read {}: {e}", dir.display())))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Copy `from` to `to` unless `to` already exists. Returns whether a file
/// was written.
fn seed_file(from: &Path, to: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(to)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(seed_error(format!("cannot create {}: {e}", to.display()))),
    };
    let mut src = std::fs::File::open(from)
        .map_err(|e| seed_error(format!("cannot open {}: {e}", from.display())))?;
    std::io::copy(&mut src, &mut dest)
        .map_err(|e| seed_error(format!("cannot write {}: {e}", to.display())))?;
    Ok(true)
}

fn seed_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check every field; the first violation wins.
pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    let t = &config.thresholds;

    let non_negative: &[(&str, f64)] = &[
        ("thresholds.urgent_delta", t.urgent_delta),
        ("thresholds.contested_delta", t.contested_delta),
        ("thresholds.pressure_hint", t.pressure_hint),
        ("thresholds.pair_hint_min", t.pair_hint_min),
        ("thresholds.late_counter_min", t.late_counter_min),
        ("thresholds.role_fill", t.role_fill),
        ("thresholds.forced_delta", t.forced_delta),
    ];
    for (name, val) in non_negative {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be a finite value >= 0, got {val}")));
        }
    }

    if t.contested_delta > t.urgent_delta {
        return Err(invalid(
            "thresholds.contested_delta",
            format!(
                "must not exceed urgent_delta ({}), got {}",
                t.urgent_delta, t.contested_delta
            ),
        ));
    }

    if !(t.smoothing_epsilon > 0.0 && t.smoothing_epsilon < 1.0) {
        return Err(invalid(
            "thresholds.smoothing_epsilon",
            format!("must be in (0, 1), got {}", t.smoothing_epsilon),
        ));
    }

    let unit: &[(&str, f64)] = &[
        ("thresholds.viability_penalty", t.viability_penalty),
        ("thresholds.missing_role", t.missing_role),
        ("thresholds.intent_role_gap", t.intent_role_gap),
        ("thresholds.intent_min_probability", t.intent_min_probability),
    ];
    for (name, val) in unit {
        if !(0.0..=1.0).contains(val) {
            return Err(invalid(
                name,
                format!("must be between 0.0 and 1.0 inclusive, got {val}"),
            ));
        }
    }

    let l = &config.limits;
    let counts: &[(&str, usize)] = &[
        ("limits.result_limit", l.result_limit),
        ("limits.intent_size", l.intent_size),
    ];
    for (name, val) in counts {
        if *val == 0 {
            return Err(invalid(name, "must be > 0".into()));
        }
    }

    for role in Role::ALL {
        if config.pool.get(role) == 0 {
            return Err(invalid(
                &format!("pool.{}", role.display_str()),
                "must be > 0".into(),
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
