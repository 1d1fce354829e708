//! Coordinator-facing configuration.
//!
//! Everything the original deployment hard-coded is externally configurable
//! here: the seed roster, the email domain required for new reviewers, the
//! reviewers kept off the leaderboards, and the thresholds behind the
//! pending-counter status indicator. Defaults match the production values;
//! a YAML file (explicit path or `REVQ_CONFIG`) overrides them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Environment variable naming the config file when no path is given.
pub const CONFIG_PATH_ENV: &str = "REVQ_CONFIG";

const DEFAULT_REVIEWER_DOMAIN: &str = "@iie.cl";

const DEFAULT_SEED_REVIEWERS: [&str; 32] = [
    "antonia.cutino@iie.cl",
    "antonia.rios@iie.cl",
    "claudia.sanjuan@iie.cl",
    "diego.moya@iie.cl",
    "daniela.medel@iie.cl",
    "alexandra.castro@iie.cl",
    "isabella.iubini@iie.cl",
    "javiera.arriagada@iie.cl",
    "katherine.marilaf@iie.cl",
    "javiera.narvaez@iie.cl",
    "maria.salinas@iie.cl",
    "mariela.arevalo@iie.cl",
    "kerim.segura@iie.cl",
    "pamela.alarcon@iie.cl",
    "pedro.salinas@iie.cl",
    "rebeca.benavides@iie.cl",
    "rocio.betancur@iie.cl",
    "rocio.concha@iie.cl",
    "rocio.vasquez@iie.cl",
    "rodrigo.zamorano@iie.cl",
    "stefany.leon@iie.cl",
    "tomas.andrade@iie.cl",
    "valeria.henriquezvilla@iie.cl",
    "veronica.gutierrez@iie.cl",
    "ximena.bastias@iie.cl",
    "pablo.casanueva@iie.cl",
    "pavlo.saldano@iie.cl",
    "valentina.altamirano@iie.cl",
    "amapola.cirano@iie.cl",
    "lukas.redel@iie.cl",
    "antonia.lomboy@iie.cl",
    "carol.nova@iie.cl",
];

const DEFAULT_LEADERBOARD_EXCLUSIONS: [&str; 7] = [
    "daniela.jara@iie.cl",
    "daniela.sanhueza@iie.cl",
    "gabriela.forte@iie.cl",
    "leslie.segura@iie.cl",
    "natalia.espinoza@iie.cl",
    "pamela.alarcon@iie.cl",
    "veronica.gutierrez@iie.cl",
];

/// Root configuration for one revq session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Baseline roster; protected from removal in the session.
    pub seed_reviewers: Vec<String>,
    /// Suffix (including `@`) required of newly added reviewers.
    pub reviewer_domain: String,
    /// Reviewers removed from both sides of the leaderboard ratio.
    pub leaderboard_exclusions: Vec<String>,
    pub pending_thresholds: PendingThresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed_reviewers: DEFAULT_SEED_REVIEWERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            reviewer_domain: DEFAULT_REVIEWER_DOMAIN.to_string(),
            leaderboard_exclusions: DEFAULT_LEADERBOARD_EXCLUSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            pending_thresholds: PendingThresholds::default(),
        }
    }
}

impl AppConfig {
    /// Loads from an explicit path, else `REVQ_CONFIG`, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let env_path = std::env::var(CONFIG_PATH_ENV).ok();
        let resolved = match (path, env_path.as_deref()) {
            (Some(p), _) => p.to_path_buf(),
            (None, Some(p)) if !p.trim().is_empty() => Path::new(p).to_path_buf(),
            _ => return Ok(Self::default()),
        };
        let text = std::fs::read_to_string(&resolved)
            .map_err(|err| CoreError::Config(format!("read {}: {err}", resolved.display())))?;
        Self::from_yaml(&text)
    }

    /// Parses and validates a YAML document; absent keys keep defaults.
    pub fn from_yaml(text: &str) -> Result<Self, CoreError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|err| CoreError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the whole configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.reviewer_domain.starts_with('@') || self.reviewer_domain.len() < 2 {
            return Err(CoreError::Config(
                "reviewer_domain must start with '@'".into(),
            ));
        }
        for reviewer in &self.seed_reviewers {
            if !reviewer.contains('@') {
                return Err(CoreError::Config(format!(
                    "seed reviewer {reviewer:?} is not an email address"
                )));
            }
        }
        let thresholds = &self.pending_thresholds;
        if thresholds.critical_below > thresholds.comfortable_above {
            return Err(CoreError::Config(
                "pending_thresholds.critical_below must not exceed comfortable_above".into(),
            ));
        }
        Ok(())
    }
}

/// Cutoffs for the pending-counter status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingThresholds {
    /// Strictly above this many unassigned pending videos is comfortable.
    pub comfortable_above: usize,
    /// Strictly below this many is critical.
    pub critical_below: usize,
}

impl Default for PendingThresholds {
    fn default() -> Self {
        Self {
            comfortable_above: 5,
            critical_below: 2,
        }
    }
}

/// Status level shown next to the unassigned-pending counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingLevel {
    Comfortable,
    Tight,
    Critical,
}

impl PendingThresholds {
    pub fn classify(&self, pending: usize) -> PendingLevel {
        if pending > self.comfortable_above {
            PendingLevel::Comfortable
        } else if pending < self.critical_below {
            PendingLevel::Critical
        } else {
            PendingLevel::Tight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_constants() {
        let config = AppConfig::default();
        assert_eq!(config.seed_reviewers.len(), 32);
        assert_eq!(config.reviewer_domain, "@iie.cl");
        assert_eq!(config.leaderboard_exclusions.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_overrides_keep_absent_keys_at_defaults() {
        let config = match AppConfig::from_yaml("reviewer_domain: \"@example.org\"\n") {
            Ok(config) => config,
            Err(err) => panic!("parse failed: {err}"),
        };
        assert_eq!(config.reviewer_domain, "@example.org");
        assert_eq!(config.seed_reviewers.len(), 32);
    }

    #[test]
    fn rejects_domain_without_at_sign() {
        let result = AppConfig::from_yaml("reviewer_domain: iie.cl\n");
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let text = "pending_thresholds:\n  comfortable_above: 1\n  critical_below: 4\n";
        assert!(matches!(
            AppConfig::from_yaml(text),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn classify_matches_indicator_bands() {
        let thresholds = PendingThresholds::default();
        assert_eq!(thresholds.classify(6), PendingLevel::Comfortable);
        assert_eq!(thresholds.classify(5), PendingLevel::Tight);
        assert_eq!(thresholds.classify(2), PendingLevel::Tight);
        assert_eq!(thresholds.classify(1), PendingLevel::Critical);
        assert_eq!(thresholds.classify(0), PendingLevel::Critical);
    }

    #[test]
    fn load_with_explicit_path_reads_file() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir failed: {err}"),
        };
        let path = dir.path().join("revq.yaml");
        if let Err(err) = std::fs::write(&path, "reviewer_domain: \"@example.org\"\n") {
            panic!("write failed: {err}");
        }
        let config = match AppConfig::load(Some(&path)) {
            Ok(config) => config,
            Err(err) => panic!("load failed: {err}"),
        };
        assert_eq!(config.reviewer_domain, "@example.org");
    }

    #[test]
    fn load_with_missing_file_is_a_config_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/revq.yaml")));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
