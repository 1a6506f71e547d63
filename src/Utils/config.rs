//! Solver configuration read from a TOML file; every key is optional.
//!
//! ```toml
//! algebra_backend = "native"
//! loglevel = "info"
//! log_file = "deriv.log"   # "auto" picks log_<date>_<time>.txt
//! compute_budget_ms = 2000
//! max_expression_nodes = 100000
//! point_digits = 6
//! ```
use crate::derivative::derivative_computer::DEFAULT_POINT_DIGITS;
use crate::derivative::result_assembler::PipelineSettings;
use crate::symbolic::symbolic_traits::{
    AlgebraBackend, AlgebraCapability, DEFAULT_MAX_NODES, algebra_from_string,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// `f64` carries at most 17 significant decimal digits.
const MAX_POINT_DIGITS: usize = 17;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(String),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub algebra_backend: String,
    pub loglevel: String,
    pub log_file: Option<PathBuf>,
    pub compute_budget_ms: Option<u64>,
    pub max_expression_nodes: usize,
    pub point_digits: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            algebra_backend: AlgebraBackend::Native.to_string(),
            loglevel: "info".to_string(),
            log_file: None,
            compute_budget_ms: None,
            max_expression_nodes: DEFAULT_MAX_NODES,
            point_digits: DEFAULT_POINT_DIGITS,
        }
    }
}

impl SolverConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SolverConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.algebra_backend.trim().parse::<AlgebraBackend>().is_err() {
            return Err(ConfigError::Invalid {
                key: "algebra_backend",
                message: format!("'{}' is not one of native, disabled", self.algebra_backend),
            });
        }
        if self.max_expression_nodes == 0 {
            return Err(ConfigError::Invalid {
                key: "max_expression_nodes",
                message: "must be positive".to_string(),
            });
        }
        if !(1..=MAX_POINT_DIGITS).contains(&self.point_digits) {
            return Err(ConfigError::Invalid {
                key: "point_digits",
                message: format!("{} is outside 1..={}", self.point_digits, MAX_POINT_DIGITS),
            });
        }
        Ok(())
    }

    pub fn compute_budget(&self) -> Option<Duration> {
        self.compute_budget_ms.map(Duration::from_millis)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            compute_budget: self.compute_budget(),
            point_digits: self.point_digits,
        }
    }

    /// The configured capability, built once per process.
    pub fn build_algebra(&self) -> Option<Box<dyn AlgebraCapability>> {
        algebra_from_string(&self.algebra_backend, self.max_expression_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, SolverConfig::default());
        assert_eq!(config.algebra_backend, "native");
        assert_eq!(config.compute_budget(), None);
        assert_eq!(config.pipeline_settings(), PipelineSettings::default());
        assert!(config.build_algebra().is_some());
    }

    #[test]
    fn test_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "algebra_backend = \"disabled\"\nloglevel = \"debug\"\nlog_file = \"run.log\"\n\
             compute_budget_ms = 250\nmax_expression_nodes = 500\npoint_digits = 4"
        )
        .unwrap();
        let config = SolverConfig::from_file(file.path()).unwrap();
        assert_eq!(config.loglevel, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("run.log")));
        assert_eq!(config.compute_budget(), Some(Duration::from_millis(250)));
        assert_eq!(config.pipeline_settings().point_digits, 4);
        assert!(config.build_algebra().is_none());
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            SolverConfig::from_toml_str("colour = \"red\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("point_digits = \"six\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("algebra_backend = \"sympy\""),
            Err(ConfigError::Invalid { key: "algebra_backend", .. })
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("point_digits = 0"),
            Err(ConfigError::Invalid { key: "point_digits", .. })
        ));
        assert!(matches!(
            SolverConfig::from_file("/definitely/not/here.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
