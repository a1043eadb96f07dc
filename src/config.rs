use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{DEFAULT_PORT, DEFAULT_RESULTS_PATH, DEFAULT_STATIC_DIR};
use crate::result_store::StoreError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size {size} is too small (minimum {min})")]
    GridTooSmall { size: usize, min: usize },

    #[error("invalid {key} value '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },

    #[error("results store unavailable: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub results_path: PathBuf,
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "PORT",
                    value: raw.clone(),
                })?,
        };

        let results_path = match lookup("RESULTS_DB_PATH") {
            None => PathBuf::from(DEFAULT_RESULTS_PATH),
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::Empty {
                    key: "RESULTS_DB_PATH",
                })
            }
            Some(raw) => PathBuf::from(raw.trim()),
        };

        Ok(Self {
            port,
            results_path,
            static_dir: resolve_static_dir(lookup("STATIC_DIR")),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn resolve_static_dir(explicit: Option<String>) -> Option<PathBuf> {
    if let Some(raw) = explicit {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [
        PathBuf::from(DEFAULT_STATIC_DIR),
        PathBuf::from("../").join(DEFAULT_STATIC_DIR),
    ];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).expect("defaults are valid");
        assert_eq!(config.port, 3000);
        assert_eq!(config.results_path, PathBuf::from("Data/players.json"));
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn explicit_values_are_used() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", " 8081 "),
            ("RESULTS_DB_PATH", "/tmp/results.json"),
        ]))
        .expect("valid config");
        assert_eq!(config.port, 8081);
        assert_eq!(config.results_path, PathBuf::from("/tmp/results.json"));
    }

    #[test]
    fn invalid_port_refuses_to_start() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")]))
            .expect_err("port must be numeric");
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn blank_results_path_refuses_to_start() {
        let err = ServerConfig::from_lookup(lookup_from(&[("RESULTS_DB_PATH", "  ")]))
            .expect_err("blank path rejected");
        assert!(matches!(err, ConfigError::Empty { .. }));
    }

    #[test]
    fn static_dir_requires_index_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let raw = dir.path().to_string_lossy().to_string();
        assert_eq!(resolve_static_dir(Some(raw.clone())), None);

        std::fs::write(dir.path().join("index.html"), "<html></html>").expect("write index");
        assert_eq!(resolve_static_dir(Some(raw)), Some(dir.path().to_path_buf()));
    }
}
