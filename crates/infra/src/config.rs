//! Configuration loading and representation.
//!
//! Everything is read from the environment; unset variables fall back to the
//! defaults below so a fresh checkout runs against `./data`.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const INVENTORY_FILE_VAR: &str = "FIXTRACK_INVENTORY_FILE";
pub const LEDGER_FILE_VAR: &str = "FIXTRACK_LEDGER_FILE";
pub const BIND_VAR: &str = "FIXTRACK_BIND";

pub const DEFAULT_INVENTORY_FILE: &str = "data/fixtures.csv";
pub const DEFAULT_LEDGER_FILE: &str = "data/borrowed_fixtures.csv";
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address ({value:?}): {source}")]
    InvalidBind {
        var: &'static str,
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Static inventory table (read-only).
    pub inventory_path: PathBuf,
    /// Borrow ledger table (created on first use).
    pub ledger_path: PathBuf,
    pub bind: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source (tests inject a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let inventory_path = path_var(&lookup, INVENTORY_FILE_VAR, DEFAULT_INVENTORY_FILE)?;
        let ledger_path = path_var(&lookup, LEDGER_FILE_VAR, DEFAULT_LEDGER_FILE)?;

        let bind_raw = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                var: BIND_VAR,
                value: bind_raw.clone(),
                source,
            })?;

        Ok(Self {
            inventory_path,
            ledger_path,
            bind,
        })
    }
}

fn path_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: &str,
) -> Result<PathBuf, ConfigError> {
    match lookup(var) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(var)),
        Some(value) => Ok(PathBuf::from(value.trim())),
        None => {
            tracing::info!("{var} not set; using {default}");
            Ok(PathBuf::from(default))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.inventory_path, PathBuf::from(DEFAULT_INVENTORY_FILE));
        assert_eq!(cfg.ledger_path, PathBuf::from(DEFAULT_LEDGER_FILE));
        assert_eq!(cfg.bind.port(), 5000);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (INVENTORY_FILE_VAR, "/srv/inv.csv"),
            (LEDGER_FILE_VAR, "/srv/ledger.csv"),
            (BIND_VAR, "0.0.0.0:8080"),
        ]))
        .unwrap();
        assert_eq!(cfg.inventory_path, PathBuf::from("/srv/inv.csv"));
        assert_eq!(cfg.ledger_path, PathBuf::from("/srv/ledger.csv"));
        assert_eq!(cfg.bind.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(BIND_VAR, "localhost")])),
            Err(ConfigError::InvalidBind { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(LEDGER_FILE_VAR, " ")])),
            Err(ConfigError::Empty(LEDGER_FILE_VAR))
        ));
    }
}
