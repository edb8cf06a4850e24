//! Environment configuration.

use std::path::PathBuf;

use refdata_core::{DomainError, DomainResult};
use refdata_observability::{LogConfig, LogFormat};

use crate::catalog::ReferenceCatalog;
use crate::shared::SharedCatalog;

pub const SNAPSHOT_PATH_VAR: &str = "REFDATA_SNAPSHOT_PATH";
pub const LOG_FORMAT_VAR: &str = "REFDATA_LOG_FORMAT";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfraConfig {
    /// JSON catalog snapshot loaded at startup; empty catalog when unset.
    pub snapshot_path: Option<PathBuf>,
    pub log: LogConfig,
}

impl InfraConfig {
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let snapshot_path = lookup(SNAPSHOT_PATH_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);

        let format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|err| DomainError::validation(format!("{LOG_FORMAT_VAR}: {err}")))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            snapshot_path,
            log: LogConfig {
                format,
                ..LogConfig::default()
            },
        })
    }

    pub fn load_catalog(&self) -> anyhow::Result<SharedCatalog> {
        match &self.snapshot_path {
            Some(path) => Ok(SharedCatalog::new(ReferenceCatalog::load(path)?)),
            None => {
                tracing::warn!("{SNAPSHOT_PATH_VAR} not set; starting with an empty catalog");
                Ok(SharedCatalog::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> DomainResult<InfraConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        InfraConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config(&[]).unwrap();
        assert_eq!(config, InfraConfig::default());
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.load_catalog().unwrap().snapshot().node_count(), 0);
    }

    #[test]
    fn reads_snapshot_path_and_format() {
        let config = config(&[
            (SNAPSHOT_PATH_VAR, " /srv/refdata/catalog.json "),
            (LOG_FORMAT_VAR, "pretty"),
        ])
        .unwrap();
        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("/srv/refdata/catalog.json"))
        );
        assert_eq!(config.log.format, LogFormat::Pretty);
    }

    #[test]
    fn unknown_log_format_is_a_validation_error() {
        let err = config(&[(LOG_FORMAT_VAR, "xml")]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn missing_snapshot_file_fails_loading() {
        let config = config(&[(SNAPSHOT_PATH_VAR, "/nonexistent/catalog.json")]).unwrap();
        assert!(config.load_catalog().is_err());
    }
}
