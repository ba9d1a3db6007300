use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::costing::CostingRules;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Spreadsheets,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    /// Folder holding the exported spreadsheets. Defaults to the working directory.
    pub data_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// A marketplace sale is kept when its status contains any of these.
    pub valid_states: Vec<String>,
    pub reseller_gateway_rate: f64,
    pub costing: CostingRules,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            valid_states: [
                "Entregue",
                "Venda entregue",
                "Pacote de 2 produtos",
                "Pacote de 3 produtos",
                "Pacote de 4 produtos",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            reseller_gateway_rate: 0.04,
            costing: CostingRules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdsSettings {
    pub enabled: bool,
}

impl Default for AdsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceSettings,
    pub pipeline: PipelineSettings,
    pub ads: AdsSettings,
    pub cache: CacheSettings,
}

impl AppConfig {
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse config toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.source
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.source.db_path {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "doti", "salesdash")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("sales.sqlite"))
}

pub fn default_log_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("logs"))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AppConfig::from_toml("").expect("empty config should parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.pipeline.reseller_gateway_rate, 0.04);
        assert_eq!(config.pipeline.costing.default_cost, 44.16);
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let config = AppConfig::from_toml(
            r#"
            [source]
            kind = "sqlite"
            db_path = "/tmp/vendas.sqlite"

            [ads]
            enabled = false

            [pipeline.costing]
            default_cost = 50.0
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.source.kind, SourceKind::Sqlite);
        assert!(!config.ads.enabled);
        assert_eq!(config.pipeline.costing.default_cost, 50.0);
        assert_eq!(config.pipeline.costing.categories.len(), 9);
        assert_eq!(
            config.db_path().expect("db path"),
            PathBuf::from("/tmp/vendas.sqlite")
        );
    }

    #[test]
    fn unknown_source_kind_is_rejected() {
        assert!(AppConfig::from_toml("[source]\nkind = \"postgres\"").is_err());
    }
}
