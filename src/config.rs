use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ColviewError, Result};
use crate::install::InstallLink;
use crate::types::{Column, ColumnFilters, SubjectType, SubscriptionParams};

const DEFAULT_APP_SLUG: &str = "devhub";
const DEFAULT_COLUMNS_LIMIT: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_app_slug")]
    pub github_app_slug: String,
    pub install_redirect_uri: Option<String>,
    /// Columns past this position skip the private-repository flow
    #[serde(default = "default_columns_limit")]
    pub columns_limit: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            github_app_slug: default_app_slug(),
            install_redirect_uri: None,
            columns_limit: default_columns_limit(),
        }
    }
}

fn default_app_slug() -> String {
    DEFAULT_APP_SLUG.to_string()
}

fn default_columns_limit() -> usize {
    DEFAULT_COLUMNS_LIMIT
}

/// Where tokens come from, per token kind
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSource {
    pub env: Option<String>,
    pub command: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_app_source")]
    pub app: TokenSource,
    #[serde(default = "default_github_app_source")]
    pub github_app: TokenSource,
    #[serde(default = "default_github_source")]
    pub github: TokenSource,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            app: default_app_source(),
            github_app: default_github_app_source(),
            github: default_github_source(),
        }
    }
}

fn default_app_source() -> TokenSource {
    TokenSource {
        env: Some("COLVIEW_APP_TOKEN".to_string()),
        command: None,
    }
}

fn default_github_app_source() -> TokenSource {
    TokenSource {
        env: Some("GITHUB_APP_TOKEN".to_string()),
        command: None,
    }
}

fn default_github_source() -> TokenSource {
    TokenSource {
        env: Some("GITHUB_TOKEN".to_string()),
        command: Some("gh auth token".to_string()),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub id: String,
    #[serde(default)]
    pub subject_type: SubjectType,
    pub repo: Option<String>,
    pub owner: Option<String>,
    #[serde(default)]
    pub saved: bool,
    pub cleared_at: Option<DateTime<Utc>>,
}

impl ColumnConfig {
    pub fn column(&self) -> Column {
        Column {
            id: self.id.clone(),
            filters: ColumnFilters {
                cleared_at: self.cleared_at,
                saved: self.saved,
            },
        }
    }

    pub fn params(&self) -> SubscriptionParams {
        SubscriptionParams {
            subject_type: self.subject_type,
            repo: self.repo.clone(),
            owner: self.owner.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            auth: AuthConfig::default(),
            columns: vec![ColumnConfig {
                id: "rust-issues".to_string(),
                subject_type: SubjectType::Issue,
                repo: Some("rust-lang/rust".to_string()),
                owner: None,
                saved: false,
                cleared_at: None,
            }],
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("colview"))
}

fn config_path() -> Option<PathBuf> {
    Some(config_dir()?.join("config.toml"))
}

impl Config {
    /// Load from `path` or the default location, falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match Config::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config");
                Config::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config =
            toml::from_str::<Config>(content).map_err(|e| ColviewError::Config(e.to_string()))?;

        if config.columns.is_empty() {
            return Ok(Config {
                columns: Config::default().columns,
                ..config
            });
        }

        for column in &config.columns {
            if column.repo.is_none() && column.owner.is_none() {
                return Err(ColviewError::Config(format!(
                    "column '{}' needs a repo or an owner",
                    column.id
                )));
            }
        }
        Ok(config)
    }

    pub fn install_link(&self) -> InstallLink {
        InstallLink::new(
            self.general.github_app_slug.clone(),
            self.general.install_redirect_uri.clone(),
        )
    }
}
