use std::path::PathBuf;

use crate::config::{config_dir, AuthConfig, TokenSource};
use crate::types::Credentials;

/// Token kinds, also the stored token file names
const APP: &str = "app";
const GITHUB_APP: &str = "github_app";
const GITHUB: &str = "github";

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        return non_empty(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    None
}

fn non_empty(token: String) -> Option<String> {
    let token = token.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Stored token path: ~/.config/colview/tokens/{kind}
fn token_path(kind: &str) -> Option<PathBuf> {
    Some(config_dir()?.join("tokens").join(kind))
}

fn load_stored_token(kind: &str) -> Option<String> {
    let path = token_path(kind)?;
    non_empty(std::fs::read_to_string(path).ok()?)
}

/// Load one token, trying in order:
/// 1. Environment variable
/// 2. Stored token from ~/.config/colview/tokens/{kind}
/// 3. CLI command
fn load_token(kind: &str, source: &TokenSource) -> Option<String> {
    if let Some(token) = source
        .env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .and_then(non_empty)
    {
        return Some(token);
    }

    if let Some(token) = load_stored_token(kind) {
        return Some(token);
    }

    let token = source.command.as_deref().and_then(try_cli_token);
    if token.is_none() {
        tracing::debug!(kind, "no token found");
    }
    token
}

pub fn load_credentials(config: &AuthConfig) -> Credentials {
    Credentials {
        app_token: load_token(APP, &config.app),
        github_app_token: load_token(GITHUB_APP, &config.github_app),
        github_token: load_token(GITHUB, &config.github),
    }
}

/// Reload credentials; the installation token is only re-read when asked for
pub fn refresh_credentials(
    config: &AuthConfig,
    current: &Credentials,
    include_installation_token: bool,
) -> Credentials {
    let mut refreshed = Credentials {
        app_token: load_token(APP, &config.app),
        github_app_token: current.github_app_token.clone(),
        github_token: load_token(GITHUB, &config.github),
    };
    if include_installation_token {
        refreshed.github_app_token = load_token(GITHUB_APP, &config.github_app);
    }
    refreshed
}
