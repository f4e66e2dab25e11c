use async_trait::async_trait;

use crate::error::Result;
use crate::types::{OwnerProfile, ProbeLoadingState, ProbeResult};

/// Resolves a username to its public profile
#[async_trait]
pub trait OwnerLookup: Send + Sync + std::fmt::Debug {
    async fn get_owner(&self, username: &str) -> Result<OwnerProfile>;
}

/// Run one lookup, flattening the error for the probe state
pub async fn lookup_owner(
    client: &dyn OwnerLookup,
    username: &str,
) -> std::result::Result<OwnerProfile, String> {
    client.get_owner(username).await.map_err(|e| e.to_string())
}

/// Tracks the owner lookup for one column, keyed by the requested username.
///
/// A request is handed out once per key change; results for a stale key are dropped.
#[derive(Debug, Clone, Default)]
pub struct OwnerProbe {
    key: Option<String>,
    result: ProbeResult,
}

impl OwnerProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the desired key. Returns the username to fetch when a new lookup must start.
    pub fn request(&mut self, username: Option<&str>) -> Option<String> {
        if self.key.as_deref() == username {
            return None;
        }

        self.key = username.map(str::to_string);
        match username {
            Some(name) => {
                tracing::debug!(username = name, "owner probe requested");
                self.result = ProbeResult::loading();
                Some(name.to_string())
            }
            None => {
                self.result = ProbeResult::default();
                None
            }
        }
    }

    /// Store a lookup result; ignored if the key moved on meanwhile
    pub fn resolve(
        &mut self,
        username: &str,
        result: std::result::Result<OwnerProfile, String>,
    ) -> bool {
        if self.key.as_deref() != Some(username) {
            tracing::debug!(username, "dropping stale owner probe result");
            return false;
        }

        self.result = match result {
            Ok(profile) => {
                tracing::debug!(username, owner_id = profile.id, login = %profile.login, "owner resolved");
                ProbeResult {
                    loading_state: ProbeLoadingState::Loaded,
                    data: Some(profile),
                }
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "owner probe failed");
                ProbeResult {
                    loading_state: ProbeLoadingState::Error,
                    data: None,
                }
            }
        };
        true
    }

    pub fn result(&self) -> &ProbeResult {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColviewError;

    #[derive(Debug)]
    struct FakeLookup;

    #[async_trait]
    impl OwnerLookup for FakeLookup {
        async fn get_owner(&self, username: &str) -> Result<OwnerProfile> {
            match username {
                "acme" => Ok(OwnerProfile {
                    id: 7,
                    login: "acme".to_string(),
                }),
                _ => Err(ColviewError::Api("Not Found".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn lookup_feeds_probe_state() {
        let mut probe = OwnerProbe::new();
        let username = probe.request(Some("acme")).unwrap();
        let result = lookup_owner(&FakeLookup, &username).await;
        probe.resolve(&username, result);
        assert_eq!(probe.result().owner_id(), Some(7));
    }

    #[tokio::test]
    async fn failed_lookup_is_an_error_state() {
        let mut probe = OwnerProbe::new();
        let username = probe.request(Some("ghost")).unwrap();
        let result = lookup_owner(&FakeLookup, &username).await;
        assert_eq!(result, Err("API error: Not Found".to_string()));
        probe.resolve(&username, result);
        assert_eq!(probe.result().loading_state, ProbeLoadingState::Error);
        assert_eq!(probe.result().owner_id(), None);
    }

    fn profile(id: u64) -> OwnerProfile {
        OwnerProfile {
            id,
            login: "acme".to_string(),
        }
    }

    #[test]
    fn disabled_probe_never_requests() {
        let mut probe = OwnerProbe::new();
        assert_eq!(probe.request(None), None);
        assert_eq!(probe.request(None), None);
        assert_eq!(probe.result().loading_state, ProbeLoadingState::Idle);
    }

    #[test]
    fn same_key_requests_once() {
        let mut probe = OwnerProbe::new();
        assert_eq!(probe.request(Some("acme")), Some("acme".to_string()));
        assert_eq!(probe.result().loading_state, ProbeLoadingState::Loading);
        assert_eq!(probe.request(Some("acme")), None);

        assert!(probe.resolve("acme", Ok(profile(7))));
        assert_eq!(probe.request(Some("acme")), None);
        assert_eq!(probe.result().owner_id(), Some(7));
    }

    #[test]
    fn key_change_restarts_lookup() {
        let mut probe = OwnerProbe::new();
        probe.request(Some("acme"));
        probe.resolve("acme", Ok(profile(7)));

        assert_eq!(probe.request(Some("globex")), Some("globex".to_string()));
        assert_eq!(probe.result().owner_id(), None);
        assert_eq!(probe.result().loading_state, ProbeLoadingState::Loading);
    }

    #[test]
    fn stale_result_is_dropped() {
        let mut probe = OwnerProbe::new();
        probe.request(Some("acme"));
        probe.request(Some("globex"));
        assert!(!probe.resolve("acme", Ok(profile(7))));
        assert_eq!(probe.result().loading_state, ProbeLoadingState::Loading);
    }

    #[test]
    fn disabling_resets_to_idle() {
        let mut probe = OwnerProbe::new();
        probe.request(Some("acme"));
        probe.resolve("acme", Err("Not Found".to_string()));
        assert_eq!(probe.result().loading_state, ProbeLoadingState::Error);

        probe.request(None);
        assert_eq!(probe.result(), &ProbeResult::default());
    }
}
