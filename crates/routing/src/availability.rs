//! Availability registry: live up/down flags for every configured provider.
//!
//! Advisory only: selection still attempts a call, and every call outcome
//! re-marks the provider. Updates are unconditional overwrites, so
//! concurrent writers are last-writer-wins.
//!
//! ```text
//! {available} --call fails--> {unavailable} --call or probe succeeds--> {available}
//! ```

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use parley_core::ProviderStatus;
use tokio::sync::RwLock;
use tracing::info;

pub struct AvailabilityRegistry {
    statuses: RwLock<HashMap<String, ProviderStatus>>,
}

impl AvailabilityRegistry {
    /// Every provider starts available, checked "now".
    pub fn new<I, S>(provider_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        let statuses = provider_ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                let status = ProviderStatus {
                    provider_id: id.clone(),
                    available: true,
                    last_checked: now,
                };
                (id, status)
            })
            .collect();

        Self {
            statuses: RwLock::new(statuses),
        }
    }

    /// Record an availability flag with the current time.
    pub async fn mark(&self, provider_id: &str, available: bool) {
        self.mark_at(provider_id, available, Utc::now()).await;
    }

    /// Record an availability flag with an explicit check time.
    pub async fn mark_at(&self, provider_id: &str, available: bool, at: DateTime<Utc>) {
        let mut statuses = self.statuses.write().await;
        let previous = statuses.get(provider_id).map(|s| s.available);
        statuses.insert(
            provider_id.to_string(),
            ProviderStatus {
                provider_id: provider_id.to_string(),
                available,
                last_checked: at,
            },
        );
        drop(statuses);

        if previous != Some(available) {
            info!(provider = %provider_id, available, "Provider availability changed");
        }
    }

    /// Providers currently flagged available.
    pub async fn list_available(&self) -> BTreeSet<String> {
        self.statuses
            .read()
            .await
            .values()
            .filter(|s| s.available)
            .map(|s| s.provider_id.clone())
            .collect()
    }

    pub async fn is_available(&self, provider_id: &str) -> bool {
        self.statuses
            .read()
            .await
            .get(provider_id)
            .is_some_and(|s| s.available)
    }

    pub async fn status(&self, provider_id: &str) -> Option<ProviderStatus> {
        self.statuses.read().await.get(provider_id).cloned()
    }

    /// Every status, sorted by provider id.
    pub async fn snapshot(&self) -> Vec<ProviderStatus> {
        let mut all: Vec<ProviderStatus> = self.statuses.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        all
    }

    /// Providers whose last check is older than `interval` as of `now`.
    pub async fn stale_as_of(&self, now: DateTime<Utc>, interval: Duration) -> Vec<String> {
        let mut stale: Vec<String> = self
            .statuses
            .read()
            .await
            .values()
            .filter(|s| now - s.last_checked > interval)
            .map(|s| s.provider_id.clone())
            .collect();
        stale.sort_unstable();
        stale
    }

    pub async fn stale(&self, interval: Duration) -> Vec<String> {
        self.stale_as_of(Utc::now(), interval).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn all_start_available() {
        let registry = AvailabilityRegistry::new(["openai", "anthropic"]);
        let available = registry.list_available().await;
        assert_eq!(available.len(), 2);
        assert!(registry.is_available("openai").await);
        assert!(!registry.is_available("unknown").await);
    }

    #[tokio::test]
    async fn mark_flips_and_restores() {
        let registry = AvailabilityRegistry::new(["anthropic"]);

        registry.mark("anthropic", false).await;
        assert!(!registry.is_available("anthropic").await);
        assert!(registry.list_available().await.is_empty());

        registry.mark("anthropic", true).await;
        assert!(registry.is_available("anthropic").await);
    }

    #[tokio::test]
    async fn mark_updates_timestamp() {
        let registry = AvailabilityRegistry::new(["openai"]);
        let at = Utc::now() - Duration::hours(1);
        registry.mark_at("openai", true, at).await;
        assert_eq!(registry.status("openai").await.unwrap().last_checked, at);
    }

    #[tokio::test]
    async fn stale_providers_by_interval() {
        let registry = AvailabilityRegistry::new(["a", "b"]);
        let now = Utc::now();
        registry.mark_at("a", false, now - Duration::seconds(120)).await;
        registry.mark_at("b", true, now - Duration::seconds(10)).await;

        let stale = registry.stale_as_of(now, Duration::seconds(60)).await;
        assert_eq!(stale, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn snapshot_is_sorted() {
        let registry = AvailabilityRegistry::new(["gemini", "anthropic", "openai"]);
        let ids: Vec<String> = registry
            .snapshot()
            .await
            .into_iter()
            .map(|s| s.provider_id)
            .collect();
        assert_eq!(ids, vec!["anthropic", "gemini", "openai"]);
    }
}
