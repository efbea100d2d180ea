use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{Enricher, EnrichmentResult};
use crate::error::EnrichmentUnavailable;
use crate::features::FeatureVector;

/// Get the platform-appropriate cache directory for enrichment results
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("hybrid-score/enrichment"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/hybrid-score/enrichment",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Remove every cached enrichment result
pub fn clear_cache(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    result: EnrichmentResult,
    stored_at: u64, // Unix timestamp
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Wraps an enricher with a disk cache keyed on the feature fingerprint.
///
/// Only successful results are stored; a failure is always retried on the
/// next run. Keys carry no user data, only the fingerprint.
pub struct CachedEnricher<E> {
    inner: E,
    cache_path: PathBuf,
    ttl: Duration,
}

impl<E: Enricher> CachedEnricher<E> {
    pub fn new(inner: E, cache_path: PathBuf, ttl: Duration) -> Self {
        Self {
            inner,
            cache_path,
            ttl,
        }
    }

    fn key(features: &FeatureVector) -> String {
        format!("enrichment:{}", features.fingerprint())
    }

    fn read(&self, key: &str) -> Option<EnrichmentResult> {
        let bytes = cacache::read_sync(&self.cache_path, key).ok()?;
        let entry: CacheEntry = serde_json::from_slice(&bytes).ok()?;
        if now_secs().saturating_sub(entry.stored_at) >= self.ttl.as_secs() {
            debug!("Cached enrichment {} expired", key);
            return None;
        }
        Some(entry.result)
    }

    fn write(&self, key: &str, result: &EnrichmentResult) -> Result<()> {
        let entry = CacheEntry {
            result: result.clone(),
            stored_at: now_secs(),
        };
        let json = serde_json::to_vec(&entry)?;
        cacache::write_sync(&self.cache_path, key, &json)?;
        Ok(())
    }
}

#[async_trait]
impl<E: Enricher> Enricher for CachedEnricher<E> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn enrich(
        &self,
        features: &FeatureVector,
    ) -> Result<EnrichmentResult, EnrichmentUnavailable> {
        let key = Self::key(features);
        if let Some(hit) = self.read(&key) {
            debug!("Enrichment cache hit for {}", key);
            return Ok(hit);
        }

        let result = self.inner.enrich(features).await?;
        if let Err(e) = self.write(&key, &result) {
            warn!("Failed to cache enrichment result: {}", e);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::StubEnricher;
    use crate::features::{FeatureValue, Indicator};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingEnricher {
        calls: Arc<AtomicUsize>,
        inner: StubEnricher,
    }

    #[async_trait]
    impl Enricher for CountingEnricher {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn enrich(
            &self,
            features: &FeatureVector,
        ) -> Result<EnrichmentResult, EnrichmentUnavailable> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.enrich(features).await
        }
    }

    fn counting(inner: StubEnricher) -> (CountingEnricher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            CountingEnricher {
                calls: calls.clone(),
                inner,
            },
            calls,
        )
    }

    #[tokio::test]
    async fn test_hit_skips_inner() {
        let dir = tempfile::tempdir().unwrap();
        let (inner, calls) = counting(StubEnricher::new(vec!["tip".to_string()], Some(1.0)));
        let cached = CachedEnricher::new(inner, dir.path().to_path_buf(), Duration::from_secs(3600));

        let features = FeatureVector::default();
        let first = cached.enrich(&features).await.unwrap();
        let second = cached.enrich(&features).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_features_miss() {
        let dir = tempfile::tempdir().unwrap();
        let (inner, calls) = counting(StubEnricher::offline());
        let cached = CachedEnricher::new(inner, dir.path().to_path_buf(), Duration::from_secs(3600));

        let mut other = FeatureVector::default();
        other.set(Indicator::SavingsRate, FeatureValue::Known(0.3));

        cached.enrich(&FeatureVector::default()).await.unwrap();
        cached.enrich(&other).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let (inner, calls) = counting(StubEnricher::failing(EnrichmentUnavailable::Timeout));
        let cached = CachedEnricher::new(inner, dir.path().to_path_buf(), Duration::from_secs(3600));

        let features = FeatureVector::default();
        assert!(cached.enrich(&features).await.is_err());
        assert!(cached.enrich(&features).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_misses() {
        let dir = tempfile::tempdir().unwrap();
        let (inner, calls) = counting(StubEnricher::offline());
        let cached = CachedEnricher::new(inner, dir.path().to_path_buf(), Duration::ZERO);

        let features = FeatureVector::default();
        cached.enrich(&features).await.unwrap();
        cached.enrich(&features).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear_missing_cache_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(clear_cache(&dir.path().join("absent")).is_ok());
    }
}
