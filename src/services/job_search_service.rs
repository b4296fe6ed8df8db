use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use serde::Serialize;
use tracing::{info, warn};

use crate::models::job_alert::JobAlert;
use crate::models::listing::Listing;
use crate::providers::JobProvider;

/// Hard cap on the aggregated result set.
pub const MAX_RESULTS: usize = 50;

const PROVIDER_CALL_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Serialize)]
pub struct ApiStatus {
    pub sources: Vec<String>,
    pub total: usize,
}

/// Fans a search out to every enabled provider, then merges, deduplicates,
/// ranks and caps the combined result. Pure aggregation: no persistence.
#[derive(Clone)]
pub struct JobSearchService {
    providers: Vec<Arc<dyn JobProvider>>,
    call_timeout: Duration,
}

impl JobSearchService {
    pub fn new(providers: Vec<Arc<dyn JobProvider>>) -> Self {
        Self {
            providers,
            call_timeout: PROVIDER_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn api_status(&self) -> ApiStatus {
        ApiStatus {
            sources: self.providers.iter().map(|p| p.name().to_string()).collect(),
            total: self.providers.len(),
        }
    }

    pub async fn search_all_sources(&self, alert: &JobAlert) -> Vec<Listing> {
        if alert.keywords.is_empty() {
            warn!(alert_id = %alert.id, "Alert has no keywords, skipping all sources");
            return Vec::new();
        }

        let call_timeout = self.call_timeout;
        let searches = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            async move {
                match tokio::time::timeout(call_timeout, provider.search(alert)).await {
                    Ok(listings) => listings,
                    Err(_) => {
                        warn!(provider = provider.name(), "Provider search timed out");
                        Vec::new()
                    }
                }
            }
        });

        let per_source = future::join_all(searches).await;
        let combined: Vec<Listing> = per_source.into_iter().flatten().collect();
        info!(alert_id = %alert.id, combined = combined.len(), "Provider fan-out finished");

        let mut unique = dedup_listings(combined);
        // Stable sort keeps discovery order among equal scores.
        unique.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        unique.truncate(MAX_RESULTS);
        unique
    }
}

/// Collapse listings sharing `lower(title)_lower(company)`, keeping the one
/// with the higher match score. The first-seen listing wins ties and keeps
/// its position in discovery order.
pub fn dedup_listings(listings: Vec<Listing>) -> Vec<Listing> {
    let mut unique: Vec<Listing> = Vec::with_capacity(listings.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for listing in listings {
        let key = listing.dedup_key();
        match index.get(&key) {
            Some(&position) => {
                if listing.match_score > unique[position].match_score {
                    unique[position] = listing;
                }
            }
            None => {
                index.insert(key, unique.len());
                unique.push(listing);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    struct StubProvider {
        name: &'static str,
        listings: Vec<Listing>,
        calls: Arc<AtomicUsize>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl JobProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, _alert: &JobAlert) -> Vec<Listing> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.listings.clone()
        }
    }

    fn alert(keywords: &[&str]) -> JobAlert {
        JobAlert {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Test alert".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            location: None,
            company: None,
            salary: None,
            contract: None,
            frequency: "daily".to_string(),
            active: true,
            last_check: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn listing(title: &str, company: &str, score: i32) -> Listing {
        Listing {
            external_id: format!("test_{}_{}", title, score),
            title: title.to_string(),
            company: company.to_string(),
            location: "Paris".to_string(),
            salary: None,
            contract: None,
            description: "desc".to_string(),
            url: "https://example.com".to_string(),
            source: "Test".to_string(),
            published_at: Utc::now(),
            match_score: score,
        }
    }

    #[tokio::test]
    async fn empty_keywords_short_circuit_without_provider_calls() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = StubProvider {
            name: "Stub",
            listings: vec![listing("Dev", "Acme", 50)],
            calls: Arc::clone(&calls),
            delay: None,
        };
        let service = JobSearchService::new(vec![Arc::new(provider)]);

        let results = service.search_all_sources(&alert(&[])).await;

        assert!(results.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn colliding_listings_keep_the_higher_score() {
        let calls = Arc::new(AtomicUsize::new(0));
        let first = StubProvider {
            name: "A",
            listings: vec![listing("Backend Dev", "Acme", 60)],
            calls: Arc::clone(&calls),
            delay: None,
        };
        let second = StubProvider {
            name: "B",
            listings: vec![listing("backend dev", "ACME", 75)],
            calls: Arc::clone(&calls),
            delay: None,
        };
        let service = JobSearchService::new(vec![Arc::new(first), Arc::new(second)]);

        let results = service.search_all_sources(&alert(&["backend"])).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_score, 75);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn results_are_ranked_and_capped() {
        let listings: Vec<Listing> = (0..60)
            .map(|i| listing(&format!("Job {}", i), &format!("Company {}", i), i))
            .collect();
        let provider = StubProvider {
            name: "Big",
            listings,
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        };
        let service = JobSearchService::new(vec![Arc::new(provider)]);

        let results = service.search_all_sources(&alert(&["job"])).await;

        assert_eq!(results.len(), MAX_RESULTS);
        assert_eq!(results[0].match_score, 59);
        assert!(results.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    }

    #[tokio::test]
    async fn slow_provider_times_out_without_poisoning_the_others() {
        let fast = StubProvider {
            name: "Fast",
            listings: vec![listing("Dev", "Acme", 40)],
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        };
        let slow = StubProvider {
            name: "Slow",
            listings: vec![listing("Other", "Globex", 90)],
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Some(Duration::from_millis(250)),
        };
        let service = JobSearchService::new(vec![Arc::new(fast), Arc::new(slow)])
            .with_call_timeout(Duration::from_millis(20));

        let results = service.search_all_sources(&alert(&["dev"])).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].company, "Acme");
    }

    #[test]
    fn dedup_is_idempotent() {
        let input = vec![
            listing("Dev", "Acme", 60),
            listing("Dev", "Acme", 75),
            listing("Ops", "Globex", 50),
        ];
        let once = dedup_listings(input);
        let twice = dedup_listings(once.clone());

        assert_eq!(once.len(), 2);
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.dedup_key(), b.dedup_key());
            assert_eq!(a.match_score, b.match_score);
        }
    }

    #[test]
    fn dedup_first_seen_wins_ties_and_keeps_order() {
        let mut first = listing("Dev", "Acme", 60);
        first.source = "A".to_string();
        let mut duplicate = listing("dev", "acme", 60);
        duplicate.source = "B".to_string();
        let other = listing("Ops", "Globex", 10);

        let result = dedup_listings(vec![first, other, duplicate]);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].source, "A");
        assert_eq!(result[1].company, "Globex");
    }
}
