use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use taskflow_backend::error::Result;
use taskflow_backend::models::job_alert::JobAlert;
use taskflow_backend::models::listing::Listing;
use taskflow_backend::providers::JobProvider;
use taskflow_backend::services::alert_processor::AlertProcessor;
use taskflow_backend::services::alert_store::{AlertStore, NewJobOffer};
use taskflow_backend::services::job_search_service::JobSearchService;

struct StoredOffer {
    offer: NewJobOffer,
    is_saved: bool,
    created_at: DateTime<Utc>,
}

/// Map-backed store keyed like the unique index on (external_id, source).
#[derive(Default)]
struct InMemoryStore {
    alerts: Mutex<HashMap<Uuid, JobAlert>>,
    offers: Mutex<HashMap<(String, String), StoredOffer>>,
}

impl InMemoryStore {
    fn with_alert(alert: JobAlert) -> Self {
        let store = Self::default();
        store.alerts.lock().unwrap().insert(alert.id, alert);
        store
    }

    fn offer_count(&self) -> usize {
        self.offers.lock().unwrap().len()
    }

    fn seed_offer(&self, offer: NewJobOffer, is_saved: bool, created_at: DateTime<Utc>) {
        self.offers.lock().unwrap().insert(
            (offer.external_id.clone(), offer.source.clone()),
            StoredOffer {
                offer,
                is_saved,
                created_at,
            },
        );
    }

    fn score_of(&self, external_id: &str, source: &str) -> Option<i32> {
        self.offers
            .lock()
            .unwrap()
            .get(&(external_id.to_string(), source.to_string()))
            .map(|stored| stored.offer.match_score)
    }

    fn last_check_of(&self, alert_id: Uuid) -> Option<DateTime<Utc>> {
        self.alerts
            .lock()
            .unwrap()
            .get(&alert_id)
            .and_then(|a| a.last_check)
    }
}

#[async_trait]
impl AlertStore for InMemoryStore {
    async fn find_alert_by_id(&self, id: Uuid) -> Result<Option<JobAlert>> {
        Ok(self.alerts.lock().unwrap().get(&id).cloned())
    }

    async fn find_active_alerts(&self) -> Result<Vec<JobAlert>> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.active)
            .cloned()
            .collect())
    }

    async fn upsert_job_offer(&self, offer: &NewJobOffer) -> Result<bool> {
        let mut offers = self.offers.lock().unwrap();
        let key = (offer.external_id.clone(), offer.source.clone());
        match offers.get_mut(&key) {
            Some(existing) => {
                existing.offer.match_score = offer.match_score;
                Ok(false)
            }
            None => {
                offers.insert(
                    key,
                    StoredOffer {
                        offer: offer.clone(),
                        is_saved: false,
                        created_at: Utc::now(),
                    },
                );
                Ok(true)
            }
        }
    }

    async fn delete_offers_older_than(
        &self,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
        keep_saved: bool,
    ) -> Result<u64> {
        let mut offers = self.offers.lock().unwrap();
        let before = offers.len();
        offers.retain(|_, stored| {
            let expired = stored.offer.user_id == user_id
                && stored.created_at < cutoff
                && (!keep_saved || !stored.is_saved);
            !expired
        });
        Ok((before - offers.len()) as u64)
    }

    async fn update_alert_last_check(
        &self,
        alert_id: Uuid,
        checked_at: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(alert) = self.alerts.lock().unwrap().get_mut(&alert_id) {
            alert.last_check = Some(checked_at);
        }
        Ok(())
    }
}

struct StubProvider {
    name: &'static str,
    listings: Vec<Listing>,
}

#[async_trait]
impl JobProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, _alert: &JobAlert) -> Vec<Listing> {
        self.listings.clone()
    }
}

fn alert() -> JobAlert {
    JobAlert {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: "Rust backend".to_string(),
        keywords: vec!["rust".to_string()],
        location: Some("Lyon".to_string()),
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

fn listing(external_id: &str, source: &str, title: &str, company: &str, score: i32) -> Listing {
    Listing {
        external_id: external_id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        location: "Lyon".to_string(),
        salary: None,
        contract: None,
        description: "desc".to_string(),
        url: format!("https://example.com/{}", external_id),
        source: source.to_string(),
        published_at: Utc::now(),
        match_score: score,
    }
}

fn new_offer(external_id: &str, alert: &JobAlert) -> NewJobOffer {
    NewJobOffer {
        external_id: external_id.to_string(),
        source: "Seeded".to_string(),
        title: "Old offer".to_string(),
        company: "Initech".to_string(),
        location: "Lyon".to_string(),
        salary: None,
        contract: None,
        description: None,
        url: "https://example.com/old".to_string(),
        published_at: Utc::now() - Duration::days(60),
        match_score: 10,
        alert_id: alert.id,
        user_id: alert.user_id,
    }
}

fn processor_over(
    store: Arc<InMemoryStore>,
    providers: Vec<Arc<dyn JobProvider>>,
) -> AlertProcessor {
    AlertProcessor::new(store, JobSearchService::new(providers))
}

#[tokio::test]
async fn reprocessing_the_same_alert_does_not_duplicate_offers() {
    let alert = alert();
    let alert_id = alert.id;
    let store = Arc::new(InMemoryStore::with_alert(alert));

    let provider: Arc<dyn JobProvider> = Arc::new(StubProvider {
        name: "Stub",
        listings: vec![
            listing("s1", "Stub", "Rust Dev", "Acme", 80),
            listing("s2", "Stub", "Rust Ops", "Globex", 60),
        ],
    });
    let processor = processor_over(Arc::clone(&store), vec![provider]);

    let first = processor.process_alert(alert_id).await;
    assert!(first.processed);
    assert_eq!(first.total_found, 2);
    assert_eq!(first.new_offers, 2);
    assert_eq!(store.offer_count(), 2);

    let second = processor.process_alert(alert_id).await;
    assert!(second.processed);
    assert_eq!(second.total_found, 2);
    assert_eq!(second.new_offers, 0);
    assert_eq!(store.offer_count(), 2);

    assert!(store.last_check_of(alert_id).is_some());
}

#[tokio::test]
async fn colliding_listings_across_sources_persist_only_the_best_one() {
    let alert = alert();
    let alert_id = alert.id;
    let store = Arc::new(InMemoryStore::with_alert(alert));

    // Same title/company pair from two sources, different scores.
    let weaker: Arc<dyn JobProvider> = Arc::new(StubProvider {
        name: "A",
        listings: vec![listing("a1", "A", "Rust Dev", "Acme", 55)],
    });
    let stronger: Arc<dyn JobProvider> = Arc::new(StubProvider {
        name: "B",
        listings: vec![listing("b1", "B", "rust dev", "ACME", 85)],
    });
    let processor = processor_over(Arc::clone(&store), vec![weaker, stronger]);

    let result = processor.process_alert(alert_id).await;

    assert!(result.processed);
    assert_eq!(result.total_found, 1);
    assert_eq!(result.new_offers, 1);
    assert_eq!(store.offer_count(), 1);
    assert_eq!(store.score_of("b1", "B"), Some(85));
    assert_eq!(store.score_of("a1", "A"), None);
}

#[tokio::test]
async fn a_run_prunes_stale_offers_but_keeps_saved_ones() {
    let alert = alert();
    let alert_id = alert.id;
    let store = Arc::new(InMemoryStore::with_alert(alert.clone()));

    let stale = Utc::now() - Duration::days(45);
    store.seed_offer(new_offer("old-unsaved", &alert), false, stale);
    store.seed_offer(new_offer("old-saved", &alert), true, stale);
    assert_eq!(store.offer_count(), 2);

    let provider: Arc<dyn JobProvider> = Arc::new(StubProvider {
        name: "Stub",
        listings: vec![listing("fresh", "Stub", "Rust Dev", "Acme", 70)],
    });
    let processor = processor_over(Arc::clone(&store), vec![provider]);

    let result = processor.process_alert(alert_id).await;

    assert!(result.processed);
    assert_eq!(result.new_offers, 1);
    assert_eq!(store.offer_count(), 2);
    assert_eq!(store.score_of("old-saved", "Seeded"), Some(10));
    assert_eq!(store.score_of("old-unsaved", "Seeded"), None);
    assert_eq!(store.score_of("fresh", "Stub"), Some(70));
}

#[tokio::test]
async fn a_sweep_covers_due_alerts_and_skips_fresh_ones() {
    let mut due = alert();
    due.last_check = Some(Utc::now() - Duration::hours(30));
    let mut fresh = alert();
    fresh.last_check = Some(Utc::now() - Duration::hours(1));
    let due_id = due.id;

    let store = Arc::new(InMemoryStore::with_alert(due));
    store.alerts.lock().unwrap().insert(fresh.id, fresh);

    let provider: Arc<dyn JobProvider> = Arc::new(StubProvider {
        name: "Stub",
        listings: vec![listing("s1", "Stub", "Rust Dev", "Acme", 80)],
    });
    let processor = processor_over(Arc::clone(&store), vec![provider]);

    let reports = processor.process_all_alerts().await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].alert_id, due_id);
    assert!(reports[0].result.processed);
    assert_eq!(store.offer_count(), 1);
}
