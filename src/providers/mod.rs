pub mod adzuna;
pub mod france_travail;
pub mod scoring;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;
use crate::models::job_alert::JobAlert;
use crate::models::listing::Listing;

/// Bounded page size for every outbound provider search.
pub(crate) const RESULTS_PER_PAGE: usize = 20;

/// One external job-listing source.
///
/// `search` never fails: transport errors, credential failures and malformed
/// bodies are logged inside the adapter and recovered as an empty result, so
/// a single source can never abort the aggregate search. An alert without
/// keywords short-circuits to an empty result without a network call.
#[async_trait]
pub trait JobProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, alert: &JobAlert) -> Vec<Listing>;
}

/// Build the set of enabled providers from configuration. A provider is
/// enabled exactly when its credentials are present; there is no other
/// runtime toggle.
pub fn enabled_providers(config: &Config) -> Vec<Arc<dyn JobProvider>> {
    let mut providers: Vec<Arc<dyn JobProvider>> = Vec::new();

    match adzuna::AdzunaProvider::from_config(config) {
        Some(provider) => {
            info!("Adzuna provider enabled");
            providers.push(Arc::new(provider));
        }
        None => info!("Adzuna provider disabled (missing credentials)"),
    }

    match france_travail::FranceTravailProvider::from_config(config) {
        Some(provider) => {
            info!("France Travail provider enabled");
            providers.push(Arc::new(provider));
        }
        None => info!("France Travail provider disabled (missing credentials)"),
    }

    providers
}
