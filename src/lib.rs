pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::{
    alert_processor::AlertProcessor, alert_service::AlertService, alert_store::PgAlertStore,
    application_service::ApplicationService, job_search_service::JobSearchService,
    offer_service::OfferService, task_service::TaskService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub alert_service: AlertService,
    pub offer_service: OfferService,
    pub task_service: TaskService,
    pub application_service: ApplicationService,
    pub job_search: JobSearchService,
    pub alert_processor: AlertProcessor,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let job_search = JobSearchService::new(providers::enabled_providers(config));
        let store = Arc::new(PgAlertStore::new(pool.clone()));
        let alert_processor = AlertProcessor::new(store, job_search.clone());

        Self {
            alert_service: AlertService::new(pool.clone()),
            offer_service: OfferService::new(pool.clone()),
            task_service: TaskService::new(pool.clone()),
            application_service: ApplicationService::new(pool.clone()),
            job_search,
            alert_processor,
            pool,
        }
    }
}
