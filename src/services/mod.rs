pub mod alert_processor;
pub mod alert_service;
pub mod alert_store;
pub mod application_service;
pub mod job_search_service;
pub mod offer_service;
pub mod scheduler;
pub mod task_service;
