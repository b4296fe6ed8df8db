pub mod applications;
pub mod health;
pub mod job_alerts;
pub mod job_offers;
pub mod tasks;
