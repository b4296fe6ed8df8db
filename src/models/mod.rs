pub mod application;
pub mod job_alert;
pub mod job_offer;
pub mod listing;
pub mod task;
pub mod user;
