pub mod alert_dto;
pub mod application_dto;
pub mod offer_dto;
pub mod task_dto;
