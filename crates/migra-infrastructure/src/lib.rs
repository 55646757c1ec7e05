pub mod config_service;
pub mod dto;
pub mod json_request_repository;
pub mod storage;
pub mod tracing_layer;

pub use crate::config_service::ConfigService;
pub use crate::json_request_repository::JsonRequestRepository;
pub use crate::tracing_layer::{MigrationEvent, MigrationEventLayer};
