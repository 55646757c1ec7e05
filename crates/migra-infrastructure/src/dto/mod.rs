//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema of Migra's files. They are
//! private to the infrastructure layer; version-migrate brings any stored
//! version up to date and converts it into the domain type.
//!
//! ### HandlerConfig Version History
//! - **1.0.0**: Initial schema (field, constant, request_id transformations)

mod handler_config;

pub use handler_config::{
    HANDLER_CONFIG_ENTITY, HANDLER_CONFIG_VERSION, HandlerConfig, HandlerConfigV1_0_0,
    TransformationDto, create_handler_config_migrator,
};
