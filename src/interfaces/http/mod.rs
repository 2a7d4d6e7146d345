//! HTTP REST API interfaces
//!
//! - `common`: error body, validated JSON extractor, paging wrapper
//! - `modules`: handlers and DTOs per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;
