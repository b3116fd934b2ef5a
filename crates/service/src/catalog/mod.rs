//! Catalog module: three-layer architecture (domain, repository, service).
//!
//! Product and review orchestration lives in [`service::CatalogService`];
//! rating aggregation on review submission is in [`review`].

pub mod domain;
pub mod validation;
pub mod repository;
pub mod service;
pub mod review;
pub mod repo;

pub use service::CatalogService;
