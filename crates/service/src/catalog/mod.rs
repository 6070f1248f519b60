//! Car catalog: listing with search/sort, detail lookup and admin-only
//! create/update/delete.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use service::CatalogService;
