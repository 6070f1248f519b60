//! Role administration: listing and creating roles, assigning them to users.
//!
//! Every operation hangs off [`service::AdminScope`], which can only be obtained
//! through [`service::AccessControlService::authorize`].

pub mod domain;
pub mod repository;
pub mod repo;
pub mod seed;
pub mod service;

pub use service::{AccessControlService, AdminScope};
