//! Service layer providing the car catalog, role administration and
//! authentication on top of `models`.
//! - Business rules live here; persistence sits behind repository traits.
//! - Every repository has a SeaORM implementation and an in-memory `mock`.
//! - Callers are passed explicitly; no operation reads ambient request state.

pub mod errors;
pub mod caller;
pub mod catalog;
pub mod access;
pub mod auth;
#[cfg(test)]
pub mod test_support;

pub use caller::Caller;
pub use errors::ServiceError;
