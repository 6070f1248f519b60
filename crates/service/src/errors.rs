use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("admin capability required")]
    Forbidden,
    #[error("concurrency conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// True for caller-correctable input problems, including model-level validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_) | ServiceError::Model(models::errors::ModelError::Validation(_)))
    }

    /// Message without the variant prefix, for showing next to a form.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Validation(m) | ServiceError::NotFound(m) | ServiceError::Conflict(m) => m.clone(),
            ServiceError::Model(models::errors::ModelError::Validation(m)) => m.clone(),
            other => other.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ServiceError::Db(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn model_validation_counts_as_validation() {
        let e: ServiceError = ModelError::Validation("make is required".into()).into();
        assert!(e.is_validation());
        assert_eq!(e.user_message(), "make is required");
        assert!(!ServiceError::Db("boom".into()).is_validation());
        assert!(!ServiceError::Model(ModelError::Db("boom".into())).is_validation());
    }
}
