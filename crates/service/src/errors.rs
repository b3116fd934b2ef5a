use thiserror::Error;

/// Failure reported by a repository implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A write matched no rows.
    #[error("no rows affected")]
    NotFound,
    #[error("database error: {0}")]
    Db(String),
}

impl From<sea_orm::DbErr> for RepositoryError {
    fn from(e: sea_orm::DbErr) -> Self { RepositoryError::Db(e.to_string()) }
}

impl From<models::errors::ModelError> for RepositoryError {
    fn from(e: models::errors::ModelError) -> Self { RepositoryError::Db(e.to_string()) }
}

/// Classification of a [`ServiceError`], independent of any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied data is invalid, or an entity it references does not exist.
    Validation,
    /// The entity addressed by the operation does not exist.
    NotFound,
    /// A collaborator failed unexpectedly.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Validation failure with the detail appended, e.g. `invalid request payload: empty SKU`.
    pub fn invalid(context: &str, detail: impl std::fmt::Display) -> Self {
        Self::Validation(format!("{}: {}", context, detail))
    }

    pub fn internal(context: &'static str, source: RepositoryError) -> Self {
        Self::Internal { context, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        assert_eq!(ServiceError::invalid("invalid request", "invalid sort type").kind(), ErrorKind::Validation);
        assert_eq!(ServiceError::not_found("product").kind(), ErrorKind::NotFound);
        let internal = ServiceError::internal("error when get product", RepositoryError::Db("connection reset".into()));
        assert_eq!(internal.kind(), ErrorKind::Internal);
    }

    #[test]
    fn messages_carry_context() {
        assert_eq!(ServiceError::invalid("invalid request payload", "empty SKU").to_string(), "invalid request payload: empty SKU");
        assert_eq!(ServiceError::not_found("product").to_string(), "product not found");
        let internal = ServiceError::internal("error when insert review", RepositoryError::Db("deadlock".into()));
        assert_eq!(internal.to_string(), "error when insert review: database error: deadlock");
    }
}
