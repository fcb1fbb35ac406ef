use thiserror::Error;

/// Error taxonomy for the engine service layer.
///
/// Every variant maps to one HTTP status and one wire-level `type` name; the
/// server crate turns these into the `{"type", "message"}` envelope without
/// further interpretation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{entity} with id {id} does not exist.")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} with key {key} does not exist.")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Engine(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::NotFoundByKey { .. } => 404,
            Self::InvalidRequest(_) => 400,
            Self::Engine(_) => 500,
            Self::Internal(_) => 500,
        }
    }

    /// Simple name carried in the error envelope's `type` field.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::NotFoundByKey { .. } | Self::InvalidRequest(_) => {
                "InvalidRequestException"
            }
            Self::Engine(_) => "ProcessEngineException",
            Self::Internal(_) => "RestException",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ── http_status: exhaustive variant coverage ──────────────────

    #[test]
    fn http_status_not_found() {
        assert_eq!(EngineError::not_found("Task", "anId").http_status(), 404);
    }

    #[test]
    fn http_status_not_found_by_key() {
        let e = EngineError::NotFoundByKey {
            entity: "Process definition",
            key: "aKey".into(),
        };
        assert_eq!(e.http_status(), 404);
    }

    #[test]
    fn http_status_invalid_request() {
        assert_eq!(EngineError::invalid("bad sort").http_status(), 400);
    }

    #[test]
    fn http_status_engine() {
        assert_eq!(EngineError::Engine("expected exception".into()).http_status(), 500);
    }

    #[test]
    fn http_status_internal() {
        let e = EngineError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(e.http_status(), 500);
    }

    // ── error_type: wire names ───────────────────────────────────

    #[test]
    fn error_type_not_found_is_invalid_request_exception() {
        let e = EngineError::not_found("Task", "anId");
        assert_eq!(e.error_type(), "InvalidRequestException");
    }

    #[test]
    fn error_type_engine_is_process_engine_exception() {
        let e = EngineError::Engine("x".into());
        assert_eq!(e.error_type(), "ProcessEngineException");
    }

    #[test]
    fn error_type_internal_is_rest_exception() {
        let e = EngineError::Internal(anyhow::anyhow!("x"));
        assert_eq!(e.error_type(), "RestException");
    }

    // ── Display ──────────────────────────────────────────────────

    #[test]
    fn display_not_found_message_shape() {
        let e = EngineError::not_found("Task", "anId");
        assert_eq!(e.to_string(), "Task with id anId does not exist.");
    }

    #[test]
    fn display_not_found_by_key_message_shape() {
        let e = EngineError::NotFoundByKey {
            entity: "Filter",
            key: "aKey".into(),
        };
        assert_eq!(e.to_string(), "Filter with key aKey does not exist.");
    }

    #[test]
    fn display_engine_passes_message_through() {
        let e = EngineError::Engine("expected exception".into());
        assert_eq!(e.to_string(), "expected exception");
    }
}
