use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Envelope returned on every failure path.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input, rejected before any data-store call.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Unique-constraint violation, e.g. a duplicate email.
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid email or password")]
    Unauthorized,
    /// Pool or connection failure. The caller may retry.
    #[error("Service temporarily unavailable")]
    Transient(#[source] sqlx::Error),
    /// A multi-statement write was aborted and fully rolled back.
    #[error("{0}")]
    TransactionFailure(&'static str),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::Error as E;
        match err {
            E::RowNotFound => Self::NotFound("Not found".to_string()),
            E::Database(db) if db.is_unique_violation() => {
                Self::Conflict("Already exists".to_string())
            }
            e @ (E::PoolTimedOut | E::PoolClosed | E::Io(_)) => Self::Transient(e),
            e => Self::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Transient(_) | Self::TransactionFailure(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Server-side detail stays in the logs; the Display form shown to the
        // client is generic for every 500-class variant.
        match &self {
            Self::Transient(e) => error!(error = %e, "transient database failure"),
            Self::Internal(e) => error!(error = ?e, "internal error"),
            Self::TransactionFailure(msg) => error!(message = msg, "transaction rolled back"),
            other => warn!(%status, message = %other, "request rejected"),
        }

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_the_taxonomy() {
        assert_eq!(
            ApiError::validation("bad input").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("duplicate".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::not_found("missing").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::TransactionFailure("failed to place order")
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn sqlx_errors_are_classified() {
        assert!(matches!(
            ApiError::from(sqlx::Error::RowNotFound),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(sqlx::Error::PoolTimedOut),
            ApiError::Transient(_)
        ));
        assert!(matches!(
            ApiError::from(sqlx::Error::PoolClosed),
            ApiError::Transient(_)
        ));
        assert!(matches!(
            ApiError::from(sqlx::Error::WorkerCrashed),
            ApiError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn internal_detail_is_not_echoed_to_the_client() {
        let resp = ApiError::Internal(anyhow::anyhow!("connection refused on 10.0.0.7"))
            .into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn failure_envelope_has_success_false() {
        let resp = ApiError::validation("Passwords do not match").into_response();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Passwords do not match");
    }
}
