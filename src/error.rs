use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact at {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model artifact at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported model artifact {0} (expected .json, .pt or .ts)")]
    UnsupportedFormat(PathBuf),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
    #[error("feature length mismatch: got {got}, expected {expected}")]
    ShapeMismatch { got: usize, expected: usize },
    #[error("model returned {got} outputs for {expected} rows")]
    OutputCount { got: usize, expected: usize },
    #[error("model returned a non-finite prediction ({0})")]
    NonFinite(f64),
    #[cfg(feature = "torch")]
    #[error("torch backend: {0}")]
    Torch(#[from] tch::TchError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of one render cycle, mapped onto an HTTP response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Model(e) => {
                tracing::error!(error = %e, "model invocation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
