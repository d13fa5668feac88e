//! Unary request/response calls between the services, carried as JSON over HTTP.
//!
//! A call is `POST {base_url}/rpc/{Method}`. Failures come back with a non 2xx
//! status and an [`RpcErrorBody`], so the caller sees the same [`RpcStatus`]
//! the server produced.

pub mod client;
pub mod clients;
pub mod proto;
pub mod retry;

use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, ResponseError};
use reqwest::StatusCode;

use crate::context::{Context, ContextError};

pub use client::RpcClient;
pub use retry::RetryPolicy;

/// Remaining call budget in milliseconds, sent by the client on every attempt.
pub const TIMEOUT_HEADER: &str = "x-rpc-timeout-ms";

const DEFAULT_SERVER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcStatus {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Aborted,
    Canceled,
    DeadlineExceeded,
    Unavailable,
    Internal,
    Unknown,
}

impl RpcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcStatus::InvalidArgument => "invalid_argument",
            RpcStatus::NotFound => "not_found",
            RpcStatus::AlreadyExists => "already_exists",
            RpcStatus::Aborted => "aborted",
            RpcStatus::Canceled => "canceled",
            RpcStatus::DeadlineExceeded => "deadline_exceeded",
            RpcStatus::Unavailable => "unavailable",
            RpcStatus::Internal => "internal",
            RpcStatus::Unknown => "unknown",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            RpcStatus::InvalidArgument => StatusCode::BAD_REQUEST,
            RpcStatus::NotFound => StatusCode::NOT_FOUND,
            RpcStatus::AlreadyExists | RpcStatus::Aborted => StatusCode::CONFLICT,
            // 499 is the de facto "client closed request" code.
            RpcStatus::Canceled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::REQUEST_TIMEOUT)
            }
            RpcStatus::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            RpcStatus::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            RpcStatus::Internal | RpcStatus::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Best guess for responses that did not carry an error body, e.g. a proxy error page.
    pub fn from_http(status: StatusCode) -> RpcStatus {
        match status.as_u16() {
            400 => RpcStatus::InvalidArgument,
            404 => RpcStatus::NotFound,
            409 => RpcStatus::Aborted,
            408 | 504 => RpcStatus::DeadlineExceeded,
            499 => RpcStatus::Canceled,
            502 | 503 => RpcStatus::Unavailable,
            500 => RpcStatus::Internal,
            _ => RpcStatus::Unknown,
        }
    }
}

impl std::fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("rpc error: code = {status}, message = {message}")]
pub struct RpcError {
    pub status: RpcStatus,
    pub message: String,
}

impl RpcError {
    pub fn new(status: RpcStatus, message: impl Into<String>) -> RpcError {
        RpcError {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> RpcStatus {
        self.status
    }
}

impl From<ContextError> for RpcError {
    fn from(err: ContextError) -> Self {
        let status = match err {
            ContextError::Canceled => RpcStatus::Canceled,
            ContextError::DeadlineExceeded => RpcStatus::DeadlineExceeded,
        };

        RpcError::new(status, err.to_string())
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RpcErrorBody {
    pub code: RpcStatus,
    pub message: String,
}

impl ResponseError for RpcError {
    fn status_code(&self) -> StatusCode {
        self.status.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(RpcErrorBody {
            code: self.status,
            message: self.message.clone(),
        })
    }
}

/// Builds the context a server handler runs under, honouring the caller's budget.
pub fn request_context(request: &HttpRequest) -> Context {
    let timeout = request
        .headers()
        .get(TIMEOUT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .map(|budget| budget.min(DEFAULT_SERVER_TIMEOUT))
        .unwrap_or(DEFAULT_SERVER_TIMEOUT);

    Context::with_timeout(timeout)
}
