// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent HTML error pages.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::views;

/// Failure of the OAuth handshake. Shown to the user, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Strava denied authorization: {0}")]
    Denied(String),

    #[error("Invalid or expired OAuth state")]
    InvalidState,

    #[error("Missing authorization code")]
    MissingCode,

    #[error("Token exchange failed: {0}")]
    Exchange(String),
}

/// Failure of a call to the activity provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request to Strava timed out")]
    Timeout,

    #[error("Strava rate limit exceeded")]
    RateLimited,

    #[error("Strava rejected the access token")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse Strava response: {0}")]
    Decode(String),

    #[error("Athlete has no activities")]
    NoActivities,
}

impl FetchError {
    /// True if the access token is no longer usable.
    pub fn is_token_error(&self) -> bool {
        matches!(self, FetchError::Unauthorized)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// PR time cannot be used as a divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DivisionError {
    #[error("PR time is zero")]
    ZeroPrTime,
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title, detail) = match &self {
            AppError::Auth(AuthError::Exchange(msg)) => {
                tracing::warn!(error = %msg, "Token exchange failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Authorization Unsuccessful",
                    self.to_string(),
                )
            }
            AppError::Auth(err) => {
                tracing::warn!(error = %err, "Authorization failed");
                (
                    StatusCode::UNAUTHORIZED,
                    "Authorization Unsuccessful",
                    self.to_string(),
                )
            }
            AppError::Fetch(err) => {
                tracing::warn!(error = %err, "Strava request failed");
                let status = match err {
                    FetchError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    FetchError::NotFound(_) | FetchError::NoActivities => StatusCode::NOT_FOUND,
                    FetchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, "Can't Compare Activity", self.to_string())
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something Went Wrong",
                    "An internal error occurred.".to_string(),
                )
            }
        };

        (status, Html(views::error_page(title, &detail))).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
