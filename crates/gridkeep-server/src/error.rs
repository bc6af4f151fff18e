// SPDX-License-Identifier: Apache-2.0
//! HTTP-facing error mapping for `/join`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gridkeep_sim::WorldError;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Wraps a [`WorldError`] for use as an axum handler return type.
pub struct ApiError(pub WorldError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            WorldError::DuplicateActorId(_) => StatusCode::CONFLICT,
        };
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

impl From<WorldError> for ApiError {
    fn from(err: WorldError) -> Self {
        Self(err)
    }
}
