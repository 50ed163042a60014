use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::AuthenticatedUser;

/// Header selecting a team library instead of the personal one
pub const TEAM_ID_HEADER: &str = "x-team-id";

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Optional team selected through the `X-Team-Id` header.
///
/// Membership is not checked here; services resolve the final scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestedTeam(pub Option<Uuid>);

impl<S> FromRequestParts<S> for RequestedTeam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(TEAM_ID_HEADER) else {
            return Ok(RequestedTeam(None));
        };

        let raw = value
            .to_str()
            .map_err(|_| AppError::BadRequest("X-Team-Id header is not valid text".to_string()))?
            .trim();

        if raw.is_empty() {
            return Ok(RequestedTeam(None));
        }

        Uuid::parse_str(raw)
            .map(|id| RequestedTeam(Some(id)))
            .map_err(|_| AppError::BadRequest(format!("X-Team-Id '{}' is not a valid UUID", raw)))
    }
}
