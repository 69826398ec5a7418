use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    config::{AppConfig, Env},
    error::ApiError,
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the session JWT. `sub` names the user the session belongs to.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// AuthUser
///
/// The resolved principal of an authenticated request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Why a request carries no usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingToken,
    InvalidToken,
    UnknownUser,
}

/// SessionOutcome
///
/// Result of the capability check every admin entry point performs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Authenticated(AuthUser),
    Rejected(Rejection),
}

/// resolve_session
///
/// Resolves the caller's session from the request headers:
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing user.
/// 2. `Authorization: Bearer <jwt>`, signature and expiry checked against `jwt_secret`.
/// 3. The token subject must still exist in the user store.
///
/// Only storage failures are errors; every other failure is a `Rejected` outcome.
pub async fn resolve_session(
    parts: &Parts,
    repo: &RepositoryState,
    config: &AppConfig,
) -> Result<SessionOutcome, ApiError> {
    if config.env == Env::Local {
        let bypass_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());
        if let Some(user_id) = bypass_id {
            if let Some(user) = repo.get_user(user_id).await? {
                return Ok(SessionOutcome::Authenticated(AuthUser {
                    id: user.id,
                    email: user.email,
                }));
            }
        }
    }

    let Some(token) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    else {
        return Ok(SessionOutcome::Rejected(Rejection::MissingToken));
    };

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let claims = match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!(error = %e, "session token rejected");
            return Ok(SessionOutcome::Rejected(Rejection::InvalidToken));
        }
    };

    match repo.get_user(claims.sub).await? {
        Some(user) => Ok(SessionOutcome::Authenticated(AuthUser {
            id: user.id,
            email: user.email,
        })),
        None => Ok(SessionOutcome::Rejected(Rejection::UnknownUser)),
    }
}

/// AuthUser Extractor
///
/// Reuses the principal stored by `require_session` when the route is guarded,
/// otherwise resolves the session itself. Rejects with `ApiError::Unauthorized`.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);
        match resolve_session(parts, &repo, &config).await? {
            SessionOutcome::Authenticated(user) => Ok(user),
            SessionOutcome::Rejected(reason) => {
                tracing::debug!(?reason, "unauthenticated request");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// require_session
///
/// Route guard for the admin API. Runs before any body extraction, so a caller
/// without a session never reaches validation or the store. The resolved
/// principal is stored in the request extensions for the handler's extractor.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    match resolve_session(&parts, &state.repo, &state.config).await {
        Ok(SessionOutcome::Authenticated(user)) => {
            parts.extensions.insert(user);
            next.run(Request::from_parts(parts, body)).await
        }
        Ok(SessionOutcome::Rejected(reason)) => {
            tracing::debug!(?reason, uri = %parts.uri, "unauthenticated request");
            ApiError::Unauthorized.into_response()
        }
        Err(e) => e.into_response(),
    }
}
