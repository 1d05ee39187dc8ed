//! Authorization gate extractors.
//!
//! Guards run as extractors before the handler body, in argument order:
//! put the gate right after `State` and before `Json`.
//!
//! ```rust,ignore
//! async fn create_product(
//!     State(state): State<AppState>,
//!     Admin(identity): Admin,
//!     Json(body): Json<Document>,
//! ) -> ApiResult<Json<InsertAck>> { ... }
//! ```

use crate::error::ApiError;
use crate::state::AppState;
use crate::token::{bearer_token, TokenError};
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use tools_core::{Collection, RecordKey, RecordStore, Role};
use tracing::{debug, warn};

/// Identity established from a valid bearer credential.
///
/// Missing credential rejects with 401, anything invalid with 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

impl Identity {
    /// Ownership check for handlers scoping a resource to its owner
    pub fn ensure_owner(&self, email: Option<&str>) -> Result<(), ApiError> {
        match email {
            Some(email) if email == self.email => Ok(()),
            _ => {
                warn!(identity = %self.email, requested = ?email, "Ownership check failed");
                Err(ApiError::forbidden("ownership mismatch"))
            }
        }
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(identity.clone());
        }

        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(TokenError::Missing)?
            .to_str()
            .map_err(|_| TokenError::Malformed)?;

        let claims = state.tokens.verify(bearer_token(authorization)?)?;
        debug!(email = %claims.email, "Identity verified");

        let identity = Identity {
            email: claims.email,
        };
        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}

/// A credential is optional, but one that is presented must be valid.
/// A blank `Authorization` header counts as absent.
impl OptionalFromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Identity as FromRequestParts<AppState>>::from_request_parts(parts, state).await {
            Ok(identity) => Ok(Some(identity)),
            Err(ApiError::Unauthorized) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Identity whose user record carries the admin role.
///
/// A missing user record fails closed with 403.
#[derive(Debug, Clone)]
pub struct Admin(pub Identity);

impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity =
            <Identity as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;

        match role_of(state, &identity.email).await? {
            Some(role) if role.is_admin() => Ok(Admin(identity)),
            Some(_) => {
                warn!(email = %identity.email, "Admin role required");
                Err(ApiError::forbidden("admin role required"))
            }
            None => {
                warn!(email = %identity.email, "No user record for identity");
                Err(ApiError::forbidden("unknown identity"))
            }
        }
    }
}

/// Role of the user record keyed by `email`, or `None` when there is no record
pub async fn role_of(state: &AppState, email: &str) -> Result<Option<Role>, ApiError> {
    let record = state
        .store
        .find_one(Collection::Users, &RecordKey::email(email))
        .await?;
    Ok(record.as_ref().map(Role::of))
}
