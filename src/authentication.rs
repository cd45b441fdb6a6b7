use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::db_helpers::get_user_by_id;
use crate::errors::RequestError;
use crate::models::UserProfile;

pub const BEARER_PREFIX: &str = "Bearer ";
pub const REGISTRATION_TOKEN_EXPIRY: time::Duration = time::Duration::weeks(1);

// Login tokens carry no exp claim at all, so it stays optional on both ends.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthClaim {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// The requester's identity, or `None` when no Authorization header was sent.
pub struct MaybeUser(pub Option<UserProfile>);

impl MaybeUser {
    pub fn get_id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }

    pub fn require(&self) -> Result<&UserProfile, RequestError> {
        self.0.as_ref().ok_or(RequestError::MissingUser)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = match parts.headers.get("Authorization") {
            Some(header) => header,
            None => return Ok(MaybeUser(None)),
        };
        let header = match header.to_str() {
            Ok(header) => header,
            Err(_) => return Err(RequestError::AuthorizationHeader),
        };

        let token = match header.strip_prefix(BEARER_PREFIX) {
            Some(token) => token,
            None => return Err(RequestError::AuthorizationHeader),
        };

        let claim = verify_jwt_token(token)?;

        let pool = parts
            .extensions
            .get::<Arc<SqlitePool>>()
            .ok_or(RequestError::ServerError)?
            .clone();

        // Identity is fetched fresh on every request, posts included.
        let user = get_user_by_id(&pool, claim.id).await?;

        Ok(MaybeUser(user))
    }
}

pub fn get_jwt_token(id: i64, username: &str, expiry: Option<time::Duration>) -> Result<String> {
    let jwt_secret = std::env::var("JWT_SECRET").context("Failed to get JWT_SECRET")?;
    let claim = AuthClaim {
        id,
        username: username.to_owned(),
        exp: expiry.map(|expiry| (OffsetDateTime::now_utc() + expiry).unix_timestamp()),
    };

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .context("Failed to generate jwt token");
    token
}

pub fn verify_jwt_token(token: &str) -> Result<AuthClaim, RequestError> {
    let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| RequestError::ServerError)?;
    let mut validation = jsonwebtoken::Validation::default();
    // exp is optional on this token format, checked by hand below
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_ref()),
        &validation,
    )
    .map_err(RequestError::TokenVerification)?;
    let claim = token_data.claims;
    if let Some(exp) = claim.exp {
        if exp < OffsetDateTime::now_utc().unix_timestamp() {
            return Err(RequestError::TokenVerification(
                jsonwebtoken::errors::ErrorKind::ExpiredSignature.into(),
            ));
        }
    }
    Ok(claim)
}
