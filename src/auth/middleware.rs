//! Authentication middleware and extractors

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::{Identity, TokenKeys};
use crate::error::{Error, Result};
use axum::{
    extract::{FromRequestParts, Path, Query, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Pull the bearer credential out of the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify the request's bearer token and decode the caller's identity.
///
/// No credential is `Unauthorized`; a credential that fails signature or
/// expiry checks is `InvalidToken`.
pub fn authenticate(keys: &TokenKeys, headers: &HeaderMap) -> Result<Identity> {
    let token = bearer_token(headers).ok_or(Error::Unauthorized)?;
    let claims = keys.verify(token)?;
    Ok(claims.identity)
}

/// Middleware for requiring a valid access token.
///
/// The decoded [`Identity`] is stored in the request extensions for the
/// ownership check and handlers downstream.
pub async fn require_auth(
    State(keys): State<Arc<TokenKeys>>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let identity = authenticate(&keys, req.headers()).inspect_err(|e| {
        tracing::debug!(path = %req.uri().path(), "Rejected request: {}", e);
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Where a route carries the email of the resource owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerParam {
    /// A path capture, e.g. `email` in `/user/{email}`. Always required.
    Path(&'static str),
    /// A query parameter, e.g. `?email=`. Only checked when present.
    Query(&'static str),
}

impl OwnerParam {
    /// Read the owner key from the request, `None` when an optional query
    /// parameter is absent.
    async fn owner(&self, parts: &mut Parts) -> Result<Option<String>> {
        match *self {
            OwnerParam::Path(name) => {
                let Path(mut params) =
                    Path::<HashMap<String, String>>::from_request_parts(parts, &())
                        .await
                        .map_err(|_| Error::Forbidden)?;
                params.remove(name).map(Some).ok_or(Error::Forbidden)
            }
            OwnerParam::Query(name) => {
                let Query(mut params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
                    .map_err(|_| Error::Forbidden)?;
                Ok(params.remove(name))
            }
        }
    }
}

/// Ownership predicate: the caller may only touch resources keyed by its own email
pub fn authorize_owner(identity: &Identity, owner: &str) -> Result<()> {
    if identity.owns(owner) {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Middleware enforcing [`authorize_owner`] against the route's owner parameter.
///
/// Must run inside [`require_auth`].
pub async fn require_owner(
    State(param): State<OwnerParam>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let (mut parts, body) = req.into_parts();

    let identity = parts
        .extensions
        .get::<Identity>()
        .cloned()
        .ok_or(Error::Unauthorized)?;

    if let Some(owner) = param.owner(&mut parts).await? {
        authorize_owner(&identity, &owner).inspect_err(|_| {
            tracing::debug!(
                path = %parts.uri.path(),
                "Identity {} does not own resource of {}",
                identity.email,
                owner
            );
        })?;
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}
