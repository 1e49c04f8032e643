//! Per-route access policies

use std::sync::Arc;

use axum::{middleware, routing::MethodRouter};

use super::middleware::{require_auth, require_owner, OwnerParam};
use super::TokenKeys;

/// Who may call a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No credential needed
    Public,
    /// Any valid access token
    Bearer,
    /// A valid access token whose email matches the route's owner parameter
    Owner(OwnerParam),
}

impl Access {
    /// Wrap `route` in the middleware this policy needs.
    ///
    /// The token gate is layered last so it runs first; the ownership check
    /// then sees the decoded identity before the handler is reached.
    pub fn apply<S>(self, route: MethodRouter<S>, keys: &Arc<TokenKeys>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let gate = middleware::from_fn_with_state(keys.clone(), require_auth);

        match self {
            Access::Public => route,
            Access::Bearer => route.route_layer(gate),
            Access::Owner(param) => route
                .route_layer(middleware::from_fn_with_state(param, require_owner))
                .route_layer(gate),
        }
    }
}
