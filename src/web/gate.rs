//! Session gate - per-request identity resolution and route policy.
//!
//! The policy itself ([`classify`], [`decide`]) is pure. The middleware resolves the
//! caller's identity once per request, applies the policy, and hands the
//! [`Identity`] to handlers as a request extension. Nothing is cached between
//! requests; a provider error counts as "no identity".

use super::{AppState, error::ApiError};
use crate::{auth::Identity, errors::Error};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

/// Cookie carrying the access token when no `Authorization` header is sent.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Where unauthenticated page requests are sent.
pub const SIGN_IN_PATH: &str = "/signin";
/// Where authenticated requests for auth-only pages are sent.
pub const DASHBOARD_PATH: &str = "/dashboard";

const PROTECTED_PAGES: [&str; 4] = ["/dashboard", "/transactions", "/categories", "/budgets"];
const AUTH_ONLY_PAGES: [&str; 2] = ["/signin", "/signup"];

/// How a path is guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Requires an identity; redirect to sign-in otherwise
    Protected,
    /// Requires the absence of an identity; redirect to the dashboard otherwise
    AuthOnly,
    /// Requires an identity; 401 otherwise
    Api,
    /// Open either way
    Public,
}

/// What the gate does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Pass the request on
    Continue,
    /// Redirect to [`SIGN_IN_PATH`]
    RedirectToSignIn,
    /// Redirect to [`DASHBOARD_PATH`]
    RedirectToDashboard,
    /// Answer 401
    Unauthorized,
}

fn matches_page(path: &str, page: &str) -> bool {
    path == page
        || path
            .strip_prefix(page)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Classifies a request path.
#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if matches_page(path, "/api") {
        RouteClass::Api
    } else if PROTECTED_PAGES.iter().any(|page| matches_page(path, page)) {
        RouteClass::Protected
    } else if AUTH_ONLY_PAGES.contains(&path) {
        RouteClass::AuthOnly
    } else {
        RouteClass::Public
    }
}

/// Applies the route policy.
#[must_use]
pub const fn decide(class: RouteClass, authenticated: bool) -> GateDecision {
    match (class, authenticated) {
        (RouteClass::Protected, false) => GateDecision::RedirectToSignIn,
        (RouteClass::AuthOnly, true) => GateDecision::RedirectToDashboard,
        (RouteClass::Api, false) => GateDecision::Unauthorized,
        _ => GateDecision::Continue,
    }
}

/// Reads the access token from `Authorization: Bearer` or the access token cookie.
#[must_use]
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == ACCESS_TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Resolves the caller, failing closed on provider errors.
pub async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Option<Identity> {
    let token = access_token(headers)?;
    match state.identity.current_user(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!(error = %e, "Identity resolution failed, treating request as signed out");
            None
        }
    }
}

/// Middleware enforcing the route policy on every gated route.
pub async fn session_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = resolve_identity(&state, request.headers()).await;
    let class = classify(request.uri().path());
    let decision = decide(class, identity.is_some());

    debug!(
        path = request.uri().path(),
        ?class,
        ?decision,
        user_id = identity.as_ref().map(|i| i.id.as_str()),
        "Session gate"
    );

    match decision {
        GateDecision::Continue => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        GateDecision::RedirectToSignIn => Redirect::temporary(SIGN_IN_PATH).into_response(),
        GateDecision::RedirectToDashboard => Redirect::temporary(DASHBOARD_PATH).into_response(),
        GateDecision::Unauthorized => ApiError::from(Error::Unauthenticated).into_response(),
    }
}
