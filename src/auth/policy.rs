// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Medibook

//! Role authorization policy.
//!
//! A static, ordered table mapping route patterns to requirements, enforced
//! as middleware after the gate and independent of it. The first matching
//! rule wins; routes with no matching rule require an authenticated
//! principal. A violation ends the request with a 403 and no further
//! processing.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthenticatedUser, Role};

/// What a route demands of the request's principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, authenticated or not.
    Public,
    /// Any authenticated principal.
    AuthenticatedAny,
    /// An authenticated principal carrying one of these roles.
    RoleIn(&'static [Role]),
}

struct Rule {
    /// `None` matches every method.
    method: Option<Method>,
    /// Exact path, or a prefix when ending in `*`.
    pattern: &'static str,
    requirement: Requirement,
}

/// Ordered policy table. First match wins.
static POLICY: &[Rule] = &[
    Rule {
        method: None,
        pattern: "/api/auth/*",
        requirement: Requirement::Public,
    },
    Rule {
        method: None,
        pattern: "/api/users/request-password-reset",
        requirement: Requirement::Public,
    },
    Rule {
        method: None,
        pattern: "/api/users/reset-password",
        requirement: Requirement::Public,
    },
    Rule {
        method: None,
        pattern: "/docs*",
        requirement: Requirement::Public,
    },
    Rule {
        method: None,
        pattern: "/api-doc*",
        requirement: Requirement::Public,
    },
    Rule {
        method: Some(Method::GET),
        pattern: "/api/appointments/doctor*",
        requirement: Requirement::RoleIn(&[Role::Doctor]),
    },
    Rule {
        method: Some(Method::GET),
        pattern: "/api/appointments/patient",
        requirement: Requirement::RoleIn(&[Role::Patient]),
    },
    Rule {
        method: Some(Method::POST),
        pattern: "/api/appointments",
        requirement: Requirement::RoleIn(&[Role::Patient]),
    },
    Rule {
        method: Some(Method::DELETE),
        pattern: "/api/appointments/*",
        requirement: Requirement::AuthenticatedAny,
    },
    Rule {
        method: Some(Method::PUT),
        pattern: "/api/appointments/*",
        requirement: Requirement::AuthenticatedAny,
    },
];

fn pattern_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => path == pattern,
    }
}

/// Look up the requirement for a request. Unmatched routes default to
/// requiring authentication.
pub fn requirement_for(method: &Method, path: &str) -> Requirement {
    POLICY
        .iter()
        .find(|rule| {
            rule.method.as_ref().is_none_or(|m| m == method) && pattern_matches(rule.pattern, path)
        })
        .map(|rule| rule.requirement)
        .unwrap_or(Requirement::AuthenticatedAny)
}

/// Check a principal against a requirement.
pub fn evaluate(
    requirement: Requirement,
    principal: Option<&AuthenticatedUser>,
) -> Result<(), AuthError> {
    match requirement {
        Requirement::Public => Ok(()),
        Requirement::AuthenticatedAny => match principal {
            Some(_) => Ok(()),
            None => Err(AuthError::NotAuthenticated),
        },
        Requirement::RoleIn(roles) => match principal {
            Some(user) if roles.contains(&user.role) => Ok(()),
            Some(_) => Err(AuthError::InsufficientRole),
            None => Err(AuthError::NotAuthenticated),
        },
    }
}

/// Authorization middleware. Runs after the gate has settled the principal.
pub async fn authorization_policy(request: Request, next: Next) -> Response {
    let requirement = requirement_for(request.method(), request.uri().path());
    let principal = request.extensions().get::<AuthenticatedUser>();

    match evaluate(requirement, principal) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::debug!(
                method = %request.method(),
                path = request.uri().path(),
                code = e.error_code(),
                "authorization denied"
            );
            e.into_response()
        }
    }
}
