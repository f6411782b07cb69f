//! Request-path gate for Cliente callers.
//!
//! Every request under the administrative prefix from an authenticated
//! Cliente is checked against two rules before it reaches a handler:
//! mutating another user's account is forbidden, and paths naming a
//! restricted resource are forbidden unless the caller holds the staff
//! flag. Everyone else passes through untouched.

use axum::{
    extract::{FromRequestParts, Request},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, middleware::auth::AuthUser};

const ADMIN_PREFIX: &str = "/api";

const RESTRICTED_SEGMENTS: [&str; 5] =
    ["sales", "sale-lines", "products", "categories", "nutrition"];

pub async fn role_gate(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !path.starts_with(ADMIN_PREFIX) {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let (mut parts, body) = req.into_parts();
    // Unauthenticated requests are not this gate's concern; the handlers
    // decide whether they need credentials.
    let user = AuthUser::from_request_parts(&mut parts, &()).await.ok();
    let req = Request::from_parts(parts, body);

    if let Some(user) = user
        && let Err(err) = gate_admin_path(&method, &path, &user)
    {
        return err.into_response();
    }

    next.run(req).await
}

/// The allow/deny predicate itself, kept pure so it can be tested
/// without an HTTP stack.
pub fn gate_admin_path(method: &Method, path: &str, user: &AuthUser) -> Result<(), AppError> {
    if !user.role.is_cliente() {
        return Ok(());
    }

    // A Cliente may only mutate a user path that carries its own id;
    // reads fall through to the row scoping in the services.
    let mutating = !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS);
    if mutating && path.contains("/users/") && !path.contains(&user.user_id.to_string()) {
        return Err(AppError::Forbidden);
    }

    if !user.staff {
        for segment in path.split('/') {
            if RESTRICTED_SEGMENTS.contains(&segment) {
                return Err(AppError::Forbidden);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::Role;
    use uuid::Uuid;

    fn cliente(staff: bool) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Cliente,
            staff,
        }
    }

    #[test]
    fn non_cliente_passes_everywhere() {
        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
            staff: true,
        };
        assert!(gate_admin_path(&Method::GET, "/api/products", &admin).is_ok());
        assert!(gate_admin_path(&Method::PUT, "/api/users/some-id", &admin).is_ok());
    }

    #[test]
    fn cliente_cannot_mutate_other_user_paths() {
        let user = cliente(true);
        let own = format!("/api/users/{}", user.user_id);
        assert!(gate_admin_path(&Method::PUT, &own, &user).is_ok());

        let other = format!("/api/users/{}", Uuid::new_v4());
        assert!(matches!(
            gate_admin_path(&Method::PUT, &other, &user),
            Err(AppError::Forbidden)
        ));

        // Reads of another user's path pass the gate; row scoping in
        // the user service decides what they see.
        assert!(gate_admin_path(&Method::GET, &other, &user).is_ok());
    }

    #[test]
    fn restricted_segments_require_staff() {
        let user = cliente(false);
        for path in [
            "/api/sales",
            "/api/sale-lines",
            "/api/products/abc",
            "/api/categories",
            "/api/nutrition/xyz",
        ] {
            assert!(
                matches!(
                    gate_admin_path(&Method::GET, path, &user),
                    Err(AppError::Forbidden)
                ),
                "expected {path} to be rejected"
            );
        }
    }

    #[test]
    fn staff_cliente_passes_restricted_segments() {
        let user = cliente(true);
        assert!(gate_admin_path(&Method::GET, "/api/sales", &user).is_ok());
        assert!(gate_admin_path(&Method::GET, "/api/products", &user).is_ok());
    }

    #[test]
    fn unrestricted_segments_pass_without_staff() {
        let user = cliente(false);
        assert!(gate_admin_path(&Method::GET, "/api/payment-methods", &user).is_ok());
        assert!(gate_admin_path(&Method::POST, "/api/auth/login", &user).is_ok());
    }
}
