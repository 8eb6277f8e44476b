// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_auth, require_role, AuthErrorBody, Role, RolePolicy},
    error::ApiError,
    models::{
        CreateAdminRequest, LoginRequest, LoginResponse, PublicAccount, RegisterAccountRequest,
        UpdateAccountRequest, UpdateRoleRequest,
    },
    state::AppState,
};

pub mod admins;
pub mod health;
pub mod users;

/// Build the application router.
///
/// Each protected group carries its own gate layers. Route layers run
/// outermost-last, so authentication is added after the role check to run
/// before it.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/api/users", post(users::register))
        .route("/api/users/login", post(users::login));

    let authenticated = Router::new()
        .route("/api/users/me", get(users::me))
        .route_layer(from_fn_with_state(state.gate.clone(), require_auth));

    let any_admin = Router::new()
        .route("/api/users", get(users::list_accounts))
        .route(
            "/api/users/{id}",
            get(users::get_account)
                .put(users::update_account)
                .delete(users::delete_account),
        )
        .route_layer(from_fn_with_state(RolePolicy::ANY_ADMIN, require_role))
        .route_layer(from_fn_with_state(state.gate.clone(), require_auth));

    let superadmin_only = Router::new()
        .route("/api/admins", post(admins::create_admin))
        .route("/api/admins/{id}/role", put(admins::update_role))
        .route_layer(from_fn_with_state(RolePolicy::SUPERADMIN_ONLY, require_role))
        .route_layer(from_fn_with_state(state.gate.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(any_admin)
        .merge(superadmin_only)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Run CPU-bound work (password hashing) off the async workers.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!(error = %e, "Blocking task failed");
        ApiError::internal()
    })
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        users::register,
        users::login,
        users::me,
        users::list_accounts,
        users::get_account,
        users::update_account,
        users::delete_account,
        admins::create_admin,
        admins::update_role
    ),
    components(
        schemas(
            PublicAccount,
            Role,
            RegisterAccountRequest,
            CreateAdminRequest,
            UpdateAccountRequest,
            UpdateRoleRequest,
            LoginRequest,
            LoginResponse,
            AuthErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Users", description = "Registration, login and account management"),
        (name = "Admins", description = "Superadmin account and role management")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn test_config() -> ServerConfig {
        ServerConfig::from_lookup(|name| (name == "JWT_SECRET").then(|| "router-test".to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::in_memory(&test_config()));
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_lists_protected_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/users",
            "/api/users/login",
            "/api/users/me",
            "/api/users/{id}",
            "/api/admins",
            "/api/admins/{id}/role",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
