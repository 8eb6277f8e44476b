// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Superadmin-only endpoints for managing operator accounts and roles.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::run_blocking;
use crate::{
    auth::{Auth, AuthErrorBody},
    error::ApiError,
    models::{
        Account, AccountUpdate, CreateAdminRequest, NewAccount, PublicAccount, UpdateRoleRequest,
    },
    state::AppState,
};

/// Create an account with an explicit role.
#[utoipa::path(
    post,
    path = "/api/admins",
    tag = "Admins",
    security(("bearer" = [])),
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Account created", body = PublicAccount),
        (status = 400, description = "Invalid name, email or password"),
        (status = 401, description = "Missing token or not a superadmin", body = AuthErrorBody),
        (status = 403, description = "Invalid token", body = AuthErrorBody),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn create_admin(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<PublicAccount>), ApiError> {
    let input = NewAccount::from(request);
    let account = run_blocking(move || Account::new(input)).await??;
    let account = state.store.create(account).await?;

    tracing::info!(
        account_id = %account.id,
        role = %account.role,
        actor = %identity.account_id(),
        "Admin account created"
    );
    Ok((StatusCode::CREATED, Json(account.to_public())))
}

/// Change an account's role.
///
/// Takes effect on the target's next request; credentials already issued
/// stay valid.
#[utoipa::path(
    put,
    path = "/api/admins/{id}/role",
    tag = "Admins",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Account ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated account", body = PublicAccount),
        (status = 401, description = "Missing token or not a superadmin", body = AuthErrorBody),
        (status = 404, description = "No such account"),
    )
)]
pub async fn update_role(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<PublicAccount>, ApiError> {
    let previous = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?
        .role;

    let account = state.store.modify(&id, AccountUpdate::role(request.role)).await?;

    tracing::info!(
        account_id = %account.id,
        from = %previous,
        to = %account.role,
        actor = %identity.account_id(),
        "Role changed"
    );
    Ok(Json(account.to_public()))
}
