// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints.
//!
//! Registration and login are public. `/me` needs authentication only;
//! everything else also needs an admin or superadmin role, enforced by the
//! route layers in [`super::router`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::run_blocking;
use crate::{
    auth::{password, Auth, AuthError, AuthErrorBody, AuthenticatedAccount},
    error::ApiError,
    models::{
        Account, AccountUpdate, LoginRequest, LoginResponse, NewAccount, PublicAccount,
        RegisterAccountRequest, UpdateAccountRequest,
    },
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Register a new account.
///
/// Always creates an `admin`; any requested role is ignored.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = RegisterAccountRequest,
    responses(
        (status = 201, description = "Account created", body = PublicAccount),
        (status = 400, description = "Invalid name, email or password"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterAccountRequest>,
) -> Result<(StatusCode, Json<PublicAccount>), ApiError> {
    let input = NewAccount::from(request);
    let account = run_blocking(move || Account::new(input)).await??;
    let account = state.store.create(account).await?;

    tracing::info!(account_id = %account.id, role = %account.role, "Account registered");
    Ok((StatusCode::CREATED, Json(account.to_public())))
}

/// Exchange email and password for a bearer credential.
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credential issued", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let password = request.password;
    let Some(account) = state.store.find_by_email(&request.email).await? else {
        run_blocking(move || password::verify_decoy(&password)).await?;
        tracing::info!("Login refused: unknown email");
        return Err(ApiError::unauthorized("invalid_credentials", INVALID_CREDENTIALS));
    };

    let (account, verified) = run_blocking(move || {
        let verified = account.verify_password(&password);
        (account, verified)
    })
    .await?;

    if !verified {
        tracing::info!(account_id = %account.id, "Login refused: wrong password");
        return Err(ApiError::unauthorized("invalid_credentials", INVALID_CREDENTIALS));
    }

    let (token, claims) = state.issuer.issue(&account.id)?;
    let expires_at = claims.expires_at_utc().ok_or_else(ApiError::internal)?;

    tracing::info!(account_id = %account.id, "Credential issued");
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_at,
        account: account.to_public(),
    }))
}

/// The account behind the presented credential.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current account", body = PublicAccount),
        (status = 401, description = "Missing token", body = AuthErrorBody),
        (status = 403, description = "Invalid token", body = AuthErrorBody),
        (status = 404, description = "Account no longer exists", body = AuthErrorBody),
    )
)]
pub async fn me(Auth(identity): Auth) -> Json<PublicAccount> {
    Json(identity.account().to_public())
}

/// List all accounts, oldest first.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All accounts", body = Vec<PublicAccount>),
        (status = 401, description = "Missing token or insufficient role", body = AuthErrorBody),
        (status = 403, description = "Invalid token", body = AuthErrorBody),
    )
)]
pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<PublicAccount>>, ApiError> {
    let accounts = state.store.list().await?;
    Ok(Json(accounts.iter().map(PublicAccount::from).collect()))
}

/// Get one account.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = PublicAccount),
        (status = 401, description = "Missing token or insufficient role", body = AuthErrorBody),
        (status = 404, description = "No such account"),
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicAccount>, ApiError> {
    let account = state
        .store
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(account.to_public()))
}

/// Update an account's profile, password or flags.
///
/// Role changes go through `PUT /api/admins/{id}/role`. Admins may not
/// update superadmins.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = PublicAccount),
        (status = 400, description = "Invalid field"),
        (status = 401, description = "Missing token, insufficient role or target outranks caller", body = AuthErrorBody),
        (status = 404, description = "No such account"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn update_account(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<PublicAccount>, ApiError> {
    let target = find_manageable(&state, &identity, &id).await?;

    let update = run_blocking(move || AccountUpdate::prepare(request)).await??;
    let account = state.store.modify(&target.id, update).await?;

    tracing::info!(
        account_id = %account.id,
        actor = %identity.account_id(),
        "Account updated"
    );
    Ok(Json(account.to_public()))
}

/// Delete an account. Admins may not delete superadmins.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Missing token, insufficient role or target outranks caller", body = AuthErrorBody),
        (status = 404, description = "No such account"),
    )
)]
pub async fn delete_account(
    Auth(identity): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let target = find_manageable(&state, &identity, &id).await?;
    state.store.delete(&target.id).await?;
    tracing::info!(account_id = %id, actor = %identity.account_id(), "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Load the target of a mutation and check the caller may act on it.
///
/// Admins cannot touch superadmin accounts, so they cannot take one over
/// through a password or email change.
async fn find_manageable(
    state: &AppState,
    identity: &AuthenticatedAccount,
    id: &str,
) -> Result<Account, ApiError> {
    let target = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !identity.can_manage(&target) {
        tracing::warn!(
            account_id = %target.id,
            target_role = %target.role,
            actor = %identity.account_id(),
            actor_role = %identity.role(),
            "Refused change to higher-ranked account"
        );
        return Err(AuthError::InsufficientRole.into());
    }
    Ok(target)
}
