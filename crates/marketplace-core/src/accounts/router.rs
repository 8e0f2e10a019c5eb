use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::access::Role;
use crate::app::Marketplace;
use crate::auth::AuthError;
use crate::http::{
    authorization, message, message_with, parse_actor_id, validation_failed, JsonBody,
};
use crate::listings::ImageStore;
use crate::store::MarketplaceStore;

use super::domain::{Credentials, MemberDraft, Registration};
use super::service::AccountError;

type AppState<S, B> = State<Arc<Marketplace<S, B>>>;

#[derive(Debug, Deserialize)]
pub(crate) struct RoleChange {
    pub(crate) role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivationChange {
    pub(crate) is_active: bool,
}

/// Router builder exposing registration, login, and staff management.
pub fn account_router<S, B>(marketplace: Arc<Marketplace<S, B>>) -> Router
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    Router::new()
        .route("/api/v1/auth/register", post(register_handler::<S, B>))
        .route("/api/v1/auth/login", post(login_handler::<S, B>))
        .route("/api/v1/auth/me", get(me_handler::<S, B>))
        .route("/api/v1/admin/users", post(create_member_handler::<S, B>))
        .route(
            "/api/v1/admin/users/:user_id",
            get(member_handler::<S, B>).delete(delete_member_handler::<S, B>),
        )
        .route(
            "/api/v1/admin/users/:user_id/role",
            patch(change_role_handler::<S, B>),
        )
        .route(
            "/api/v1/admin/users/:user_id/active",
            patch(set_active_handler::<S, B>),
        )
        .route(
            "/api/v1/admin/users/:user_id/permissions/refresh",
            post(refresh_permissions_handler::<S, B>),
        )
        .with_state(marketplace)
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_unauthenticated() {
            message(StatusCode::UNAUTHORIZED, self.to_string())
        } else {
            error!(error = %self, "actor lookup failed");
            message(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        match self {
            AccountError::Validation(err) => validation_failed(&err),
            AccountError::Forbidden(reason) => message(StatusCode::FORBIDDEN, reason),
            AccountError::NotFound => message(StatusCode::NOT_FOUND, "account not found"),
            AccountError::EmailTaken => message(StatusCode::CONFLICT, self.to_string()),
            AccountError::InvalidCredentials | AccountError::Deactivated => {
                message(StatusCode::UNAUTHORIZED, self.to_string())
            }
            AccountError::Password(_) | AccountError::Token(_) | AccountError::Repository(_) => {
                error!(error = %self, "account operation failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

pub(crate) async fn register_handler<S, B>(
    State(app): AppState<S, B>,
    JsonBody(registration): JsonBody<Registration>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    match app.accounts().register(registration) {
        Ok(actor) => message_with(
            StatusCode::CREATED,
            "registration successful",
            "user",
            json!(actor),
        ),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn login_handler<S, B>(
    State(app): AppState<S, B>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    match app.accounts().login(credentials) {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn me_handler<S, B>(State(app): AppState<S, B>, headers: HeaderMap) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => (StatusCode::OK, Json(actor)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn member_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let target_id = match parse_actor_id(&user_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let actor = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };
    if !crate::access::is_admin_family(Some(&actor)) {
        return message(StatusCode::FORBIDDEN, "requires a staff account");
    }

    match app.accounts().get(&target_id) {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn create_member_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    JsonBody(draft): JsonBody<MemberDraft>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let creator = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.accounts().create_member(&creator, draft) {
        Ok(actor) => message_with(StatusCode::CREATED, "user created", "user", json!(actor)),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn change_role_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    JsonBody(change): JsonBody<RoleChange>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let target_id = match parse_actor_id(&user_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let manager = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.accounts().change_role(&manager, &target_id, change.role) {
        Ok(actor) => message_with(StatusCode::OK, "role updated", "user", json!(actor)),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn set_active_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    JsonBody(change): JsonBody<ActivationChange>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let target_id = match parse_actor_id(&user_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let manager = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app
        .accounts()
        .set_active(&manager, &target_id, change.is_active)
    {
        Ok(actor) => {
            let text = if actor.is_active {
                "user activated"
            } else {
                "user deactivated"
            };
            message_with(StatusCode::OK, text, "user", json!(actor))
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_member_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let target_id = match parse_actor_id(&user_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let manager = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.delete_member(&manager, &target_id) {
        Ok(transfer) => message_with(StatusCode::OK, "user deleted", "transfer", json!(transfer)),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn refresh_permissions_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let target_id = match parse_actor_id(&user_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let manager = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.accounts().refresh_permissions(&manager, &target_id) {
        Ok(actor) => message_with(StatusCode::OK, "permissions refreshed", "user", json!(actor)),
        Err(err) => err.into_response(),
    }
}
