use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::app::Marketplace;
use crate::http::{
    authorization, message, message_with, validation_failed, JsonBody, OptionalJsonBody,
    QueryParams,
};
use crate::store::MarketplaceStore;
use crate::validation::ValidationError;

use super::domain::{PropertyDraft, PropertyId, PropertyPatch};
use super::query::ListingQuery;
use super::repository::ImageStore;
use super::service::ListingError;

type AppState<S, B> = State<Arc<Marketplace<S, B>>>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Freshness {
    #[serde(default)]
    pub(crate) fresh: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RejectRequest {
    pub(crate) reason: Option<String>,
}

/// Router builder exposing listing submission, moderation, and reads.
pub fn listing_router<S, B>(marketplace: Arc<Marketplace<S, B>>) -> Router
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/properties",
            get(list_handler::<S, B>).post(create_handler::<S, B>),
        )
        .route("/api/v1/properties/stats", get(stats_handler::<S, B>))
        .route("/api/v1/properties/pending", get(pending_handler::<S, B>))
        .route(
            "/api/v1/properties/:property_id",
            get(detail_handler::<S, B>).put(edit_handler::<S, B>),
        )
        .route(
            "/api/v1/properties/:property_id/approve",
            post(approve_handler::<S, B>),
        )
        .route(
            "/api/v1/properties/:property_id/reject",
            post(reject_handler::<S, B>),
        )
        .with_state(marketplace)
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        match self {
            ListingError::Validation(err) => validation_failed(&err),
            ListingError::Forbidden(reason) => message(StatusCode::FORBIDDEN, reason),
            ListingError::NotFound => message(StatusCode::NOT_FOUND, self.to_string()),
            ListingError::InvalidState { .. } | ListingError::Conflict => {
                message(StatusCode::CONFLICT, self.to_string())
            }
            ListingError::Repository(_) => {
                error!(error = %self, "listing operation failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

fn parse_property_id(raw: &str) -> Result<PropertyId, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::new("id", "must be a valid identifier"))
}

pub(crate) async fn list_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    QueryParams(query): QueryParams<ListingQuery>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let viewer = app.guard().authenticate_optional(authorization(&headers));
    match app.listings().list(viewer.as_ref(), &query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn create_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    JsonBody(draft): JsonBody<PropertyDraft>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let actor = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.listings().create(&actor, draft) {
        Ok(record) => message_with(
            StatusCode::CREATED,
            "property submitted",
            "property",
            json!(record),
        ),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn stats_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    QueryParams(freshness): QueryParams<Freshness>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let actor = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.listings().stats(&actor, freshness.fresh) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn pending_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    QueryParams(query): QueryParams<ListingQuery>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let actor = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.listings().pending(&actor, &query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn detail_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    QueryParams(freshness): QueryParams<Freshness>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let id = match parse_property_id(&property_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let viewer = app.guard().authenticate_optional(authorization(&headers));

    match app.listings().get(viewer.as_ref(), &id, freshness.fresh) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn edit_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    JsonBody(patch): JsonBody<PropertyPatch>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let id = match parse_property_id(&property_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let actor = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.listings().edit(&actor, &id, patch) {
        Ok(record) => message_with(StatusCode::OK, "property updated", "property", json!(record)),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn approve_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let id = match parse_property_id(&property_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let actor = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };

    match app.listings().approve(&actor, &id) {
        Ok(record) => message_with(
            StatusCode::OK,
            "property approved",
            "property",
            json!(record),
        ),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn reject_handler<S, B>(
    State(app): AppState<S, B>,
    headers: HeaderMap,
    Path(property_id): Path<String>,
    OptionalJsonBody(body): OptionalJsonBody<RejectRequest>,
) -> Response
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    let id = match parse_property_id(&property_id) {
        Ok(id) => id,
        Err(err) => return validation_failed(&err),
    };
    let actor = match app.guard().authenticate(authorization(&headers)) {
        Ok(actor) => actor,
        Err(err) => return err.into_response(),
    };
    let request = body.unwrap_or_default();

    match app.listings().reject(&actor, &id, request.reason) {
        Ok(record) => message_with(
            StatusCode::OK,
            "property rejected",
            "property",
            json!(record),
        ),
        Err(err) => err.into_response(),
    }
}
