use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::access::{Actor, Role};
use crate::accounts::{ActorRecord, ActorRepository, HashedPassword};
use crate::app::{marketplace_router, Marketplace};
use crate::auth::TokenCodec;
use crate::cache::CacheTtls;
use crate::clock::SystemClock;
use crate::listings::{BlobError, ImageStore};
use crate::store::InMemoryStore;

pub(super) struct DiscardImages;

impl ImageStore for DiscardImages {
    fn delete(&self, _public_id: &str) -> Result<(), BlobError> {
        Ok(())
    }
}

pub(super) struct Harness {
    pub(super) store: Arc<InMemoryStore>,
    pub(super) marketplace: Arc<Marketplace<InMemoryStore, DiscardImages>>,
}

impl Harness {
    pub(super) fn new() -> Self {
        let store = Arc::new(InMemoryStore::default());
        let marketplace = Arc::new(Marketplace::new(
            store.clone(),
            Arc::new(DiscardImages),
            TokenCodec::new("account-tests", chrono::Duration::hours(1)),
            CacheTtls::default(),
            Arc::new(SystemClock),
        ));
        Self { store, marketplace }
    }

    /// Stored account whose hash cannot match any password; callers authenticate with
    /// [`Harness::bearer`].
    pub(super) fn account(&self, email: &str, role: Role) -> Actor {
        let record = ActorRecord::new(
            email.to_string(),
            email.to_string(),
            HashedPassword::from_hash("unusable".to_string()),
            role,
            Utc::now(),
        );
        self.store
            .insert_actor(record)
            .expect("insert actor")
            .to_actor()
    }

    pub(super) fn bearer(&self, actor: &Actor) -> String {
        let (token, _) = self
            .marketplace
            .guard()
            .codec()
            .issue(&actor.id, Utc::now())
            .expect("token issues");
        format!("Bearer {token}")
    }

    pub(super) fn router(&self) -> axum::Router {
        marketplace_router(self.marketplace.clone())
    }
}

pub(super) fn request(
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).expect("serialize body"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
