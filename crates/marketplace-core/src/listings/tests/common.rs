use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::access::{permissions_of, Actor, ActorId, Role};
use crate::accounts::{ActorRecord, ActorRepository, HashedPassword};
use crate::app::{marketplace_router, Marketplace};
use crate::auth::TokenCodec;
use crate::cache::CacheTtls;
use crate::clock::ManualClock;
use crate::listings::{BlobError, ImageStore, PropertyDraft, PropertyImage, PropertyLocation};
use crate::store::InMemoryStore;

#[derive(Default)]
pub(super) struct RecordingImages {
    deleted: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingImages {
    pub(super) fn failing() -> Self {
        Self {
            deleted: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub(super) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("images mutex poisoned").clone()
    }
}

impl ImageStore for RecordingImages {
    fn delete(&self, public_id: &str) -> Result<(), BlobError> {
        self.deleted
            .lock()
            .expect("images mutex poisoned")
            .push(public_id.to_string());
        if self.fail {
            Err(BlobError::Unavailable("storage offline".to_string()))
        } else {
            Ok(())
        }
    }
}

pub(super) struct Harness {
    pub(super) store: Arc<InMemoryStore>,
    pub(super) images: Arc<RecordingImages>,
    pub(super) marketplace: Arc<Marketplace<InMemoryStore, RecordingImages>>,
}

impl Harness {
    pub(super) fn new() -> Self {
        Self::with_images(RecordingImages::default())
    }

    pub(super) fn with_images(images: RecordingImages) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let images = Arc::new(images);
        // Tokens are verified against wall-clock time, so start the manual clock at now.
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let marketplace = Arc::new(Marketplace::new(
            store.clone(),
            images.clone(),
            TokenCodec::new("listing-tests", chrono::Duration::hours(1)),
            CacheTtls::default(),
            clock,
        ));
        Self {
            store,
            images,
            marketplace,
        }
    }

    pub(super) fn account(&self, email: &str, role: Role) -> Actor {
        let record = ActorRecord::new(
            email.to_string(),
            email.split('@').next().unwrap_or(email).to_string(),
            HashedPassword::from_hash("not-a-real-hash".to_string()),
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

/// Actor value built directly, bypassing the store, for pure decision tests.
pub(super) fn actor(role: Role) -> Actor {
    Actor {
        id: ActorId::new(),
        email: format!("{}@example.com", role.as_str()),
        name: role.label().to_string(),
        role,
        hierarchy: role.hierarchy(),
        permissions: permissions_of(Some(role)),
        is_active: true,
    }
}

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    use chrono::TimeZone;
    Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
}

pub(super) fn draft() -> PropertyDraft {
    PropertyDraft {
        title: "Nile view apartment".to_string(),
        description: "Third floor, three bedrooms".to_string(),
        price: 4_500_000,
        location: PropertyLocation {
            governorate: "Cairo".to_string(),
            city: "Zamalek".to_string(),
            area: Some("Abu El Feda".to_string()),
        },
        images: vec![
            PropertyImage {
                url: "https://cdn.example.com/listings/1.jpg".to_string(),
                public_id: Some("listings/1".to_string()),
            },
            PropertyImage {
                url: "https://cdn.example.com/listings/2.jpg".to_string(),
                public_id: Some("listings/2".to_string()),
            },
        ],
    }
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

pub(super) fn empty_request(method: &str, uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }
    builder.body(Body::empty()).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
