//! Shared helpers for the survey worker integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use http_body_util::BodyExt;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::util::ServiceExt;

use survey_core::{Kid, Secret};
use survey_worker::{create_router, AppState, KeyRegistry, MemoryStore, ObjectStore, SecretRing};

pub const CALLER: &str = "openttd";
pub const CALLER_PUBLIC: &str = include_str!("../fixtures/caller_public.b64");
pub const CALLER_PRIVATE: &str = include_str!("../fixtures/caller_private.pem");
pub const INTRUDER_PRIVATE: &str = include_str!("../fixtures/intruder_private.pem");

pub const RETIRED_SECRET: &str = "retired-survey-secret";
pub const ACTIVE_SECRET: &str = "active-survey-secret";

pub const SURVEY_ID: &str = "0123456789ABCDEF0123456789ABCDEF";

pub fn kid(value: u32) -> Kid {
    Kid::new(value).unwrap()
}

/// kid 1 is retired, kid 2 is active
pub fn secrets() -> SecretRing {
    SecretRing::new(
        BTreeMap::from([
            (kid(1), Secret::new(RETIRED_SECRET)),
            (kid(2), Secret::new(ACTIVE_SECRET)),
        ]),
        kid(2),
    )
    .unwrap()
}

pub fn registry() -> KeyRegistry {
    KeyRegistry::from_encoded([(CALLER, CALLER_PUBLIC)]).unwrap()
}

/// Router wired to an in-memory bucket
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let bucket: Arc<dyn ObjectStore> = store.clone();
        let state = Arc::new(AppState::new(registry(), secrets(), bucket));
        let router = create_router(Arc::clone(&state));
        Self {
            router,
            state,
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        Reply {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    /// Wait until every submission accepted so far has been processed
    pub async fn settle(&self) {
        self.state.drain().await;
    }

    /// Submit a body and wait for it to be processed
    pub async fn submit(&self, body: &str) -> Reply {
        let reply = self.send(post("/", body)).await;
        self.settle().await;
        reply
    }

    /// Request a survey key for `body`, signed by the registered caller
    pub async fn request_key(&self, body: &str) -> Reply {
        let request = signed_post(&format!("/create-survey-key/{}", CALLER), body, CALLER_PRIVATE);
        self.send(request).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

pub fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_with_signature(uri: &str, body: &str, signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn signed_post(uri: &str, body: &str, private_pem: &str) -> Request<Body> {
    post_with_signature(uri, body, &sign(body.as_bytes(), private_pem))
}

/// Base64 RSASSA-PKCS1-v1_5 / SHA-256 signature over `body`
pub fn sign(body: &[u8], private_pem: &str) -> String {
    let key = RsaPrivateKey::from_pkcs8_pem(private_pem).unwrap();
    let signature = key
        .sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(body))
        .unwrap();
    STANDARD.encode(signature)
}

pub fn submission(key: serde_json::Value) -> String {
    serde_json::json!({"id": SURVEY_ID, "schema": 1, "key": key}).to_string()
}
