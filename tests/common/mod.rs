#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use warbler::application::use_cases::auth::signup::{Signup, SignupRequest};
use warbler::bootstrap::app_context::{AppContext, AppServices};
use warbler::bootstrap::config::Config;
use warbler::domain::users::{User, UserId};
use warbler::infrastructure::crypto::Argon2CredentialHasher;
use warbler::infrastructure::memory::MemoryStore;
use warbler::presentation::http::auth::issue_token;

/// Router over a fresh in-memory store. `store` shares tables with the router.
pub struct TestApp {
    pub ctx: AppContext,
    pub store: MemoryStore,
    pub router: Router,
}

pub fn fast_hasher() -> Argon2CredentialHasher {
    Argon2CredentialHasher::with_params(64, 1, 1).unwrap()
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        "STORE_BACKEND" => Some("memory".to_string()),
        _ => None,
    })
    .unwrap()
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let services = AppServices::new(Arc::new(store.clone()), Arc::new(fast_hasher()));
        let ctx = AppContext::new(test_config(), services);
        let router = warbler::presentation::http::router(ctx.clone());
        Self { ctx, store, router }
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> User {
        let hasher = fast_hasher();
        Signup {
            store: &self.store,
            hasher: &hasher,
        }
        .execute(&SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            image_url: None,
        })
        .await
        .unwrap()
    }

    pub fn token_for(&self, user_id: UserId) -> String {
        issue_token(&self.ctx.cfg, user_id).unwrap()
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, String) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let (status, _, text) = self.request(req).await;
        (status, text)
    }

    /// Sends a prepared request and keeps the response headers.
    pub async fn request(&self, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}
