use crate::application::ports::store::StoreError;
use crate::application::use_cases::auth::authenticate::Authenticate;
use crate::application::use_cases::auth::signup::{Signup, SignupRequest};
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::users::{User, UserId, ValidationError};
use crate::presentation::http::flash;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// The authenticated user's own view, including email.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            username: u.username,
            email: u.email,
            image_url: u.image_url,
            header_image_url: u.header_image_url,
            bio: u.bio,
            location: u.location,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/signup", tag = "Auth", request_body = SignupForm, security(()), responses(
    (status = 200, body = AuthResponse),
    (status = 409, body = flash::FlashResponse),
    (status = 422, body = flash::FlashResponse)
))]
pub async fn signup(
    State(ctx): State<AppContext>,
    Json(form): Json<SignupForm>,
) -> Result<Response, StatusCode> {
    let store = ctx.store();
    let hasher = ctx.hasher();
    let uc = Signup {
        store: store.as_ref(),
        hasher: hasher.as_ref(),
    };
    let req = SignupRequest {
        username: form.username,
        email: form.email,
        password: form.password,
        image_url: form.image_url,
    };
    let user = match uc.execute(&req).await {
        Ok(user) => user,
        Err(err) => {
            if let Some(invalid) = err.downcast_ref::<ValidationError>() {
                return Ok(flash::danger(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    invalid.to_string(),
                ));
            }
            if err
                .downcast_ref::<StoreError>()
                .is_some_and(StoreError::is_integrity)
            {
                return Ok(flash::danger(StatusCode::CONFLICT, flash::TAKEN_MESSAGE));
            }
            return Err(flash::internal(err));
        }
    };
    logged_in(&ctx.cfg, user)
}

#[utoipa::path(post, path = "/login", tag = "Auth", request_body = LoginForm, security(()), responses(
    (status = 200, body = AuthResponse),
    (status = 401, body = flash::FlashResponse)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(form): Json<LoginForm>,
) -> Result<Response, StatusCode> {
    let store = ctx.store();
    let hasher = ctx.hasher();
    let uc = Authenticate {
        store: store.as_ref(),
        hasher: hasher.as_ref(),
    };
    let user = uc
        .execute(&form.username, &form.password)
        .await
        .map_err(flash::internal)?;
    match user {
        Some(user) => logged_in(&ctx.cfg, user),
        None => Ok(flash::danger(StatusCode::UNAUTHORIZED, "Invalid credentials.")),
    }
}

fn logged_in(cfg: &Config, user: User) -> Result<Response, StatusCode> {
    let token = issue_token(cfg, user.id).map_err(|e| {
        tracing::error!(error = ?e, "token_issue_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    // Set HttpOnly cookie with the access token
    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie(&token, cfg.jwt_expires_secs, cfg.secure_cookies());
    headers.insert(
        axum::http::header::SET_COOKIE,
        axum::http::HeaderValue::from_str(&cookie)
            .unwrap_or(axum::http::HeaderValue::from_static("")),
    );
    Ok((
        headers,
        Json(AuthResponse {
            access_token: token,
            user: user.into(),
        }),
    )
        .into_response())
}

pub fn issue_token(cfg: &Config, user_id: UserId) -> jsonwebtoken::errors::Result<String> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + (cfg.jwt_expires_secs.max(0) as usize),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
    )
}

// --- Bearer extractor & JWT utils ---
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1) Prefer Authorization header if present
        if let Some(auth) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth.strip_prefix("Bearer ") {
                return Ok(Bearer(t.to_string()));
            }
        }

        // 2) Fallback to HttpOnly cookie `access_token`
        if let Some(cookie_hdr) = parts
            .headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = get_cookie(cookie_hdr, "access_token") {
                return Ok(Bearer(token));
            }
        }

        Err(StatusCode::UNAUTHORIZED)
    }
}

pub(crate) fn validate_bearer(cfg: &Config, bearer: Bearer) -> Result<String, StatusCode> {
    let data = jsonwebtoken::decode::<Claims>(
        &bearer.0,
        &DecodingKey::from_secret(cfg.jwt_secret_pem.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(data.claims.sub)
}

/// Who is making the request. Built per request from the bearer token; a missing or
/// invalid token, or one whose user no longer exists, yields an anonymous context.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    user: Option<User>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let Ok(bearer) = Bearer::from_request_parts(parts, ctx).await else {
            return Ok(Self::anonymous());
        };
        let Some(user_id) = validate_bearer(&ctx.cfg, bearer)
            .ok()
            .and_then(|sub| sub.parse::<UserId>().ok())
        else {
            return Ok(Self::anonymous());
        };
        let store = ctx.store();
        let user = store.users().get(user_id).await.map_err(|e| {
            tracing::error!(error = ?e, user_id, "auth_context_lookup_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        if user.is_none() {
            tracing::debug!(user_id, "auth_context_unknown_user");
        }
        Ok(Self { user })
    }
}

// --- Cookie helpers & logout ---

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "access_token={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}

pub(crate) fn clear_cookie_headers(cfg: &Config) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let cookie = if cfg.secure_cookies() {
        "access_token=; HttpOnly; Secure; Path=/; Max-Age=0; SameSite=Lax"
    } else {
        "access_token=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax"
    };
    headers.insert(
        axum::http::header::SET_COOKIE,
        axum::http::HeaderValue::from_static(cookie),
    );
    headers
}

#[utoipa::path(post, path = "/logout", tag = "Auth", responses((status = 200, body = flash::FlashResponse)))]
pub async fn logout(State(ctx): State<AppContext>) -> Response {
    (
        clear_cookie_headers(&ctx.cfg),
        flash::success(StatusCode::OK, "You have successfully logged out."),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_cookie() {
        let hdr = "theme=dark; access_token=abc.def ; other=1";
        assert_eq!(get_cookie(hdr, "access_token").as_deref(), Some("abc.def"));
        assert_eq!(get_cookie(hdr, "missing"), None);
    }

    #[test]
    fn access_cookie_attributes() {
        let c = build_access_cookie("tok", 60, true);
        assert!(c.starts_with("access_token=tok; HttpOnly; Secure;"));
        assert!(c.contains("Max-Age=60"));
        let c = build_access_cookie("tok", -5, false);
        assert!(!c.contains("Secure"));
        assert!(c.contains("Max-Age=0"));
    }
}
