use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use warbler::application::ports::store::Store;
use warbler::bootstrap::app_context::{AppContext, AppServices};
use warbler::bootstrap::config::{Config, StoreBackend};
use warbler::infrastructure::crypto::Argon2CredentialHasher;

#[derive(OpenApi)]
#[openapi(
        paths(
            warbler::presentation::http::auth::signup,
            warbler::presentation::http::auth::login,
            warbler::presentation::http::auth::logout,
            warbler::presentation::http::messages::home,
            warbler::presentation::http::messages::create_message,
            warbler::presentation::http::messages::show_message,
            warbler::presentation::http::messages::delete_message,
            warbler::presentation::http::messages::toggle_like,
            warbler::presentation::http::users::list_users,
            warbler::presentation::http::users::show_user,
            warbler::presentation::http::users::show_following,
            warbler::presentation::http::users::show_followers,
            warbler::presentation::http::users::show_likes,
            warbler::presentation::http::users::add_follow,
            warbler::presentation::http::users::stop_following,
            warbler::presentation::http::users::show_profile,
            warbler::presentation::http::users::update_profile,
            warbler::presentation::http::users::delete_user,
            warbler::presentation::http::health::health,
        ),
        components(schemas(
            warbler::presentation::http::auth::SignupForm,
            warbler::presentation::http::auth::LoginForm,
            warbler::presentation::http::auth::AuthResponse,
            warbler::presentation::http::auth::UserResponse,
            warbler::presentation::http::flash::Flash,
            warbler::presentation::http::flash::FlashResponse,
            warbler::presentation::http::messages::MessageResponse,
            warbler::presentation::http::messages::MessageDetailResponse,
            warbler::presentation::http::messages::HomeResponse,
            warbler::presentation::http::messages::NewMessageForm,
            warbler::presentation::http::messages::LikeResponse,
            warbler::presentation::http::users::UserSummary,
            warbler::presentation::http::users::UserDetailResponse,
            warbler::presentation::http::users::ConnectionsResponse,
            warbler::presentation::http::users::LikesResponse,
            warbler::presentation::http::users::ProfileForm,
            warbler::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Auth", description = "Signup, login and logout"),
            (name = "Users", description = "Profiles, follows and likes"),
            (name = "Messages", description = "Warbles and the home timeline"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "warbler=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        backend = ?cfg.store_backend,
        production = cfg.is_production,
        "Starting Warbler backend"
    );

    let store: Arc<dyn Store> = match cfg.store_backend {
        StoreBackend::Postgres => {
            let pool = warbler::infrastructure::db::connect_pool(&cfg.database_url).await?;
            warbler::infrastructure::db::migrate(&pool).await?;
            Arc::new(warbler::infrastructure::db::repositories::store_sqlx::SqlxStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("store_backend_memory_data_is_not_persisted");
            Arc::new(warbler::infrastructure::memory::MemoryStore::new())
        }
    };
    let services = AppServices::new(store, Arc::new(Argon2CredentialHasher::default()));
    let ctx = AppContext::new(cfg.clone(), services);

    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::OPTIONS,
    ];
    let headers = [http::header::CONTENT_TYPE, http::header::AUTHORIZATION];
    let cors = match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
        Some(Err(_)) | None if cfg.is_production => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
            .allow_methods(methods)
            .allow_headers(headers),
        // Development convenience
        Some(Err(_)) | None => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
    };

    let app = warbler::presentation::http::router(ctx)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    });

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "ctrl_c_listener_failed");
    }
    info!("shutdown_requested");
}
