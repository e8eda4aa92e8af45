pub mod auth;
pub mod flash;
pub mod health;
pub mod messages;
pub mod users;

use axum::Router;

use crate::bootstrap::app_context::AppContext;

/// Every HTTP route of the service, state already attached.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .merge(auth::routes(ctx.clone()))
        .merge(messages::routes(ctx.clone()))
        .merge(users::routes(ctx.clone()))
        .nest("/api", health::routes(ctx))
}
