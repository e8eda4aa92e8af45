use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::users::{UserConnectionsDto, UserLikesDto, UserProfileDto};
use crate::application::ports::store::StoreError;
use crate::application::use_cases::users::delete_user::DeleteUser;
use crate::application::use_cases::users::follow::Follow;
use crate::application::use_cases::users::get_user::GetUser;
use crate::application::use_cases::users::list_followers::ListFollowers;
use crate::application::use_cases::users::list_following::ListFollowing;
use crate::application::use_cases::users::list_likes::ListLikes;
use crate::application::use_cases::users::list_users::ListUsers;
use crate::application::use_cases::users::stop_following::StopFollowing;
use crate::application::use_cases::users::update_profile::{
    ProfileUpdate, UpdateProfile, UpdateProfileRequest,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::users::{User, UserId, ValidationError};
use crate::presentation::http::auth::{AuthContext, UserResponse, clear_cookie_headers};
use crate::presentation::http::flash;
use crate::presentation::http::messages::{self as message_routes, MessageResponse};

/// Public view of a user. Never carries the email or the password digest.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        UserSummary {
            id: u.id,
            username: u.username,
            image_url: u.image_url,
            header_image_url: u.header_image_url,
            bio: u.bio,
            location: u.location,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetailResponse {
    pub user: UserSummary,
    pub messages: Vec<MessageResponse>,
    pub following_count: u64,
    pub followers_count: u64,
    pub likes_count: u64,
    pub is_following: bool,
}

impl From<UserProfileDto> for UserDetailResponse {
    fn from(dto: UserProfileDto) -> Self {
        UserDetailResponse {
            user: dto.user.into(),
            messages: dto.messages.into_iter().map(Into::into).collect(),
            following_count: dto.following_count,
            followers_count: dto.followers_count,
            likes_count: dto.likes_count,
            is_following: dto.viewer_is_following,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionsResponse {
    pub user: UserSummary,
    pub users: Vec<UserSummary>,
}

impl From<UserConnectionsDto> for ConnectionsResponse {
    fn from(dto: UserConnectionsDto) -> Self {
        ConnectionsResponse {
            user: dto.user.into(),
            users: dto.users.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LikesResponse {
    pub user: UserSummary,
    pub messages: Vec<MessageResponse>,
}

impl From<UserLikesDto> for LikesResponse {
    fn from(dto: UserLikesDto) -> Self {
        LikesResponse {
            user: dto.user.into(),
            messages: dto.messages.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProfileForm {
    /// Current password, required to confirm any change.
    pub password: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/profile", get(show_profile).post(update_profile))
        .route("/users/delete", post(delete_user))
        .route("/users/follow/:id", post(add_follow))
        .route("/users/stop-following/:id", post(stop_following))
        .route("/users/add_like/:message_id", post(message_routes::toggle_like))
        .route("/users/:id", get(show_user))
        .route("/users/:id/following", get(show_following))
        .route("/users/:id/followers", get(show_followers))
        .route("/users/:id/likes", get(show_likes))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/users", tag = "Users",
    params(("q" = Option<String>, Query, description = "Substring of the username")),
    responses((status = 200, body = [UserSummary])))]
pub async fn list_users(
    State(ctx): State<AppContext>,
    Query(q): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserSummary>>, StatusCode> {
    let store = ctx.store();
    let uc = ListUsers {
        store: store.as_ref(),
    };
    let users = uc.execute(q.q).await.map_err(flash::internal)?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/users/{id}", tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, body = UserDetailResponse), (status = 404, description = "Not found")))]
pub async fn show_user(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<UserId>,
) -> Result<Json<UserDetailResponse>, StatusCode> {
    let store = ctx.store();
    let uc = GetUser {
        store: store.as_ref(),
        message_limit: ctx.cfg.timeline_limit,
    };
    match uc.execute(id, auth.user_id()).await.map_err(flash::internal)? {
        Some(dto) => Ok(Json(dto.into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

#[utoipa::path(get, path = "/users/{id}/following", tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, body = ConnectionsResponse), (status = 404, description = "Not found")))]
pub async fn show_following(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<UserId>,
) -> Result<Response, StatusCode> {
    if auth.user().is_none() {
        return Ok(flash::unauthorized());
    }
    following_of(&ctx, id).await
}

#[utoipa::path(get, path = "/users/{id}/followers", tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, body = ConnectionsResponse), (status = 404, description = "Not found")))]
pub async fn show_followers(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<UserId>,
) -> Result<Response, StatusCode> {
    if auth.user().is_none() {
        return Ok(flash::unauthorized());
    }
    let store = ctx.store();
    let uc = ListFollowers {
        store: store.as_ref(),
    };
    match uc.execute(id).await.map_err(flash::internal)? {
        Some(dto) => Ok(Json(ConnectionsResponse::from(dto)).into_response()),
        None => Err(StatusCode::NOT_FOUND),
    }
}

#[utoipa::path(get, path = "/users/{id}/likes", tag = "Users",
    params(("id" = i32, Path, description = "User id")),
    responses((status = 200, body = LikesResponse), (status = 404, description = "Not found")))]
pub async fn show_likes(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<UserId>,
) -> Result<Response, StatusCode> {
    if auth.user().is_none() {
        return Ok(flash::unauthorized());
    }
    let store = ctx.store();
    let uc = ListLikes {
        store: store.as_ref(),
    };
    match uc.execute(id).await.map_err(flash::internal)? {
        Some(dto) => Ok(Json(LikesResponse::from(dto)).into_response()),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn following_of(ctx: &AppContext, id: UserId) -> Result<Response, StatusCode> {
    let store = ctx.store();
    let uc = ListFollowing {
        store: store.as_ref(),
    };
    match uc.execute(id).await.map_err(flash::internal)? {
        Some(dto) => Ok(Json(ConnectionsResponse::from(dto)).into_response()),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Follow another user, then answer with the caller's following list.
#[utoipa::path(post, path = "/users/follow/{id}", tag = "Users",
    params(("id" = i32, Path, description = "User to follow")),
    responses((status = 200, body = ConnectionsResponse), (status = 404, description = "Not found")))]
pub async fn add_follow(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<UserId>,
) -> Result<Response, StatusCode> {
    let Some(me) = auth.user_id() else {
        return Ok(flash::unauthorized());
    };
    let store = ctx.store();
    let uc = Follow {
        store: store.as_ref(),
    };
    match uc.execute(me, id).await {
        Ok(Some(_)) => following_of(&ctx, me).await,
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            if err
                .downcast_ref::<StoreError>()
                .is_some_and(StoreError::is_integrity)
            {
                return Ok(flash::danger(StatusCode::OK, "You cannot follow that user."));
            }
            Err(flash::internal(err))
        }
    }
}

#[utoipa::path(post, path = "/users/stop-following/{id}", tag = "Users",
    params(("id" = i32, Path, description = "User to stop following")),
    responses((status = 200, body = ConnectionsResponse), (status = 404, description = "Not found")))]
pub async fn stop_following(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<UserId>,
) -> Result<Response, StatusCode> {
    let Some(me) = auth.user_id() else {
        return Ok(flash::unauthorized());
    };
    let store = ctx.store();
    let uc = StopFollowing {
        store: store.as_ref(),
    };
    match uc.execute(me, id).await.map_err(flash::internal)? {
        Some(_) => following_of(&ctx, me).await,
        None => Err(StatusCode::NOT_FOUND),
    }
}

#[utoipa::path(get, path = "/users/profile", tag = "Users",
    responses((status = 200, body = UserResponse)))]
pub async fn show_profile(auth: AuthContext) -> Response {
    match auth.user() {
        Some(user) => Json(UserResponse::from(user.clone())).into_response(),
        None => flash::unauthorized(),
    }
}

#[utoipa::path(post, path = "/users/profile", tag = "Users", request_body = ProfileForm,
    responses(
        (status = 200, body = UserResponse),
        (status = 401, body = flash::FlashResponse),
        (status = 409, body = flash::FlashResponse),
        (status = 422, body = flash::FlashResponse)
    ))]
pub async fn update_profile(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(form): Json<ProfileForm>,
) -> Result<Response, StatusCode> {
    let Some(user) = auth.user() else {
        return Ok(flash::unauthorized());
    };
    let store = ctx.store();
    let hasher = ctx.hasher();
    let uc = UpdateProfile {
        store: store.as_ref(),
        hasher: hasher.as_ref(),
    };
    let req = UpdateProfileRequest {
        current_password: form.password,
        username: form.username,
        email: form.email,
        image_url: form.image_url,
        header_image_url: form.header_image_url,
        bio: form.bio,
        location: form.location,
    };
    match uc.execute(user, &req).await {
        Ok(ProfileUpdate::Updated(updated)) => Ok(Json(UserResponse::from(updated)).into_response()),
        Ok(ProfileUpdate::WrongPassword) => Ok(flash::danger(
            StatusCode::UNAUTHORIZED,
            "Wrong password, please try again.",
        )),
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
            Err(flash::internal(err))
        }
    }
}

#[utoipa::path(post, path = "/users/delete", tag = "Users",
    responses((status = 200, body = flash::FlashResponse)))]
pub async fn delete_user(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> Result<Response, StatusCode> {
    let Some(me) = auth.user_id() else {
        return Ok(flash::unauthorized());
    };
    let store = ctx.store();
    let uc = DeleteUser {
        store: store.as_ref(),
    };
    uc.execute(me).await.map_err(flash::internal)?;
    Ok((
        clear_cookie_headers(&ctx.cfg),
        flash::success(StatusCode::OK, "Your account has been deleted."),
    )
        .into_response())
}
