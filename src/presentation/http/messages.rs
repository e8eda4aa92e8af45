use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::messages::MessageWithAuthorDto;
use crate::application::ports::store::StoreError;
use crate::application::use_cases::messages::create_message::CreateMessage;
use crate::application::use_cases::messages::delete_message::{
    DeleteMessage, DeleteMessageOutcome,
};
use crate::application::use_cases::messages::get_message::GetMessage;
use crate::application::use_cases::messages::home_timeline::HomeTimeline;
use crate::application::use_cases::messages::toggle_like::{LikeOutcome, ToggleLike};
use crate::bootstrap::app_context::AppContext;
use crate::domain::messages::{MESSAGE_MAX_LEN, Message, MessageId};
use crate::domain::users::UserId;
use crate::presentation::http::auth::{AuthContext, UserResponse};
use crate::presentation::http::flash;
use crate::presentation::http::users::UserSummary;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: MessageId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        MessageResponse {
            id: m.id,
            text: m.text,
            timestamp: m.timestamp,
            user_id: m.user_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDetailResponse {
    pub message: MessageResponse,
    pub author: UserSummary,
    pub likes: u64,
}

impl From<MessageWithAuthorDto> for MessageDetailResponse {
    fn from(dto: MessageWithAuthorDto) -> Self {
        MessageDetailResponse {
            message: dto.message.into(),
            author: dto.author.into(),
            likes: dto.likes,
        }
    }
}

/// Landing page. Anonymous callers get `user: null` and no messages.
#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    pub user: Option<UserResponse>,
    pub messages: Vec<MessageDetailResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewMessageForm {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeResponse {
    pub message_id: MessageId,
    pub liked: bool,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/messages/new", post(create_message))
        .route("/messages/:id", get(show_message))
        .route("/messages/:id/delete", post(delete_message))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/", tag = "Messages",
    responses((status = 200, body = HomeResponse)))]
pub async fn home(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> Result<Json<HomeResponse>, StatusCode> {
    let Some(user) = auth.user() else {
        return Ok(Json(HomeResponse {
            user: None,
            messages: Vec::new(),
        }));
    };
    let store = ctx.store();
    let uc = HomeTimeline {
        store: store.as_ref(),
        limit: ctx.cfg.timeline_limit,
    };
    let messages = uc.execute(user.id).await.map_err(flash::internal)?;
    Ok(Json(HomeResponse {
        user: Some(user.clone().into()),
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(post, path = "/messages/new", tag = "Messages", request_body = NewMessageForm,
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, body = flash::FlashResponse)
    ))]
pub async fn create_message(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(form): Json<NewMessageForm>,
) -> Result<Response, StatusCode> {
    let Some(me) = auth.user_id() else {
        return Ok(flash::unauthorized());
    };
    let store = ctx.store();
    let uc = CreateMessage {
        store: store.as_ref(),
    };
    match uc.execute(me, &form.text).await {
        Ok(message) => Ok(Json(MessageResponse::from(message)).into_response()),
        Err(err) => {
            if err
                .downcast_ref::<StoreError>()
                .is_some_and(StoreError::is_data)
            {
                return Ok(flash::danger(
                    StatusCode::BAD_REQUEST,
                    format!("Messages are limited to {MESSAGE_MAX_LEN} characters."),
                ));
            }
            Err(flash::internal(err))
        }
    }
}

#[utoipa::path(get, path = "/messages/{id}", tag = "Messages",
    params(("id" = i32, Path, description = "Message id")),
    responses((status = 200, body = MessageDetailResponse), (status = 404, description = "Not found")))]
pub async fn show_message(
    State(ctx): State<AppContext>,
    Path(id): Path<MessageId>,
) -> Result<Json<MessageDetailResponse>, StatusCode> {
    let store = ctx.store();
    let uc = GetMessage {
        store: store.as_ref(),
    };
    match uc.execute(id).await.map_err(flash::internal)? {
        Some(dto) => Ok(Json(dto.into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

#[utoipa::path(post, path = "/messages/{id}/delete", tag = "Messages",
    params(("id" = i32, Path, description = "Message id")),
    responses((status = 200, body = flash::FlashResponse), (status = 404, description = "Not found")))]
pub async fn delete_message(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<MessageId>,
) -> Result<Response, StatusCode> {
    let Some(me) = auth.user_id() else {
        return Ok(flash::unauthorized());
    };
    let store = ctx.store();
    let uc = DeleteMessage {
        store: store.as_ref(),
    };
    match uc.execute(me, id).await.map_err(flash::internal)? {
        DeleteMessageOutcome::Deleted => {
            Ok(flash::success(StatusCode::OK, "Message deleted."))
        }
        DeleteMessageOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        DeleteMessageOutcome::NotOwner => Ok(flash::unauthorized()),
    }
}

/// Like a message, or unlike it when already liked.
#[utoipa::path(post, path = "/users/add_like/{message_id}", tag = "Messages",
    params(("message_id" = i32, Path, description = "Message id")),
    responses(
        (status = 200, body = LikeResponse),
        (status = 404, description = "Not found")
    ))]
pub async fn toggle_like(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(message_id): Path<MessageId>,
) -> Result<Response, StatusCode> {
    let Some(me) = auth.user_id() else {
        return Ok(flash::unauthorized());
    };
    let store = ctx.store();
    let uc = ToggleLike {
        store: store.as_ref(),
    };
    let liked = match uc.execute(me, message_id).await.map_err(flash::internal)? {
        LikeOutcome::Liked => true,
        LikeOutcome::Unliked => false,
        LikeOutcome::NotFound => return Err(StatusCode::NOT_FOUND),
        LikeOutcome::OwnMessage => {
            return Ok(flash::danger(
                StatusCode::OK,
                "You cannot like your own message.",
            ));
        }
    };
    Ok(Json(LikeResponse { message_id, liked }).into_response())
}
