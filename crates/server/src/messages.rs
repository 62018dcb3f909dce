//! Messaging between users and administrators.

use api_types::message::{MessageNew, ReplyNew, UnseenCount};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Actor, Message, Reply, Thread};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<Message>>, ServerError> {
    Ok(Json(state.engine.list_messages(actor).await?))
}

pub async fn send(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<MessageNew>,
) -> Result<(StatusCode, Json<Message>), ServerError> {
    let message = state
        .engine
        .send_message(actor, &payload.subject, &payload.body)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn unseen(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<UnseenCount>, ServerError> {
    let unseen = state.engine.unseen_count(actor).await?;
    Ok(Json(UnseenCount { unseen }))
}

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Thread>, ServerError> {
    Ok(Json(state.engine.message(actor, message_id).await?))
}

pub async fn reply(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(message_id): Path<Uuid>,
    Json(payload): Json<ReplyNew>,
) -> Result<(StatusCode, Json<Reply>), ServerError> {
    let reply = state
        .engine
        .reply(actor, message_id, &payload.body)
        .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn seen(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(message_id): Path<Uuid>,
) -> Result<Json<Message>, ServerError> {
    Ok(Json(state.engine.mark_seen(actor, message_id).await?))
}
