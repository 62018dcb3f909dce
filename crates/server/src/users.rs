use api_types::user::{Role as ApiRole, RoleUpdate};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{Actor, Role, User, UserSummary};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Every user with their account and transaction counts. Admin only.
pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserSummary>>, ServerError> {
    Ok(Json(state.engine.list_users(actor).await?))
}

pub async fn me(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Result<Json<User>, ServerError> {
    Ok(Json(state.engine.user(actor, actor.user_id).await?))
}

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ServerError> {
    Ok(Json(state.engine.user(actor, user_id).await?))
}

pub async fn set_role(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleUpdate>,
) -> Result<Json<User>, ServerError> {
    let role = match payload.role {
        ApiRole::User => Role::User,
        ApiRole::Admin => Role::Admin,
    };
    Ok(Json(state.engine.set_user_role(actor, user_id, role).await?))
}
