//! Dropdown endpoints for account types, currencies, categories and accounts.

use api_types::{
    Deleted,
    reference::{DropdownQuery, ReferenceNew, ReferenceRename},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use engine::{Actor, ReferenceItem, ReferenceKind, Removal};
use uuid::Uuid;

use crate::{ServerError, deleted, server::ServerState};

/// Adds `GET`/`POST path` and `PATCH`/`DELETE path/{id}` for one reference kind.
pub fn routes(
    router: Router<ServerState>,
    path: &str,
    kind: ReferenceKind,
) -> Router<ServerState> {
    router
        .route(
            path,
            get(
                move |actor: Extension<Actor>,
                      state: State<ServerState>,
                      query: Query<DropdownQuery>| dropdown(kind, actor, state, query),
            )
            .post(
                move |actor: Extension<Actor>,
                      state: State<ServerState>,
                      payload: Json<ReferenceNew>| create(kind, actor, state, payload),
            ),
        )
        .route(
            &format!("{path}/{{id}}"),
            patch(
                move |actor: Extension<Actor>,
                      state: State<ServerState>,
                      id: Path<Uuid>,
                      payload: Json<ReferenceRename>| {
                    rename(kind, actor, state, id, payload)
                },
            )
            .delete(
                move |actor: Extension<Actor>, state: State<ServerState>, id: Path<Uuid>| {
                    delete(kind, actor, state, id)
                },
            ),
        )
}

pub async fn account_dropdown(
    actor: Extension<Actor>,
    state: State<ServerState>,
    query: Query<DropdownQuery>,
) -> Result<Json<Vec<ReferenceItem>>, ServerError> {
    dropdown(ReferenceKind::Accounts, actor, state, query).await
}

async fn dropdown(
    kind: ReferenceKind,
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<DropdownQuery>,
) -> Result<Json<Vec<ReferenceItem>>, ServerError> {
    let owner_id = query.owner_id.unwrap_or(actor.user_id);
    let items = state
        .engine
        .dropdown(actor, kind, owner_id, query.include_deleted.unwrap_or(false))
        .await?;
    Ok(Json(items))
}

async fn create(
    kind: ReferenceKind,
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<ReferenceNew>,
) -> Result<(StatusCode, Json<ReferenceItem>), ServerError> {
    let owner_id = payload.owner_id.unwrap_or(actor.user_id);
    let engine = &state.engine;
    let item = match kind {
        ReferenceKind::AccountTypes => {
            engine
                .create_account_type(actor, owner_id, &payload.name)
                .await?
        }
        ReferenceKind::Currencies => engine.create_currency(actor, owner_id, &payload.name).await?,
        ReferenceKind::Categories => engine.create_category(actor, owner_id, &payload.name).await?,
        ReferenceKind::Accounts => return Err(accounts_elsewhere()),
    };
    Ok((StatusCode::CREATED, Json(item)))
}

async fn rename(
    kind: ReferenceKind,
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReferenceRename>,
) -> Result<Json<ReferenceItem>, ServerError> {
    let engine = &state.engine;
    let item = match kind {
        ReferenceKind::AccountTypes => engine.rename_account_type(actor, id, &payload.name).await?,
        ReferenceKind::Currencies => engine.rename_currency(actor, id, &payload.name).await?,
        ReferenceKind::Categories => engine.rename_category(actor, id, &payload.name).await?,
        ReferenceKind::Accounts => return Err(accounts_elsewhere()),
    };
    Ok(Json(item))
}

async fn delete(
    kind: ReferenceKind,
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ServerError> {
    let engine = &state.engine;
    let removal: Removal = match kind {
        ReferenceKind::AccountTypes => engine.delete_account_type(actor, id).await?,
        ReferenceKind::Currencies => engine.delete_currency(actor, id).await?,
        ReferenceKind::Categories => engine.delete_category(actor, id).await?,
        ReferenceKind::Accounts => return Err(accounts_elsewhere()),
    };
    Ok(deleted(removal))
}

fn accounts_elsewhere() -> ServerError {
    ServerError::Generic("accounts are managed under /api/accounts".to_string())
}
