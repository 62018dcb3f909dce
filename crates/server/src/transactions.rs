//! Transactions API endpoints.

use api_types::transaction::{
    TransactionDeleted, TransactionKind as ApiKind, TransactionList, TransactionNew,
    TransactionUpdate,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    Actor, Money, NewTransactionCmd, Transaction, TransactionDetail, TransactionKind,
    TransactionListFilter, TransactionPage, UpdateTransactionCmd,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

const DEFAULT_PAGE_SIZE: u64 = 50;

fn engine_kind(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Income => TransactionKind::Income,
        ApiKind::Expense => TransactionKind::Expense,
    }
}

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<TransactionPage>, ServerError> {
    let owner_id = query.owner_id.unwrap_or(actor.user_id);
    let filter = TransactionListFilter {
        account_id: query.account_id,
        from: query.from.map(|from| from.with_timezone(&Utc)),
        to: query.to.map(|to| to.with_timezone(&Utc)),
        kind: query.kind.map(engine_kind),
        category_id: query.category_id,
    };

    let page = state
        .engine
        .list_transactions(
            actor,
            owner_id,
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            query.cursor.as_deref(),
            &filter,
        )
        .await?;
    Ok(Json(page))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<Transaction>), ServerError> {
    let created_on = payload
        .created_on
        .map_or_else(Utc::now, |created_on| created_on.with_timezone(&Utc));
    let mut cmd = NewTransactionCmd::new(
        payload.account_id,
        payload.category_id,
        engine_kind(payload.kind),
        Money::new(payload.amount_minor),
        created_on,
    );
    if let Some(reference) = payload.reference {
        cmd = cmd.reference(reference);
    }

    let tx = state.engine.create_transaction(actor, cmd).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionDetail>, ServerError> {
    Ok(Json(state.engine.transaction(actor, transaction_id).await?))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, ServerError> {
    let mut cmd = UpdateTransactionCmd::new(transaction_id);
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(engine_kind(kind));
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount(Money::new(amount_minor));
    }
    if let Some(created_on) = payload.created_on {
        cmd = cmd.created_on(created_on.with_timezone(&Utc));
    }
    if let Some(reference) = payload.reference {
        cmd = cmd.reference(reference);
    }

    Ok(Json(state.engine.update_transaction(actor, cmd).await?))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<TransactionDeleted>, ServerError> {
    let balance = state
        .engine
        .delete_transaction(actor, transaction_id)
        .await?;
    Ok(Json(TransactionDeleted {
        balance_minor: balance.minor(),
    }))
}
