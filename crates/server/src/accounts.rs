//! Accounts API endpoints.

use api_types::{
    Deleted, OwnerQuery,
    account::{AccountBalance, AccountList, AccountNew, AccountUpdate},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    Account, AccountDetail, Actor, CurrencyBalance, Money, NewAccountCmd, UpdateAccountCmd,
};
use uuid::Uuid;

use crate::{ServerError, deleted, server::ServerState};

pub async fn list(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<AccountList>,
) -> Result<Json<Vec<AccountDetail>>, ServerError> {
    let owner_id = query.owner_id.unwrap_or(actor.user_id);
    let accounts = state
        .engine
        .list_accounts(actor, owner_id, query.include_deleted.unwrap_or(false))
        .await?;
    Ok(Json(accounts))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<Account>), ServerError> {
    let owner_id = payload.owner_id.unwrap_or(actor.user_id);
    let cmd = NewAccountCmd::new(
        owner_id,
        payload.name,
        payload.account_type_id,
        payload.currency_id,
    )
    .initial_balance(Money::new(payload.initial_balance_minor.unwrap_or(0)));

    let account = state.engine.create_account(actor, cmd).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn get(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountDetail>, ServerError> {
    Ok(Json(state.engine.account(actor, account_id).await?))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<Account>, ServerError> {
    if payload.name.is_none()
        && payload.account_type_id.is_none()
        && payload.currency_id.is_none()
        && payload.initial_balance_minor.is_none()
    {
        return Err(ServerError::Generic(
            "provide at least one of name, account_type_id, currency_id or initial_balance_minor"
                .to_string(),
        ));
    }

    let mut cmd = UpdateAccountCmd::new(account_id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(account_type_id) = payload.account_type_id {
        cmd = cmd.account_type_id(account_type_id);
    }
    if let Some(currency_id) = payload.currency_id {
        cmd = cmd.currency_id(currency_id);
    }
    if let Some(initial_balance) = payload.initial_balance_minor {
        cmd = cmd.initial_balance(Money::new(initial_balance));
    }

    Ok(Json(state.engine.update_account(actor, cmd).await?))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Deleted>, ServerError> {
    let removal = state.engine.delete_account(actor, account_id).await?;
    Ok(deleted(removal))
}

pub async fn balances(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<CurrencyBalance>>, ServerError> {
    let owner_id = query.owner_id.unwrap_or(actor.user_id);
    Ok(Json(state.engine.balances_by_currency(actor, owner_id).await?))
}

pub async fn recompute(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<AccountBalance>, ServerError> {
    let balance = state
        .engine
        .recompute_account_balance(actor, account_id)
        .await?;
    Ok(Json(AccountBalance {
        account_id,
        balance_minor: balance.minor(),
    }))
}
