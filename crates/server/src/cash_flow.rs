use api_types::cash_flow::CashFlowQuery;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Utc;
use engine::{Actor, CashFlowTotal, CategoryCashFlow};

use crate::{ServerError, server::ServerState};

pub async fn totals(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<CashFlowQuery>,
) -> Result<Json<Vec<CashFlowTotal>>, ServerError> {
    let owner_id = query.owner_id.unwrap_or(actor.user_id);
    let totals = state
        .engine
        .cash_flow(
            actor,
            owner_id,
            query.from.map(|from| from.with_timezone(&Utc)),
            query.to.map(|to| to.with_timezone(&Utc)),
        )
        .await?;
    Ok(Json(totals))
}

pub async fn by_category(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    Query(query): Query<CashFlowQuery>,
) -> Result<Json<Vec<CategoryCashFlow>>, ServerError> {
    let owner_id = query.owner_id.unwrap_or(actor.user_id);
    let totals = state
        .engine
        .cash_flow_by_category(
            actor,
            owner_id,
            query.from.map(|from| from.with_timezone(&Utc)),
            query.to.map(|to| to.with_timezone(&Utc)),
        )
        .await?;
    Ok(Json(totals))
}
