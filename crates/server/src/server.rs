use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{accounts, cash_flow, messages, reference, transactions, users};
use engine::{Engine, ReferenceKind};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the basic-auth credentials to an [`engine::Actor`] and stores it
/// in the request extensions.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let actor = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await
        .map_err(|err| {
            tracing::error!("failed to authenticate: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let router = Router::new()
        .route("/api/accounts", get(accounts::list).post(accounts::create))
        .route("/api/accounts/dropdown", get(reference::account_dropdown))
        .route("/api/accounts/balances", get(accounts::balances))
        .route(
            "/api/accounts/{id}",
            get(accounts::get)
                .patch(accounts::update)
                .delete(accounts::delete),
        )
        .route("/api/accounts/{id}/recompute", post(accounts::recompute))
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/transactions/cashflow", get(cash_flow::totals))
        .route(
            "/api/transactions/cashflow/categories",
            get(cash_flow::by_category),
        )
        .route(
            "/api/transactions/{id}",
            get(transactions::get)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route("/api/users", get(users::list))
        .route("/api/users/me", get(users::me))
        .route("/api/users/{id}", get(users::get))
        .route("/api/users/{id}/role", put(users::set_role))
        .route("/api/messages", get(messages::list).post(messages::send))
        .route("/api/messages/unseen", get(messages::unseen))
        .route("/api/messages/{id}", get(messages::get))
        .route("/api/messages/{id}/replies", post(messages::reply))
        .route("/api/messages/{id}/seen", post(messages::seen));

    [
        ("/api/accounttypes", ReferenceKind::AccountTypes),
        ("/api/currencies", ReferenceKind::Currencies),
        ("/api/categories", ReferenceKind::Categories),
    ]
    .into_iter()
    .fold(router, |router, (path, kind)| {
        reference::routes(router, path, kind)
    })
    .route_layer(middleware::from_fn_with_state(state.clone(), auth))
    .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
