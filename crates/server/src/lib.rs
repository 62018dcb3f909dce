use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Removal};

use serde::Serialize;
pub use server::{ServerState, router, run_with_listener};

mod accounts;
mod cash_flow;
mod messages;
mod reference;
mod server;
mod transactions;
mod users;

pub mod types {
    pub use api_types::{DeleteOutcome, Deleted, OwnerQuery};

    pub mod account {
        pub use api_types::account::{AccountBalance, AccountList, AccountNew, AccountUpdate};
        pub use engine::{Account, AccountDetail, CurrencyBalance};
    }

    pub mod reference {
        pub use api_types::reference::{DropdownQuery, ReferenceNew, ReferenceRename};
        pub use engine::{ReferenceItem, ReferenceKind};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionDeleted, TransactionKind, TransactionList, TransactionNew,
            TransactionUpdate,
        };
        pub use engine::{Transaction, TransactionDetail, TransactionPage};
    }

    pub mod cash_flow {
        pub use api_types::cash_flow::CashFlowQuery;
        pub use engine::{CashFlowTotal, CategoryCashFlow};
    }

    pub mod user {
        pub use api_types::user::{Role, RoleUpdate};
        pub use engine::{User, UserSummary};
    }

    pub mod message {
        pub use api_types::message::{MessageNew, ReplyNew, UnseenCount};
        pub use engine::{Message, Reply, Thread};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::KeyNotFound(_)
        | EngineError::ExistingKey(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidOperation(_)
        | EngineError::InitialBalanceLocked
        | EngineError::InvalidCursor(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

pub(crate) fn deleted(removal: Removal) -> Json<types::Deleted> {
    let outcome = match removal {
        Removal::Removed => types::DeleteOutcome::Removed,
        Removal::Archived => types::DeleteOutcome::Archived,
    };
    Json(types::Deleted { outcome })
}
