//! Request and response bodies of the Ledgerly JSON API.
//!
//! Amounts travel as signed integer minor units (`*_minor`), timestamps as
//! RFC3339 strings with an offset. Entity responses are serialized from the
//! engine types directly and are not repeated here.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of deleting an account or a reference entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The row was unused and is gone.
    Removed,
    /// The row is still referenced and was soft-deleted.
    Archived,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Deleted {
    pub outcome: DeleteOutcome,
}

/// Query string selecting whose data to read; defaults to the caller.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Option<Uuid>,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub account_type_id: Uuid,
        pub currency_id: Uuid,
        /// Defaults to the authenticated user. Only admins may set another
        /// owner.
        pub owner_id: Option<Uuid>,
        /// Signed opening balance; absent or zero means no initial balance.
        pub initial_balance_minor: Option<i64>,
    }

    /// Partial update; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub account_type_id: Option<Uuid>,
        pub currency_id: Option<Uuid>,
        pub initial_balance_minor: Option<i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountList {
        pub owner_id: Option<Uuid>,
        pub include_deleted: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountBalance {
        pub account_id: Uuid,
        pub balance_minor: i64,
    }
}

pub mod reference {
    use super::*;

    /// Body for creating an account type, currency or category.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReferenceNew {
        pub name: String,
        pub owner_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReferenceRename {
        pub name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DropdownQuery {
        pub owner_id: Option<Uuid>,
        /// Also list soft-deleted entries still in use.
        pub include_deleted: Option<bool>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub category_id: Uuid,
        pub kind: TransactionKind,
        /// Must be > 0. The kind defines the sign.
        pub amount_minor: i64,
        /// RFC3339 timestamp; the server uses now() when absent.
        pub created_on: Option<DateTime<FixedOffset>>,
        pub reference: Option<String>,
    }

    /// Partial update; `reference: ""` clears the reference.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub amount_minor: Option<i64>,
        pub created_on: Option<DateTime<FixedOffset>>,
        pub reference: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub owner_id: Option<Uuid>,
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        /// Inclusive lower bound.
        pub from: Option<DateTime<FixedOffset>>,
        /// Exclusive upper bound.
        pub to: Option<DateTime<FixedOffset>>,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionDeleted {
        /// Balance of the account the transaction belonged to.
        pub balance_minor: i64,
    }
}

pub mod cash_flow {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CashFlowQuery {
        pub owner_id: Option<Uuid>,
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        User,
        Admin,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleUpdate {
        pub role: Role,
    }
}

pub mod message {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageNew {
        pub subject: String,
        pub body: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReplyNew {
        pub body: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnseenCount {
        pub unseen: u64,
    }
}
