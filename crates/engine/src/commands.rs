//! Command structs for engine operations.
//!
//! These types group parameters for account and transaction writes, keeping
//! call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Money, TransactionKind};

/// Create an income or expense transaction.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub kind: TransactionKind,
    /// Must be `> 0`, the sign comes from `kind`.
    pub amount: Money,
    pub created_on: DateTime<Utc>,
    pub reference: Option<String>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        account_id: Uuid,
        category_id: Uuid,
        kind: TransactionKind,
        amount: Money,
        created_on: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            category_id,
            kind,
            amount,
            created_on,
            reference: None,
        }
    }

    #[must_use]
    pub fn income(account_id: Uuid, category_id: Uuid, amount: Money) -> Self {
        Self::new(
            account_id,
            category_id,
            TransactionKind::Income,
            amount,
            Utc::now(),
        )
    }

    #[must_use]
    pub fn expense(account_id: Uuid, category_id: Uuid, amount: Money) -> Self {
        Self::new(
            account_id,
            category_id,
            TransactionKind::Expense,
            amount,
            Utc::now(),
        )
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn created_on(mut self, created_on: DateTime<Utc>) -> Self {
        self.created_on = created_on;
        self
    }
}

/// Update an existing transaction.
///
/// Fields set to `None` are left untouched. `reference = Some("")` clears the
/// reference.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub transaction_id: Uuid,
    /// Moves the transaction to another account of the same owner.
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    pub created_on: Option<DateTime<Utc>>,
    pub reference: Option<String>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid) -> Self {
        Self {
            transaction_id,
            account_id: None,
            category_id: None,
            kind: None,
            amount: None,
            created_on: None,
            reference: None,
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn created_on(mut self, created_on: DateTime<Utc>) -> Self {
        self.created_on = Some(created_on);
        self
    }

    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Open a new account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub owner_id: Uuid,
    pub name: String,
    pub account_type_id: Uuid,
    pub currency_id: Uuid,
    /// Signed opening balance, booked as the initial balance transaction.
    pub initial_balance: Money,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(
        owner_id: Uuid,
        name: impl Into<String>,
        account_type_id: Uuid,
        currency_id: Uuid,
    ) -> Self {
        Self {
            owner_id,
            name: name.into(),
            account_type_id,
            currency_id,
            initial_balance: Money::ZERO,
        }
    }

    #[must_use]
    pub fn initial_balance(mut self, initial_balance: Money) -> Self {
        self.initial_balance = initial_balance;
        self
    }
}

/// Update an account. Fields set to `None` are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub account_id: Uuid,
    pub name: Option<String>,
    pub account_type_id: Option<Uuid>,
    pub currency_id: Option<Uuid>,
    /// New signed opening balance; zero removes the initial balance
    /// transaction.
    pub initial_balance: Option<Money>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(account_id: Uuid) -> Self {
        Self {
            account_id,
            name: None,
            account_type_id: None,
            currency_id: None,
            initial_balance: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn account_type_id(mut self, account_type_id: Uuid) -> Self {
        self.account_type_id = Some(account_type_id);
        self
    }

    #[must_use]
    pub fn currency_id(mut self, currency_id: Uuid) -> Self {
        self.currency_id = Some(currency_id);
        self
    }

    #[must_use]
    pub fn initial_balance(mut self, initial_balance: Money) -> Self {
        self.initial_balance = Some(initial_balance);
        self
    }
}
