//! Ledgerly engine: accounts, transactions and the reference data around them.
//!
//! Every write goes through [`Engine`], runs inside one database transaction
//! and keeps `accounts.balance_minor` equal to the signed sum of the account's
//! transactions.

pub use accounts::{Account, AccountDetail, CurrencyBalance};
pub use cache::{DEFAULT_CACHE_TTL, ReferenceCache, ReferenceItem, ReferenceKind};
pub use commands::{NewAccountCmd, NewTransactionCmd, UpdateAccountCmd, UpdateTransactionCmd};
pub use error::EngineError;
pub use messages::{Message, Reply, Thread};
pub use money::Money;
pub use ops::{
    Actor, CashFlowTotal, CategoryCashFlow, Engine, EngineBuilder, TransactionListFilter,
    TransactionPage,
};
pub use status::{EntityStatus, Removal};
pub use transactions::{Transaction, TransactionDetail, TransactionKind};
pub use users::{Role, User, UserSummary};

mod account_types;
mod accounts;
mod cache;
mod categories;
mod commands;
mod currencies;
mod error;
mod message_replies;
mod messages;
mod money;
mod ops;
mod status;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
