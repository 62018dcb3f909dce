//! Transaction writes and listings.
//!
//! Every write keeps the account balance in sync inside the same DB
//! transaction: the original signed amount is reversed before the new one is
//! applied. Initial balance transactions are managed by the accounts service
//! and rejected here with [`EngineError::InitialBalanceLocked`].
//!
//! [`EngineError::InitialBalanceLocked`]: crate::EngineError::InitialBalanceLocked

mod list;
mod write;

pub use list::{TransactionListFilter, TransactionPage};
