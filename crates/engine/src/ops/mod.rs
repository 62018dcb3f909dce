use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{DEFAULT_CACHE_TTL, ReferenceCache, ResultEngine};

mod access;
mod accounts;
mod balances;
mod cash_flow;
mod dropdowns;
mod messages;
mod reference;
mod transactions;
mod users;

pub use access::Actor;
pub use cash_flow::{CashFlowTotal, CategoryCashFlow};
pub use transactions::{TransactionListFilter, TransactionPage};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    cache: ReferenceCache,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The dropdown cache shared by every request.
    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    cache_ttl: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Lifetime of cached dropdown lists (defaults to 3 days).
    pub fn cache_ttl(mut self, ttl: Duration) -> EngineBuilder {
        self.cache_ttl = ttl;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            cache: ReferenceCache::new(self.cache_ttl),
        })
    }
}
