use std::collections::{HashMap, HashSet};

use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionDetail, TransactionKind, accounts,
    categories, currencies, transactions,
};

use super::super::{Actor, Engine, with_tx};

/// Largest page returned by [`Engine::list_transactions`].
const MAX_PAGE_SIZE: u64 = 200;

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub account_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<Uuid>,
}

/// One page of transactions, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub items: Vec<TransactionDetail>,
    /// Opaque cursor of the next (older) page, `None` on the last page.
    pub next_cursor: Option<String>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidOperation(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(account_id) = filter.account_id {
            self = self.filter(transactions::Column::AccountId.eq(account_id));
        }
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::CreatedOn.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::CreatedOn.lt(to));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id));
        }
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    created_on: DateTime<Utc>,
    transaction_id: Uuid,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Returns a transaction with its account, category and currency names.
    pub async fn transaction(
        &self,
        actor: Actor,
        transaction_id: Uuid,
    ) -> ResultEngine<TransactionDetail> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, actor, transaction_id)
                .await?;
            let mut details = self.transaction_details(&db_tx, vec![model]).await?;
            details
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
        })
    }

    /// Lists the transactions of `owner_id`, with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(created_on DESC, id DESC)`.
    pub async fn list_transactions(
        &self,
        actor: Actor,
        owner_id: Uuid,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<TransactionPage> {
        actor.ensure_access(owner_id, "transactions")?;
        validate_list_filter(filter)?;
        let limit = limit.clamp(1, MAX_PAGE_SIZE);

        with_tx!(self, |db_tx| {
            if let Some(account_id) = filter.account_id {
                let account = self.require_account(&db_tx, actor, account_id).await?;
                if account.owner_id != owner_id {
                    return Err(EngineError::KeyNotFound("account not exists".to_string()));
                }
            }

            let mut query = transactions::Entity::find()
                .filter(transactions::Column::OwnerId.eq(owner_id))
                .order_by_desc(transactions::Column::CreatedOn)
                .order_by_desc(transactions::Column::Id)
                .limit(limit.saturating_add(1));

            if let Some(cursor) = cursor {
                let cursor = TransactionsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::CreatedOn.lt(cursor.created_on))
                        .add(
                            Condition::all()
                                .add(transactions::Column::CreatedOn.eq(cursor.created_on))
                                .add(transactions::Column::Id.lt(cursor.transaction_id)),
                        ),
                );
            }
            query = query.apply_tx_filters(filter);

            let mut rows: Vec<transactions::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;
            rows.truncate(limit as usize);

            let next_cursor = if has_more {
                rows.last()
                    .map(|model| TransactionsCursor {
                        created_on: model.created_on,
                        transaction_id: model.id,
                    })
                    .map(|c| c.encode())
                    .transpose()?
            } else {
                None
            };

            let items = self.transaction_details(&db_tx, rows).await?;
            Ok(TransactionPage { items, next_cursor })
        })
    }

    /// Resolves the display names of a batch of transactions with one query
    /// per referenced table.
    async fn transaction_details(
        &self,
        db: &DatabaseTransaction,
        models: Vec<transactions::Model>,
    ) -> ResultEngine<Vec<TransactionDetail>> {
        let account_ids: HashSet<Uuid> = models.iter().map(|m| m.account_id).collect();
        let category_ids: HashSet<Uuid> = models.iter().map(|m| m.category_id).collect();

        let accounts: HashMap<Uuid, accounts::Model> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let currency_ids: HashSet<Uuid> = accounts.values().map(|m| m.currency_id).collect();
        let currencies: HashMap<Uuid, String> = currencies::Entity::find()
            .filter(currencies::Column::Id.is_in(currency_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();
        let categories: HashMap<Uuid, String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let transaction = Transaction::try_from(model)?;
            let account = accounts
                .get(&transaction.account_id)
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
            let currency = currencies
                .get(&account.currency_id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound("currency not exists".to_string()))?;
            let category = categories
                .get(&transaction.category_id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
            out.push(TransactionDetail {
                account: account.name.clone(),
                category,
                currency,
                transaction,
            });
        }
        Ok(out)
    }
}
