//! Multi-currency cash-flow aggregation.
//!
//! Totals are never converted between currencies: every figure is reported
//! per currency. Initial balance transactions are not income/expense events
//! and are left out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, Statement, TransactionTrait, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, TransactionKind};

use super::{Actor, Engine, with_tx};

/// Income and expense totals of one currency over a period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowTotal {
    pub currency_id: Uuid,
    pub currency: String,
    pub income: Money,
    /// Positive sum of the expenses.
    pub expense: Money,
}

impl CashFlowTotal {
    /// Income minus expense, `None` if it does not fit in `i64`.
    #[must_use]
    pub fn net(&self) -> Option<Money> {
        self.income.checked_sub(self.expense)
    }
}

/// Total of one `(currency, category, kind)` group over a period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCashFlow {
    pub currency_id: Uuid,
    pub currency: String,
    pub category_id: Uuid,
    pub category: String,
    pub kind: TransactionKind,
    pub total: Money,
}

/// `WHERE` clause shared by both aggregations, with its bound values.
fn period_clause(
    owner_id: Uuid,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> ResultEngine<(String, Vec<Value>)> {
    if let (Some(from), Some(to)) = (from, to)
        && from >= to
    {
        return Err(EngineError::InvalidOperation(
            "invalid range: from must be < to".to_string(),
        ));
    }
    let mut clause = "t.owner_id = ? AND t.is_initial_balance = 0".to_string();
    let mut values: Vec<Value> = vec![owner_id.into()];
    if let Some(from) = from {
        clause.push_str(" AND t.created_on >= ?");
        values.push(from.into());
    }
    if let Some(to) = to {
        clause.push_str(" AND t.created_on < ?");
        values.push(to.into());
    }
    Ok((clause, values))
}

impl Engine {
    /// Income and expense totals of `owner_id` in `[from, to)`, grouped by
    /// currency.
    pub async fn cash_flow(
        &self,
        actor: Actor,
        owner_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ResultEngine<Vec<CashFlowTotal>> {
        actor.ensure_access(owner_id, "cash flow")?;
        let (clause, values) = period_clause(owner_id, from, to)?;

        with_tx!(self, |db_tx| {
            let backend = self.database.get_database_backend();
            let stmt = Statement::from_sql_and_values(
                backend,
                format!(
                    "SELECT a.currency_id AS currency_id, c.name AS currency, t.kind AS kind, \
                     COALESCE(SUM(t.amount_minor), 0) AS sum \
                     FROM transactions t \
                     JOIN accounts a ON a.id = t.account_id \
                     JOIN currencies c ON c.id = a.currency_id \
                     WHERE {clause} \
                     GROUP BY a.currency_id, c.name, t.kind \
                     ORDER BY c.name"
                ),
                values,
            );
            let rows = db_tx.query_all(stmt).await?;

            let mut totals: BTreeMap<(String, Uuid), CashFlowTotal> = BTreeMap::new();
            for row in rows {
                let currency_id: Uuid = row.try_get("", "currency_id")?;
                let currency: String = row.try_get("", "currency")?;
                let kind: String = row.try_get("", "kind")?;
                let sum: i64 = row.try_get("", "sum")?;

                let entry = totals
                    .entry((currency.clone(), currency_id))
                    .or_insert_with(|| CashFlowTotal {
                        currency_id,
                        currency,
                        income: Money::ZERO,
                        expense: Money::ZERO,
                    });
                match TransactionKind::try_from(kind.as_str())? {
                    TransactionKind::Income => entry.income = Money::new(sum),
                    TransactionKind::Expense => entry.expense = Money::new(sum),
                }
            }
            Ok(totals.into_values().collect())
        })
    }

    /// Totals of `owner_id` in `[from, to)`, grouped by currency, category and
    /// kind.
    pub async fn cash_flow_by_category(
        &self,
        actor: Actor,
        owner_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ResultEngine<Vec<CategoryCashFlow>> {
        actor.ensure_access(owner_id, "cash flow")?;
        let (clause, values) = period_clause(owner_id, from, to)?;

        with_tx!(self, |db_tx| {
            let backend = self.database.get_database_backend();
            let stmt = Statement::from_sql_and_values(
                backend,
                format!(
                    "SELECT a.currency_id AS currency_id, c.name AS currency, \
                     t.category_id AS category_id, k.name AS category, t.kind AS kind, \
                     COALESCE(SUM(t.amount_minor), 0) AS sum \
                     FROM transactions t \
                     JOIN accounts a ON a.id = t.account_id \
                     JOIN currencies c ON c.id = a.currency_id \
                     JOIN categories k ON k.id = t.category_id \
                     WHERE {clause} \
                     GROUP BY a.currency_id, c.name, t.category_id, k.name, t.kind \
                     ORDER BY c.name, t.kind, k.name"
                ),
                values,
            );
            let rows = db_tx.query_all(stmt).await?;

            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let kind: String = row.try_get("", "kind")?;
                out.push(CategoryCashFlow {
                    currency_id: row.try_get("", "currency_id")?,
                    currency: row.try_get("", "currency")?,
                    category_id: row.try_get("", "category_id")?,
                    category: row.try_get("", "category")?,
                    kind: TransactionKind::try_from(kind.as_str())?,
                    total: Money::new(row.try_get("", "sum")?),
                });
            }
            Ok(out)
        })
    }
}
