use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, Transaction, accounts, transactions};

use super::{Actor, Engine, with_tx};

impl Engine {
    /// Adds `delta` to the stored balance of `account_id` and returns the new
    /// balance.
    ///
    /// The increment is done by the database, so concurrent writers on the
    /// same account never overwrite each other's delta.
    pub(super) async fn apply_balance_delta(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        delta: Money,
    ) -> ResultEngine<Money> {
        let model = accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        if delta.is_zero() {
            return Ok(Money::new(model.balance_minor));
        }
        // SQLite promotes an overflowing integer sum to REAL.
        Money::new(model.balance_minor)
            .checked_add(delta)
            .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;
        accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(delta.minor()),
            )
            .filter(accounts::Column::Id.eq(account_id))
            .exec(db)
            .await?;
        let model = accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Ok(Money::new(model.balance_minor))
    }

    /// Signed sum of every transaction of an account.
    pub(super) async fn ledger_balance(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultEngine<Money> {
        let models: Vec<transactions::Model> = transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .all(db)
            .await?;
        let mut total = Money::ZERO;
        for model in models {
            let tx = Transaction::try_from(model)?;
            total = total.checked_add(tx.signed_amount()).ok_or_else(|| {
                EngineError::InvalidAmount("balance overflow".to_string())
            })?;
        }
        Ok(total)
    }

    /// Recomputes the stored balance of an account from its transactions and
    /// persists it.
    ///
    /// Returns the recomputed balance. A drift from the stored value is
    /// logged before being repaired.
    pub async fn recompute_account_balance(
        &self,
        actor: Actor,
        account_id: Uuid,
    ) -> ResultEngine<Money> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, actor, account_id).await?;
            let balance = self.ledger_balance(&db_tx, account_id).await?;
            if balance.minor() != model.balance_minor {
                tracing::warn!(
                    %account_id,
                    stored = model.balance_minor,
                    recomputed = balance.minor(),
                    "account balance drift repaired"
                );
                let active = accounts::ActiveModel {
                    id: ActiveValue::Set(account_id),
                    balance_minor: ActiveValue::Set(balance.minor()),
                    ..Default::default()
                };
                active.update(&db_tx).await?;
            }
            Ok(balance)
        })
    }
}
