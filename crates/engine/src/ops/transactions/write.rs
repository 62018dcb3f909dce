use sea_orm::{ActiveModelTrait, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    EngineError, Money, NewTransactionCmd, ReferenceKind, ResultEngine, Transaction,
    UpdateTransactionCmd, transactions,
    util::{apply_optional_text_patch, normalize_optional_text},
};

use super::super::{Actor, Engine, with_tx};

impl Engine {
    /// Records an income or expense and adds its signed amount to the account
    /// balance.
    ///
    /// The account must be active, the category must belong to the account
    /// owner, be active and not reserved.
    pub async fn create_transaction(
        &self,
        actor: Actor,
        cmd: NewTransactionCmd,
    ) -> ResultEngine<Transaction> {
        let reference = normalize_optional_text(cmd.reference.as_deref());
        let tx = with_tx!(self, |db_tx| {
            let account = self
                .require_active_account(&db_tx, actor, cmd.account_id)
                .await?;
            self.require_usable_category(&db_tx, account.owner_id, cmd.category_id)
                .await?;

            let tx = Transaction::new(
                account.id,
                account.owner_id,
                cmd.category_id,
                cmd.kind,
                cmd.amount,
                cmd.created_on,
                reference,
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            let balance = self
                .apply_balance_delta(&db_tx, account.id, tx.signed_amount())
                .await?;
            tracing::debug!(
                transaction_id = %tx.id,
                account_id = %account.id,
                balance = balance.minor(),
                "transaction created"
            );
            Ok(tx)
        })?;
        self.invalidate_after_transaction_write(tx.owner_id).await;
        Ok(tx)
    }

    /// Edits a transaction, possibly moving it to another account of the same
    /// owner.
    ///
    /// The original signed amount is reversed on the original account, then
    /// the new signed amount is applied on the (possibly different) new one.
    pub async fn update_transaction(
        &self,
        actor: Actor,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, actor, cmd.transaction_id)
                .await?;
            if model.is_initial_balance {
                return Err(EngineError::InitialBalanceLocked);
            }
            let mut tx = Transaction::try_from(model)?;
            let old_account_id = tx.account_id;
            let old_signed = tx.signed_amount();

            self.require_active_account(&db_tx, actor, old_account_id)
                .await?;
            if let Some(account_id) = cmd.account_id
                && account_id != old_account_id
            {
                let target = self
                    .require_active_account(&db_tx, actor, account_id)
                    .await?;
                if target.owner_id != tx.owner_id {
                    return Err(EngineError::Forbidden(
                        "cannot move a transaction to another user's account".to_string(),
                    ));
                }
                tx.account_id = account_id;
            }
            if let Some(category_id) = cmd.category_id {
                self.require_usable_category(&db_tx, tx.owner_id, category_id)
                    .await?;
                tx.category_id = category_id;
            }
            if let Some(kind) = cmd.kind {
                tx.kind = kind;
            }
            if let Some(amount) = cmd.amount {
                if !amount.is_positive() {
                    return Err(EngineError::InvalidAmount(
                        "amount must be > 0".to_string(),
                    ));
                }
                tx.amount = amount;
            }
            if let Some(created_on) = cmd.created_on {
                tx.created_on = created_on;
            }
            tx.reference = apply_optional_text_patch(tx.reference, cmd.reference.as_deref());

            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            self.apply_balance_delta(&db_tx, old_account_id, -old_signed)
                .await?;
            self.apply_balance_delta(&db_tx, tx.account_id, tx.signed_amount())
                .await?;
            Ok(tx)
        })?;
        self.invalidate_after_transaction_write(tx.owner_id).await;
        Ok(tx)
    }

    /// Deletes a transaction and reverses its amount.
    ///
    /// Returns the resulting balance of the account.
    pub async fn delete_transaction(
        &self,
        actor: Actor,
        transaction_id: Uuid,
    ) -> ResultEngine<Money> {
        let (owner_id, balance) = with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, actor, transaction_id)
                .await?;
            if model.is_initial_balance {
                return Err(EngineError::InitialBalanceLocked);
            }
            let tx = Transaction::try_from(model)?;
            self.require_active_account(&db_tx, actor, tx.account_id)
                .await?;

            transactions::Entity::delete_by_id(tx.id)
                .exec(&db_tx)
                .await?;
            let balance = self
                .apply_balance_delta(&db_tx, tx.account_id, -tx.signed_amount())
                .await?;
            Ok((tx.owner_id, balance))
        })?;
        self.invalidate_after_transaction_write(owner_id).await;
        Ok(balance)
    }

    /// Transactions change which categories and accounts are referenced,
    /// which the `include_deleted` dropdowns depend on.
    async fn invalidate_after_transaction_write(&self, owner_id: Uuid) {
        self.cache
            .invalidate(ReferenceKind::Categories, owner_id)
            .await;
        self.cache.invalidate(ReferenceKind::Accounts, owner_id).await;
    }
}
