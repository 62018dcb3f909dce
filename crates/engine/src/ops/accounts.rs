use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, Statement,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Account, AccountDetail, CurrencyBalance, EngineError, EntityStatus, Money, NewAccountCmd,
    ReferenceKind, Removal, ResultEngine, Transaction, TransactionKind, UpdateAccountCmd,
    account_types, accounts, currencies, transactions,
    util::{name_key, normalize_required_name},
};

use super::{Actor, Engine, with_tx};

impl Engine {
    /// Opens a new account.
    ///
    /// A non-zero `initial_balance` is booked as the account's initial
    /// balance transaction (income if positive, expense if negative) tagged
    /// with the reserved category, so the stored balance equals it.
    pub async fn create_account(&self, actor: Actor, cmd: NewAccountCmd) -> ResultEngine<Account> {
        actor.ensure_access(cmd.owner_id, "account")?;
        cmd.initial_balance.ensure_signed_range()?;
        let name = normalize_required_name(&cmd.name, "account")?;
        let key = name_key(&name)?;

        let account = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, cmd.owner_id).await?;
            self.require_usable_account_type(&db_tx, cmd.owner_id, cmd.account_type_id)
                .await?;
            self.require_usable_currency(&db_tx, cmd.owner_id, cmd.currency_id)
                .await?;
            self.ensure_account_name_free(&db_tx, cmd.owner_id, &key, None)
                .await?;

            let mut account = Account::new(
                name,
                cmd.owner_id,
                cmd.account_type_id,
                cmd.currency_id,
                Utc::now(),
            );
            accounts::ActiveModel::from_account(&account, key)
                .insert(&db_tx)
                .await?;

            if !cmd.initial_balance.is_zero() {
                self.insert_initial_balance(
                    &db_tx,
                    account.id,
                    account.owner_id,
                    cmd.initial_balance,
                    account.created_on,
                )
                .await?;
                account.balance = self
                    .apply_balance_delta(&db_tx, account.id, cmd.initial_balance)
                    .await?;
            }
            Ok(account)
        })?;

        self.invalidate_account_dropdowns(account.owner_id).await;
        tracing::info!(account_id = %account.id, owner_id = %account.owner_id, "account created");
        Ok(account)
    }

    /// Updates name, type, currency and/or initial balance of an active
    /// account.
    ///
    /// Changing the initial balance creates, updates or removes the initial
    /// balance transaction and shifts the balance by the difference.
    pub async fn update_account(
        &self,
        actor: Actor,
        cmd: UpdateAccountCmd,
    ) -> ResultEngine<Account> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "account"))
            .transpose()?;

        let account = with_tx!(self, |db_tx| {
            let model = self
                .require_active_account(&db_tx, actor, cmd.account_id)
                .await?;
            let owner_id = model.owner_id;
            let mut active = accounts::ActiveModel {
                id: ActiveValue::Set(model.id),
                ..Default::default()
            };
            let mut changed = false;

            if let Some(name) = name {
                let key = name_key(&name)?;
                self.ensure_account_name_free(&db_tx, owner_id, &key, Some(model.id))
                    .await?;
                active.name = ActiveValue::Set(name);
                active.name_norm = ActiveValue::Set(key);
                changed = true;
            }
            if let Some(account_type_id) = cmd.account_type_id {
                self.require_usable_account_type(&db_tx, owner_id, account_type_id)
                    .await?;
                active.account_type_id = ActiveValue::Set(account_type_id);
                changed = true;
            }
            if let Some(currency_id) = cmd.currency_id {
                self.require_usable_currency(&db_tx, owner_id, currency_id)
                    .await?;
                active.currency_id = ActiveValue::Set(currency_id);
                changed = true;
            }
            if changed {
                active.update(&db_tx).await?;
            }

            if let Some(initial_balance) = cmd.initial_balance {
                initial_balance.ensure_signed_range()?;
                self.set_initial_balance(&db_tx, &model, initial_balance)
                    .await?;
            }

            let model = accounts::Entity::find_by_id(model.id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
            Account::try_from(model)
        })?;

        self.invalidate_account_dropdowns(account.owner_id).await;
        Ok(account)
    }

    /// Deletes an account.
    ///
    /// An account without transactions besides its initial balance one is
    /// removed together with it. Otherwise it is marked deleted and keeps its
    /// history.
    pub async fn delete_account(&self, actor: Actor, account_id: Uuid) -> ResultEngine<Removal> {
        let (owner_id, removal) = with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, actor, account_id).await?;

            let has_history = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id))
                .filter(transactions::Column::IsInitialBalance.eq(false))
                .one(&db_tx)
                .await?
                .is_some();

            let removal = if has_history {
                accounts::ActiveModel {
                    id: ActiveValue::Set(account_id),
                    status: ActiveValue::Set(EntityStatus::Deleted.as_str().to_string()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
                Removal::Archived
            } else {
                transactions::Entity::delete_many()
                    .filter(transactions::Column::AccountId.eq(account_id))
                    .exec(&db_tx)
                    .await?;
                accounts::Entity::delete_by_id(account_id)
                    .exec(&db_tx)
                    .await?;
                Removal::Removed
            };
            Ok((model.owner_id, removal))
        })?;

        self.invalidate_account_dropdowns(owner_id).await;
        self.cache
            .invalidate(ReferenceKind::Categories, owner_id)
            .await;
        tracing::info!(%account_id, ?removal, "account deleted");
        Ok(removal)
    }

    /// Returns an account with its type and currency names and its initial
    /// balance.
    pub async fn account(&self, actor: Actor, account_id: Uuid) -> ResultEngine<AccountDetail> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, actor, account_id).await?;
            let mut details = self.account_details(&db_tx, vec![model]).await?;
            details
                .pop()
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
        })
    }

    /// Lists the accounts of `owner_id`, sorted by name.
    pub async fn list_accounts(
        &self,
        actor: Actor,
        owner_id: Uuid,
        include_deleted: bool,
    ) -> ResultEngine<Vec<AccountDetail>> {
        actor.ensure_access(owner_id, "accounts")?;
        with_tx!(self, |db_tx| {
            let mut query = accounts::Entity::find()
                .filter(accounts::Column::OwnerId.eq(owner_id))
                .order_by_asc(accounts::Column::NameNorm);
            if !include_deleted {
                query = query
                    .filter(accounts::Column::Status.eq(EntityStatus::Active.as_str()));
            }
            let models = query.all(&db_tx).await?;
            self.account_details(&db_tx, models).await
        })
    }

    /// Total balance of the active accounts of `owner_id`, per currency.
    pub async fn balances_by_currency(
        &self,
        actor: Actor,
        owner_id: Uuid,
    ) -> ResultEngine<Vec<CurrencyBalance>> {
        actor.ensure_access(owner_id, "accounts")?;
        with_tx!(self, |db_tx| {
            let backend = self.database.get_database_backend();
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT a.currency_id AS currency_id, c.name AS currency, \
                 COALESCE(SUM(a.balance_minor), 0) AS sum \
                 FROM accounts a JOIN currencies c ON c.id = a.currency_id \
                 WHERE a.owner_id = ? AND a.status = ? \
                 GROUP BY a.currency_id, c.name \
                 ORDER BY c.name;"
                    .to_string(),
                vec![owner_id.into(), EntityStatus::Active.as_str().into()],
            );
            let rows = db_tx.query_all(stmt).await?;

            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                out.push(CurrencyBalance {
                    currency_id: row.try_get("", "currency_id")?,
                    currency: row.try_get("", "currency")?,
                    balance: Money::new(row.try_get("", "sum")?),
                });
            }
            Ok(out)
        })
    }

    async fn insert_initial_balance(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        owner_id: Uuid,
        amount: Money,
        created_on: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let category_id = self.initial_balance_category_id(db).await?;
        let mut tx = Transaction::new(
            account_id,
            owner_id,
            category_id,
            TransactionKind::for_signed(amount),
            initial_balance_amount(amount)?,
            created_on,
            None,
        )?;
        tx.is_initial_balance = true;
        transactions::ActiveModel::from(&tx).insert(db).await?;
        Ok(tx)
    }

    async fn initial_balance_transaction(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultEngine<Option<Transaction>> {
        transactions::Entity::find()
            .filter(transactions::Column::AccountId.eq(account_id))
            .filter(transactions::Column::IsInitialBalance.eq(true))
            .one(db)
            .await?
            .map(Transaction::try_from)
            .transpose()
    }

    /// Moves the initial balance of `account` to `amount` (signed).
    async fn set_initial_balance(
        &self,
        db: &DatabaseTransaction,
        account: &accounts::Model,
        amount: Money,
    ) -> ResultEngine<()> {
        let existing = self.initial_balance_transaction(db, account.id).await?;
        let previous = existing
            .as_ref()
            .map(Transaction::signed_amount)
            .unwrap_or(Money::ZERO);
        if previous == amount {
            return Ok(());
        }

        match existing {
            Some(tx) if amount.is_zero() => {
                transactions::Entity::delete_by_id(tx.id).exec(db).await?;
            }
            Some(mut tx) => {
                tx.kind = TransactionKind::for_signed(amount);
                tx.amount = initial_balance_amount(amount)?;
                transactions::ActiveModel::from(&tx).update(db).await?;
            }
            None => {
                self.insert_initial_balance(
                    db,
                    account.id,
                    account.owner_id,
                    amount,
                    account.created_on,
                )
                .await?;
            }
        }
        let delta = amount.checked_sub(previous).ok_or_else(|| {
            EngineError::InvalidAmount("initial balance out of range".to_string())
        })?;
        self.apply_balance_delta(db, account.id, delta).await?;
        Ok(())
    }

    async fn require_usable_account_type(
        &self,
        db: &DatabaseTransaction,
        owner_id: Uuid,
        account_type_id: Uuid,
    ) -> ResultEngine<account_types::Model> {
        let model = account_types::Entity::find_by_id(account_type_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account type not exists".to_string()))?;
        if model.owner_id.is_some_and(|owner| owner != owner_id) {
            return Err(EngineError::Forbidden(
                "account type belongs to another user".to_string(),
            ));
        }
        if model.status != EntityStatus::Active.as_str() {
            return Err(EngineError::InvalidOperation(format!(
                "account type '{}' is deleted",
                model.name
            )));
        }
        Ok(model)
    }

    async fn require_usable_currency(
        &self,
        db: &DatabaseTransaction,
        owner_id: Uuid,
        currency_id: Uuid,
    ) -> ResultEngine<currencies::Model> {
        let model = currencies::Entity::find_by_id(currency_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("currency not exists".to_string()))?;
        if model.owner_id != Some(owner_id) {
            return Err(EngineError::Forbidden(
                "currency belongs to another user".to_string(),
            ));
        }
        if model.status != EntityStatus::Active.as_str() {
            return Err(EngineError::InvalidOperation(format!(
                "currency '{}' is deleted",
                model.name
            )));
        }
        Ok(model)
    }

    async fn ensure_account_name_free(
        &self,
        db: &DatabaseTransaction,
        owner_id: Uuid,
        key: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(owner_id))
            .filter(accounts::Column::NameNorm.eq(key))
            .filter(accounts::Column::Status.eq(EntityStatus::Active.as_str()));
        if let Some(id) = except {
            query = query.filter(accounts::Column::Id.ne(id));
        }
        if let Some(clash) = query.one(db).await? {
            return Err(EngineError::ExistingKey(clash.name));
        }
        Ok(())
    }

    async fn account_details(
        &self,
        db: &DatabaseTransaction,
        models: Vec<accounts::Model>,
    ) -> ResultEngine<Vec<AccountDetail>> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let type_ids: HashSet<Uuid> = models.iter().map(|m| m.account_type_id).collect();
        let currency_ids: HashSet<Uuid> = models.iter().map(|m| m.currency_id).collect();

        let types: HashMap<Uuid, String> = account_types::Entity::find()
            .filter(account_types::Column::Id.is_in(type_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();
        let currencies: HashMap<Uuid, String> = currencies::Entity::find()
            .filter(currencies::Column::Id.is_in(currency_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();
        let mut initial: HashMap<Uuid, Money> = HashMap::new();
        for model in transactions::Entity::find()
            .filter(transactions::Column::AccountId.is_in(ids))
            .filter(transactions::Column::IsInitialBalance.eq(true))
            .all(db)
            .await?
        {
            let tx = Transaction::try_from(model)?;
            initial.insert(tx.account_id, tx.signed_amount());
        }

        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let account = Account::try_from(model)?;
            let account_type = types
                .get(&account.account_type_id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound("account type not exists".to_string()))?;
            let currency = currencies
                .get(&account.currency_id)
                .cloned()
                .ok_or_else(|| EngineError::KeyNotFound("currency not exists".to_string()))?;
            out.push(AccountDetail {
                initial_balance: initial.get(&account.id).copied().unwrap_or(Money::ZERO),
                account_type,
                currency,
                account,
            });
        }
        Ok(out)
    }

    async fn invalidate_account_dropdowns(&self, owner_id: Uuid) {
        for kind in [
            ReferenceKind::Accounts,
            ReferenceKind::AccountTypes,
            ReferenceKind::Currencies,
        ] {
            self.cache.invalidate(kind, owner_id).await;
        }
    }
}

/// Unsigned amount booked for an initial balance of `balance`.
fn initial_balance_amount(balance: Money) -> ResultEngine<Money> {
    balance.checked_abs().ok_or_else(|| {
        EngineError::InvalidAmount("initial balance out of range".to_string())
    })
}
