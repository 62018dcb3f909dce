//! The module contains the `Account` struct and its DB model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, EntityStatus, Money, ResultEngine};

/// A money container: a wallet, a bank account, a savings book...
///
/// `balance` is denormalized: it always equals the signed sum of the
/// account's transactions, the initial balance transaction included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub balance: Money,
    pub owner_id: Uuid,
    pub account_type_id: Uuid,
    pub currency_id: Uuid,
    pub status: EntityStatus,
    pub created_on: DateTime<Utc>,
}

impl Account {
    pub fn new(
        name: String,
        owner_id: Uuid,
        account_type_id: Uuid,
        currency_id: Uuid,
        created_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            balance: Money::ZERO,
            owner_id,
            account_type_id,
            currency_id,
            status: EntityStatus::Active,
            created_on,
        }
    }
}

/// An account with the display names of its references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDetail {
    pub account: Account,
    pub account_type: String,
    pub currency: String,
    /// Signed amount of the initial balance transaction, zero when absent.
    pub initial_balance: Money,
}

/// Total balance of the active accounts sharing a currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub currency_id: Uuid,
    pub currency: String,
    pub balance: Money,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub balance_minor: i64,
    pub owner_id: Uuid,
    pub account_type_id: Uuid,
    pub currency_id: Uuid,
    pub status: String,
    pub created_on: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::account_types::Entity",
        from = "Column::AccountTypeId",
        to = "super::account_types::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    AccountTypes,
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currencies,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::account_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountTypes.def()
    }
}

impl Related<super::currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_account(account: &Account, name_norm: String) -> Self {
        Self {
            id: ActiveValue::Set(account.id),
            name: ActiveValue::Set(account.name.clone()),
            name_norm: ActiveValue::Set(name_norm),
            balance_minor: ActiveValue::Set(account.balance.minor()),
            owner_id: ActiveValue::Set(account.owner_id),
            account_type_id: ActiveValue::Set(account.account_type_id),
            currency_id: ActiveValue::Set(account.currency_id),
            status: ActiveValue::Set(account.status.as_str().to_string()),
            created_on: ActiveValue::Set(account.created_on),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            name: model.name,
            balance: Money::new(model.balance_minor),
            owner_id: model.owner_id,
            account_type_id: model.account_type_id,
            currency_id: model.currency_id,
            status: EntityStatus::try_from(model.status.as_str())?,
            created_on: model.created_on,
        })
    }
}
