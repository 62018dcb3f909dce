use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, EntityStatus, ResultEngine, Role, accounts, categories, transactions, users,
};

use super::Engine;

/// Name key of the reserved category tagging initial balance transactions.
const INITIAL_BALANCE_KEY: &str = "initial balance";

/// Who is calling the engine.
///
/// Admins may act on every user's data, everybody else only on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user(user_id: Uuid) -> Self {
        Self::new(user_id, Role::User)
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the actor may read and write data owned by `owner_id`.
    pub fn can_access(self, owner_id: Uuid) -> bool {
        self.is_admin() || self.user_id == owner_id
    }

    pub(crate) fn ensure_access(self, owner_id: Uuid, label: &str) -> ResultEngine<()> {
        if self.can_access(owner_id) {
            return Ok(());
        }
        Err(EngineError::Forbidden(format!(
            "{label} belongs to another user"
        )))
    }

    pub(crate) fn ensure_admin(self) -> ResultEngine<()> {
        if self.is_admin() {
            return Ok(());
        }
        Err(EngineError::Forbidden("admin role required".to_string()))
    }
}

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Loads an account the actor is allowed to see, deleted ones included.
    pub(super) async fn require_account(
        &self,
        db: &DatabaseTransaction,
        actor: Actor,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        let model = accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        actor.ensure_access(model.owner_id, "account")?;
        Ok(model)
    }

    /// Like [`Self::require_account`], rejecting soft-deleted accounts.
    pub(super) async fn require_active_account(
        &self,
        db: &DatabaseTransaction,
        actor: Actor,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        let model = self.require_account(db, actor, account_id).await?;
        if EntityStatus::try_from(model.status.as_str())? != EntityStatus::Active {
            return Err(EngineError::InvalidOperation(
                "account is deleted".to_string(),
            ));
        }
        Ok(model)
    }

    pub(super) async fn require_transaction(
        &self,
        db: &DatabaseTransaction,
        actor: Actor,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        let model = transactions::Entity::find_by_id(transaction_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        actor.ensure_access(model.owner_id, "transaction")?;
        Ok(model)
    }

    /// Checks that `category_id` can tag a regular transaction of `owner_id`:
    /// it must belong to that owner, be active and not be the reserved
    /// initial balance category.
    pub(super) async fn require_usable_category(
        &self,
        db: &DatabaseTransaction,
        owner_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        let model = categories::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        match model.owner_id {
            None => {
                return Err(EngineError::InvalidOperation(format!(
                    "category '{}' is reserved",
                    model.name
                )));
            }
            Some(category_owner) if category_owner != owner_id => {
                return Err(EngineError::Forbidden(
                    "category belongs to another user".to_string(),
                ));
            }
            Some(_) => {}
        }
        if EntityStatus::try_from(model.status.as_str())? != EntityStatus::Active {
            return Err(EngineError::InvalidOperation(format!(
                "category '{}' is deleted",
                model.name
            )));
        }
        Ok(model)
    }

    pub(super) async fn initial_balance_category_id(
        &self,
        db: &DatabaseTransaction,
    ) -> ResultEngine<Uuid> {
        categories::Entity::find()
            .filter(categories::Column::OwnerId.is_null())
            .filter(categories::Column::NameNorm.eq(INITIAL_BALANCE_KEY))
            .one(db)
            .await?
            .map(|model| model.id)
            .ok_or_else(|| {
                EngineError::KeyNotFound("missing Initial Balance category".to_string())
            })
    }
}
