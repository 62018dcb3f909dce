use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Role, User, UserSummary, accounts, transactions, users,
    util::normalize_required_name,
};

use super::{Actor, Engine, with_tx};

/// Lowercases and validates an e-mail address used as login.
fn normalize_email(email: &str) -> ResultEngine<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(EngineError::InvalidName(format!(
            "'{email}' is not a valid e-mail address"
        ))),
    }
}

impl Engine {
    /// Registers a user. E-mails are unique, case-insensitively.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> ResultEngine<User> {
        let name = normalize_required_name(name, "user")?;
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(EngineError::InvalidOperation(
                "password must not be empty".to_string(),
            ));
        }

        let user = with_tx!(self, |db_tx| {
            if self.find_user_by_email(&db_tx, &email).await?.is_some() {
                return Err(EngineError::ExistingKey(email));
            }
            let user = User {
                id: Uuid::new_v4(),
                name,
                email,
                role,
                created_on: Utc::now(),
            };
            users::ActiveModel::new_user(&user, password.to_string())
                .insert(&db_tx)
                .await?;
            Ok(user)
        })?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "user created");
        Ok(user)
    }

    /// Resolves login credentials to an [`Actor`].
    ///
    /// Returns `None` when the e-mail is unknown or the password is wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Option<Actor>> {
        let Ok(email) = normalize_email(email) else {
            return Ok(None);
        };
        with_tx!(self, |db_tx| {
            let actor = self
                .find_user_by_email(&db_tx, &email)
                .await?
                .filter(|model| model.password == password)
                .map(|model| Role::try_from(model.role.as_str()).map(|role| Actor::new(model.id, role)))
                .transpose()?;
            Ok(actor)
        })
    }

    /// Returns a user profile: the actor's own, or anybody's for admins.
    pub async fn user(&self, actor: Actor, user_id: Uuid) -> ResultEngine<User> {
        actor.ensure_access(user_id, "user")?;
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    /// Lists every user with the number of accounts and transactions they
    /// own. Admin only.
    pub async fn list_users(&self, actor: Actor) -> ResultEngine<Vec<UserSummary>> {
        actor.ensure_admin()?;
        with_tx!(self, |db_tx| {
            let models = users::Entity::find()
                .order_by_asc(users::Column::Email)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let accounts = accounts::Entity::find()
                    .filter(accounts::Column::OwnerId.eq(model.id))
                    .count(&db_tx)
                    .await?;
                let transactions = transactions::Entity::find()
                    .filter(transactions::Column::OwnerId.eq(model.id))
                    .count(&db_tx)
                    .await?;
                out.push(UserSummary {
                    user: User::try_from(model)?,
                    accounts,
                    transactions,
                });
            }
            Ok(out)
        })
    }

    /// Changes the role of a user. Admin only; admins cannot demote
    /// themselves, so at least one admin always remains reachable.
    pub async fn set_user_role(
        &self,
        actor: Actor,
        user_id: Uuid,
        role: Role,
    ) -> ResultEngine<User> {
        actor.ensure_admin()?;
        if actor.user_id == user_id && role != Role::Admin {
            return Err(EngineError::InvalidOperation(
                "admins cannot demote themselves".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.update_role(&db_tx, user_id, role).await
        })
    }

    /// Changes the role of the user registered with `email`.
    ///
    /// Bootstrap operation for operators with direct database access (the
    /// admin CLI); no actor is involved.
    pub async fn assign_role(&self, email: &str, role: Role) -> ResultEngine<User> {
        let email = normalize_email(email)?;
        with_tx!(self, |db_tx| {
            let model = self
                .find_user_by_email(&db_tx, &email)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(email.clone()))?;
            self.update_role(&db_tx, model.id, role).await
        })
    }

    async fn update_role(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        role: Role,
    ) -> ResultEngine<User> {
        let model = users::ActiveModel {
            id: ActiveValue::Set(user_id),
            role: ActiveValue::Set(role.as_str().to_string()),
            ..Default::default()
        }
        .update(db)
        .await?;
        tracing::info!(%user_id, role = role.as_str(), "user role changed");
        User::try_from(model)
    }

    async fn find_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
            .map_err(Into::into)
    }
}
