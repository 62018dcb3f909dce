//! Account types, currencies and categories.
//!
//! The three share one lifecycle:
//! - names are unique per owner, compared through their name key, and a
//!   system row's name is reserved for everybody;
//! - re-creating the name of one of the owner's soft-deleted rows restores it;
//! - deleting removes the row when nothing references it and marks it
//!   `deleted` otherwise;
//! - system rows (no owner) are never renamed or deleted.
//!
//! Every write drops the owner's cached dropdowns of that kind.

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, EntityStatus, ReferenceItem, ReferenceKind, Removal, ResultEngine,
    account_types, accounts, categories, currencies, transactions,
    util::{name_key, normalize_required_name},
};

use super::{Actor, Engine, with_tx};

/// Generates the create/rename/delete operations of a reference entity.
///
/// `$in_use` is the "may this row be hard-deleted" check: it returns whether
/// any row of `$ref_entity` still points at the entity.
macro_rules! impl_reference_ops {
    (
        $kind:expr,
        $label:literal,
        $entity:ident,
        $ref_entity:ident :: $ref_col:ident,
        $in_use:ident,
        $create:ident,
        $rename:ident,
        $delete:ident $(,)?
    ) => {
        pub(super) async fn $in_use(&self, db: &DatabaseTransaction, id: Uuid) -> ResultEngine<bool> {
            Ok($ref_entity::Entity::find()
                .filter($ref_entity::Column::$ref_col.eq(id))
                .one(db)
                .await?
                .is_some())
        }

        #[doc = concat!("Creates a ", $label, " for `owner_id`, or restores the owner's soft-deleted one with the same name.")]
        pub async fn $create(
            &self,
            actor: Actor,
            owner_id: Uuid,
            name: &str,
        ) -> ResultEngine<ReferenceItem> {
            actor.ensure_access(owner_id, $label)?;
            let name = normalize_required_name(name, $label)?;
            let key = name_key(&name)?;

            let item = with_tx!(self, |db_tx| {
                self.require_user(&db_tx, owner_id).await?;
                let existing = $entity::Entity::find()
                    .filter(visible_to($entity::Column::OwnerId, owner_id))
                    .filter($entity::Column::NameNorm.eq(key.as_str()))
                    .one(&db_tx)
                    .await?;

                let model = match existing {
                    Some(model)
                        if model.owner_id == Some(owner_id)
                            && model.status == EntityStatus::Deleted.as_str() =>
                    {
                        tracing::info!(id = %model.id, kind = $kind.as_str(), "restoring deleted entry");
                        $entity::ActiveModel {
                            id: ActiveValue::Set(model.id),
                            name: ActiveValue::Set(name),
                            status: ActiveValue::Set(EntityStatus::Active.as_str().to_string()),
                            ..Default::default()
                        }
                        .update(&db_tx)
                        .await?
                    }
                    Some(_) => return Err(EngineError::ExistingKey(name)),
                    None => {
                        $entity::ActiveModel {
                            id: ActiveValue::Set(Uuid::new_v4()),
                            name: ActiveValue::Set(name),
                            name_norm: ActiveValue::Set(key),
                            owner_id: ActiveValue::Set(Some(owner_id)),
                            status: ActiveValue::Set(EntityStatus::Active.as_str().to_string()),
                        }
                        .insert(&db_tx)
                        .await?
                    }
                };
                ReferenceItem::try_from(model)
            })?;

            self.cache.invalidate($kind, owner_id).await;
            Ok(item)
        }

        #[doc = concat!("Renames one of the owner's active ", $label, " entries.")]
        pub async fn $rename(
            &self,
            actor: Actor,
            id: Uuid,
            name: &str,
        ) -> ResultEngine<ReferenceItem> {
            let name = normalize_required_name(name, $label)?;
            let key = name_key(&name)?;

            let item = with_tx!(self, |db_tx| {
                let model = $entity::Entity::find_by_id(id)
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound(concat!($label, " not exists").to_string()))?;
                let owner_id = model.owner_id.ok_or_else(|| {
                    EngineError::InvalidOperation(concat!("system ", $label, " cannot be renamed").to_string())
                })?;
                actor.ensure_access(owner_id, $label)?;
                if model.status != EntityStatus::Active.as_str() {
                    return Err(EngineError::InvalidOperation(
                        concat!($label, " is deleted").to_string(),
                    ));
                }

                let clash = $entity::Entity::find()
                    .filter(visible_to($entity::Column::OwnerId, owner_id))
                    .filter($entity::Column::NameNorm.eq(key.as_str()))
                    .filter($entity::Column::Id.ne(id))
                    .one(&db_tx)
                    .await?;
                if clash.is_some() {
                    return Err(EngineError::ExistingKey(name));
                }

                let model = $entity::ActiveModel {
                    id: ActiveValue::Set(id),
                    name: ActiveValue::Set(name),
                    name_norm: ActiveValue::Set(key),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
                ReferenceItem::try_from(model)
            })?;

            if let Some(owner_id) = item.owner_id {
                self.cache.invalidate($kind, owner_id).await;
            }
            Ok(item)
        }

        #[doc = concat!("Deletes a ", $label, ": removed when unused, marked deleted otherwise.")]
        pub async fn $delete(&self, actor: Actor, id: Uuid) -> ResultEngine<Removal> {
            let (owner_id, removal) = with_tx!(self, |db_tx| {
                let model = $entity::Entity::find_by_id(id)
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound(concat!($label, " not exists").to_string()))?;
                let owner_id = model.owner_id.ok_or_else(|| {
                    EngineError::InvalidOperation(concat!("system ", $label, " cannot be deleted").to_string())
                })?;
                actor.ensure_access(owner_id, $label)?;

                let removal = if self.$in_use(&db_tx, id).await? {
                    $entity::ActiveModel {
                        id: ActiveValue::Set(id),
                        status: ActiveValue::Set(EntityStatus::Deleted.as_str().to_string()),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?;
                    Removal::Archived
                } else {
                    $entity::Entity::delete_by_id(id).exec(&db_tx).await?;
                    Removal::Removed
                };
                Ok((owner_id, removal))
            })?;

            self.cache.invalidate($kind, owner_id).await;
            tracing::info!(%id, kind = $kind.as_str(), ?removal, "reference entry deleted");
            Ok(removal)
        }
    };
}

/// Rows owned by `owner_id` plus the system rows shared by everybody.
fn visible_to<C: ColumnTrait>(owner_col: C, owner_id: Uuid) -> Condition {
    Condition::any()
        .add(owner_col.eq(owner_id))
        .add(owner_col.is_null())
}

impl Engine {
    impl_reference_ops!(
        ReferenceKind::AccountTypes,
        "account type",
        account_types,
        accounts::AccountTypeId,
        account_type_in_use,
        create_account_type,
        rename_account_type,
        delete_account_type,
    );

    impl_reference_ops!(
        ReferenceKind::Currencies,
        "currency",
        currencies,
        accounts::CurrencyId,
        currency_in_use,
        create_currency,
        rename_currency,
        delete_currency,
    );

    impl_reference_ops!(
        ReferenceKind::Categories,
        "category",
        categories,
        transactions::CategoryId,
        category_in_use,
        create_category,
        rename_category,
        delete_category,
    );
}
