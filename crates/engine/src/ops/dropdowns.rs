use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, EntityStatus, ReferenceItem, ReferenceKind, ResultEngine, account_types,
    accounts, categories, currencies,
};

use super::{Actor, Engine, with_tx};

impl Engine {
    /// Returns the dropdown list of `kind` for `owner_id`, sorted by name.
    ///
    /// - account types include the system defaults;
    /// - categories never include the reserved initial balance category;
    /// - with `include_deleted`, soft-deleted entries still referenced by
    ///   something are listed too, so historical rows keep a label.
    ///
    /// Results are served from the TTL cache when present.
    pub async fn dropdown(
        &self,
        actor: Actor,
        kind: ReferenceKind,
        owner_id: Uuid,
        include_deleted: bool,
    ) -> ResultEngine<Vec<ReferenceItem>> {
        actor.ensure_access(owner_id, kind.as_str())?;
        if let Some(items) = self.cache.get(kind, include_deleted, owner_id).await {
            return Ok(items.as_ref().clone());
        }

        let items = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, owner_id).await?;
            let mut items = Vec::new();
            for item in self.load_reference_items(&db_tx, kind, owner_id).await? {
                let keep = match item.status {
                    EntityStatus::Active => true,
                    EntityStatus::Deleted if !include_deleted => false,
                    EntityStatus::Deleted => match kind {
                        ReferenceKind::AccountTypes => {
                            self.account_type_in_use(&db_tx, item.id).await?
                        }
                        ReferenceKind::Currencies => self.currency_in_use(&db_tx, item.id).await?,
                        ReferenceKind::Categories => self.category_in_use(&db_tx, item.id).await?,
                        // A deleted account always keeps transactions.
                        ReferenceKind::Accounts => true,
                    },
                };
                if keep {
                    items.push(item);
                }
            }
            Ok(items)
        })?;

        tracing::debug!(kind = kind.as_str(), %owner_id, include_deleted, "dropdown cache miss");
        let items = self
            .cache
            .insert(kind, include_deleted, owner_id, items)
            .await;
        Ok(items.as_ref().clone())
    }

    async fn load_reference_items(
        &self,
        db: &DatabaseTransaction,
        kind: ReferenceKind,
        owner_id: Uuid,
    ) -> ResultEngine<Vec<ReferenceItem>> {
        match kind {
            ReferenceKind::AccountTypes => account_types::Entity::find()
                .filter(
                    Condition::any()
                        .add(account_types::Column::OwnerId.eq(owner_id))
                        .add(account_types::Column::OwnerId.is_null()),
                )
                .order_by_asc(account_types::Column::NameNorm)
                .all(db)
                .await?
                .into_iter()
                .map(ReferenceItem::try_from)
                .collect(),
            ReferenceKind::Currencies => currencies::Entity::find()
                .filter(currencies::Column::OwnerId.eq(owner_id))
                .order_by_asc(currencies::Column::NameNorm)
                .all(db)
                .await?
                .into_iter()
                .map(ReferenceItem::try_from)
                .collect(),
            ReferenceKind::Categories => categories::Entity::find()
                .filter(categories::Column::OwnerId.eq(owner_id))
                .order_by_asc(categories::Column::NameNorm)
                .all(db)
                .await?
                .into_iter()
                .map(ReferenceItem::try_from)
                .collect(),
            ReferenceKind::Accounts => accounts::Entity::find()
                .filter(accounts::Column::OwnerId.eq(owner_id))
                .order_by_asc(accounts::Column::NameNorm)
                .all(db)
                .await?
                .into_iter()
                .map(|model| {
                    Ok::<_, EngineError>(ReferenceItem {
                        id: model.id,
                        name: model.name,
                        owner_id: Some(model.owner_id),
                        status: EntityStatus::try_from(model.status.as_str())?,
                    })
                })
                .collect(),
        }
    }
}
