//! Income/expense categories.
//!
//! The only row without an owner is the reserved "Initial Balance" category,
//! which tags the synthetic opening transaction of an account and cannot be
//! picked for regular transactions.

use sea_orm::entity::prelude::*;

use crate::{EngineError, EntityStatus, ReferenceItem};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub owner_id: Option<Uuid>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ReferenceItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            owner_id: model.owner_id,
            status: EntityStatus::try_from(model.status.as_str())?,
        })
    }
}
