use sea_orm::{ActiveValue, entity::prelude::*};

use crate::Reply;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "message_replies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub message_id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_on: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::messages::Entity",
        from = "Column::MessageId",
        to = "super::messages::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Messages,
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Reply> for ActiveModel {
    fn from(reply: &Reply) -> Self {
        Self {
            id: ActiveValue::Set(reply.id),
            message_id: ActiveValue::Set(reply.message_id),
            author_id: ActiveValue::Set(reply.author_id),
            body: ActiveValue::Set(reply.body.clone()),
            created_on: ActiveValue::Set(reply.created_on),
        }
    }
}

impl From<Model> for Reply {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            message_id: model.message_id,
            author_id: model.author_id,
            body: model.body,
            created_on: model.created_on,
        }
    }
}
