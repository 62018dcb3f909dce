//! Conversations between a user and the administrators.
//!
//! A message is opened by its author and addressed to every admin. Each side
//! has its own "seen" flag, flipped to unseen whenever the other side writes.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub author_id: Uuid,
    pub subject: String,
    pub body: String,
    pub created_on: DateTime<Utc>,
    pub seen_by_author: bool,
    pub seen_by_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Uuid,
    pub message_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_on: DateTime<Utc>,
}

/// A message together with its replies, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub message: Message,
    pub replies: Vec<Reply>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_on: DateTimeUtc,
    pub seen_by_author: bool,
    pub seen_by_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::message_replies::Entity")]
    Replies,
}

impl Related<super::message_replies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Replies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Message> for ActiveModel {
    fn from(message: &Message) -> Self {
        Self {
            id: ActiveValue::Set(message.id),
            author_id: ActiveValue::Set(message.author_id),
            subject: ActiveValue::Set(message.subject.clone()),
            body: ActiveValue::Set(message.body.clone()),
            created_on: ActiveValue::Set(message.created_on),
            seen_by_author: ActiveValue::Set(message.seen_by_author),
            seen_by_admin: ActiveValue::Set(message.seen_by_admin),
        }
    }
}

impl From<Model> for Message {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            subject: model.subject,
            body: model.body,
            created_on: model.created_on,
            seen_by_author: model.seen_by_author,
            seen_by_admin: model.seen_by_admin,
        }
    }
}
