//! User ⇄ admin messaging.
//!
//! Clients poll [`Engine::unseen_count`]; nothing is pushed.

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, Message, Reply, ResultEngine, Thread, message_replies, messages};

use super::{Actor, Engine, with_tx};

const MAX_SUBJECT_CHARS: usize = 200;

fn normalize_subject(subject: &str) -> ResultEngine<String> {
    let subject = subject.trim();
    if subject.is_empty() || subject.chars().count() > MAX_SUBJECT_CHARS {
        return Err(EngineError::InvalidOperation(format!(
            "subject must be 1 to {MAX_SUBJECT_CHARS} characters"
        )));
    }
    Ok(subject.to_string())
}

fn normalize_body(body: &str) -> ResultEngine<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(EngineError::InvalidOperation(
            "message body must not be empty".to_string(),
        ));
    }
    Ok(body.to_string())
}

impl Engine {
    /// Opens a conversation with the administrators.
    pub async fn send_message(
        &self,
        actor: Actor,
        subject: &str,
        body: &str,
    ) -> ResultEngine<Message> {
        let subject = normalize_subject(subject)?;
        let body = normalize_body(body)?;
        let message = Message {
            id: Uuid::new_v4(),
            author_id: actor.user_id,
            subject,
            body,
            created_on: Utc::now(),
            seen_by_author: true,
            seen_by_admin: false,
        };
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, actor.user_id).await?;
            messages::ActiveModel::from(&message).insert(&db_tx).await?;
            Ok(())
        })?;
        tracing::info!(message_id = %message.id, author_id = %message.author_id, "message sent");
        Ok(message)
    }

    /// Messages visible to the actor, newest first: their own, or all of them
    /// for admins.
    pub async fn list_messages(&self, actor: Actor) -> ResultEngine<Vec<Message>> {
        with_tx!(self, |db_tx| {
            let mut query = messages::Entity::find()
                .order_by_desc(messages::Column::CreatedOn)
                .order_by_desc(messages::Column::Id);
            if !actor.is_admin() {
                query = query.filter(messages::Column::AuthorId.eq(actor.user_id));
            }
            Ok(query
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Message::from)
                .collect())
        })
    }

    /// A message with its replies, oldest reply first.
    pub async fn message(&self, actor: Actor, message_id: Uuid) -> ResultEngine<Thread> {
        with_tx!(self, |db_tx| {
            let message = self.require_message(&db_tx, actor, message_id).await?;
            let replies = message_replies::Entity::find()
                .filter(message_replies::Column::MessageId.eq(message_id))
                .order_by_asc(message_replies::Column::CreatedOn)
                .order_by_asc(message_replies::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Reply::from)
                .collect();
            Ok(Thread {
                message: Message::from(message),
                replies,
            })
        })
    }

    /// Answers a message. The other side gets it flagged as unseen.
    pub async fn reply(&self, actor: Actor, message_id: Uuid, body: &str) -> ResultEngine<Reply> {
        let body = normalize_body(body)?;
        let reply = with_tx!(self, |db_tx| {
            let message = self.require_message(&db_tx, actor, message_id).await?;
            let reply = Reply {
                id: Uuid::new_v4(),
                message_id,
                author_id: actor.user_id,
                body,
                created_on: Utc::now(),
            };
            message_replies::ActiveModel::from(&reply)
                .insert(&db_tx)
                .await?;

            let by_author = message.author_id == actor.user_id;
            messages::ActiveModel {
                id: ActiveValue::Set(message_id),
                seen_by_author: ActiveValue::Set(by_author),
                seen_by_admin: ActiveValue::Set(!by_author),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(reply)
        })?;
        tracing::debug!(%message_id, reply_id = %reply.id, "message replied");
        Ok(reply)
    }

    /// Marks a message as read by the actor's side of the conversation.
    pub async fn mark_seen(&self, actor: Actor, message_id: Uuid) -> ResultEngine<Message> {
        with_tx!(self, |db_tx| {
            let message = self.require_message(&db_tx, actor, message_id).await?;
            let mut active = messages::ActiveModel {
                id: ActiveValue::Set(message_id),
                ..Default::default()
            };
            if message.author_id == actor.user_id {
                active.seen_by_author = ActiveValue::Set(true);
            } else {
                active.seen_by_admin = ActiveValue::Set(true);
            }
            let model = active.update(&db_tx).await?;
            Ok(Message::from(model))
        })
    }

    /// Number of conversations waiting for the actor: own messages with an
    /// unread answer, plus every message unread by the admins for admins.
    pub async fn unseen_count(&self, actor: Actor) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let mut condition = Condition::any().add(
                Condition::all()
                    .add(messages::Column::AuthorId.eq(actor.user_id))
                    .add(messages::Column::SeenByAuthor.eq(false)),
            );
            if actor.is_admin() {
                condition = condition.add(messages::Column::SeenByAdmin.eq(false));
            }
            let count = messages::Entity::find()
                .filter(condition)
                .count(&db_tx)
                .await?;
            Ok(count)
        })
    }

    async fn require_message(
        &self,
        db: &DatabaseTransaction,
        actor: Actor,
        message_id: Uuid,
    ) -> ResultEngine<messages::Model> {
        let model = messages::Entity::find_by_id(message_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("message not exists".to_string()))?;
        actor.ensure_access(model.author_id, "message")?;
        Ok(model)
    }
}
