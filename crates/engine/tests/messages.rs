mod common;

use engine::EngineError;

use common::fixture;

#[tokio::test]
async fn conversation_flags_the_other_side_unseen() {
    let fx = fixture().await;

    let message = fx
        .engine
        .send_message(fx.alice, "Import", "How do I import my bank export?")
        .await
        .unwrap();
    assert_eq!(fx.engine.unseen_count(fx.alice).await.unwrap(), 0);
    assert_eq!(fx.engine.unseen_count(fx.admin).await.unwrap(), 1);

    fx.engine.mark_seen(fx.admin, message.id).await.unwrap();
    assert_eq!(fx.engine.unseen_count(fx.admin).await.unwrap(), 0);

    fx.engine
        .reply(fx.admin, message.id, "Not supported yet.")
        .await
        .unwrap();
    assert_eq!(fx.engine.unseen_count(fx.alice).await.unwrap(), 1);
    assert_eq!(fx.engine.unseen_count(fx.admin).await.unwrap(), 0);

    let thread = fx.engine.message(fx.alice, message.id).await.unwrap();
    assert_eq!(thread.replies.len(), 1);
    assert_eq!(thread.replies[0].author_id, fx.admin.user_id);

    fx.engine.mark_seen(fx.alice, message.id).await.unwrap();
    fx.engine
        .reply(fx.alice, message.id, "Thanks!")
        .await
        .unwrap();
    assert_eq!(fx.engine.unseen_count(fx.alice).await.unwrap(), 0);
    assert_eq!(fx.engine.unseen_count(fx.admin).await.unwrap(), 1);
}

#[tokio::test]
async fn messages_are_visible_to_author_and_admins_only() {
    let fx = fixture().await;
    let alice_msg = fx
        .engine
        .send_message(fx.alice, "Hello", "first")
        .await
        .unwrap();
    fx.engine
        .send_message(fx.bob, "Hi", "second")
        .await
        .unwrap();

    let mine = fx.engine.list_messages(fx.alice).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, alice_msg.id);
    assert_eq!(fx.engine.list_messages(fx.admin).await.unwrap().len(), 2);

    let err = fx.engine.message(fx.bob, alice_msg.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = fx
        .engine
        .reply(fx.bob, alice_msg.id, "intrusion")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn empty_messages_are_rejected() {
    let fx = fixture().await;
    let err = fx
        .engine
        .send_message(fx.alice, "  ", "body")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));
    let err = fx
        .engine
        .send_message(fx.alice, "Subject", "")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));
}
