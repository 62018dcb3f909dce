mod common;

use engine::{
    EngineError, EntityStatus, Money, NewAccountCmd, NewTransactionCmd, ReferenceKind, Removal,
};

use common::{cash_type, fixture};

#[tokio::test]
async fn account_type_dropdown_includes_system_defaults() {
    let fx = fixture().await;
    fx.engine
        .create_account_type(fx.alice, fx.alice.user_id, "Crypto")
        .await
        .unwrap();

    let items = fx
        .engine
        .dropdown(fx.alice, ReferenceKind::AccountTypes, fx.alice.user_id, false)
        .await
        .unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Bank", "Cash", "Crypto", "Savings"]);
    assert!(items.iter().filter(|i| i.is_system()).count() == 3);

    let bob_items = fx
        .engine
        .dropdown(fx.bob, ReferenceKind::AccountTypes, fx.bob.user_id, false)
        .await
        .unwrap();
    assert_eq!(bob_items.len(), 3);
}

#[tokio::test]
async fn system_rows_are_reserved() {
    let fx = fixture().await;

    let err = fx
        .engine
        .create_account_type(fx.alice, fx.alice.user_id, "cash")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("cash".to_string()));

    let err = fx
        .engine
        .create_category(fx.alice, fx.alice.user_id, "Initial balance")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = fx
        .engine
        .delete_account_type(fx.admin, cash_type())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));

    let err = fx
        .engine
        .rename_category(fx.admin, migration::INITIAL_BALANCE_CATEGORY_ID, "Opening")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));

    let categories = fx
        .engine
        .dropdown(fx.alice, ReferenceKind::Categories, fx.alice.user_id, true)
        .await
        .unwrap();
    assert!(categories.is_empty());
}

#[tokio::test]
async fn names_are_trimmed_and_compared_case_insensitively() {
    let fx = fixture().await;
    let food = fx
        .engine
        .create_category(fx.alice, fx.alice.user_id, "  Food ")
        .await
        .unwrap();
    assert_eq!(food.name, "Food");

    let err = fx
        .engine
        .create_category(fx.alice, fx.alice.user_id, "FOOD")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = fx
        .engine
        .create_category(fx.alice, fx.alice.user_id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    // Names are scoped by owner.
    fx.engine
        .create_category(fx.bob, fx.bob.user_id, "Food")
        .await
        .unwrap();

    fx.engine
        .create_category(fx.alice, fx.alice.user_id, "Rent")
        .await
        .unwrap();
    let err = fx
        .engine
        .rename_category(fx.alice, food.id, "rent")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let renamed = fx
        .engine
        .rename_category(fx.alice, food.id, "Groceries")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Groceries");

    let err = fx
        .engine
        .rename_category(fx.bob, food.id, "Mine")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn delete_is_hard_when_unused_and_soft_when_referenced() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let usd = fx.currency(fx.alice, "USD").await;
    let food = fx.category(fx.alice, "Food").await;
    let account = fx.account(fx.alice, "Wallet", eur.id, 0).await;
    fx.engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::expense(account, food.id, Money::new(5)),
        )
        .await
        .unwrap();

    assert_eq!(
        fx.engine.delete_currency(fx.alice, usd.id).await.unwrap(),
        Removal::Removed
    );
    assert_eq!(
        fx.engine.delete_currency(fx.alice, eur.id).await.unwrap(),
        Removal::Archived
    );
    assert_eq!(
        fx.engine.delete_category(fx.alice, food.id).await.unwrap(),
        Removal::Archived
    );

    let active = fx
        .engine
        .dropdown(fx.alice, ReferenceKind::Currencies, fx.alice.user_id, false)
        .await
        .unwrap();
    assert!(active.is_empty());
    let with_deleted = fx
        .engine
        .dropdown(fx.alice, ReferenceKind::Currencies, fx.alice.user_id, true)
        .await
        .unwrap();
    assert_eq!(with_deleted.len(), 1);
    assert_eq!(with_deleted[0].status, EntityStatus::Deleted);

    // A deleted currency cannot back a new account.
    let err = fx
        .engine
        .create_account(
            fx.alice,
            NewAccountCmd::new(fx.alice.user_id, "Other", cash_type(), eur.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));

    // Nor a deleted category a new transaction.
    let err = fx
        .engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::expense(account, food.id, Money::new(5)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));
}

#[tokio::test]
async fn recreating_a_deleted_name_restores_it() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let food = fx.category(fx.alice, "Food").await;
    let account = fx.account(fx.alice, "Wallet", eur.id, 0).await;
    fx.engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::expense(account, food.id, Money::new(5)),
        )
        .await
        .unwrap();
    fx.engine.delete_category(fx.alice, food.id).await.unwrap();

    let restored = fx
        .engine
        .create_category(fx.alice, fx.alice.user_id, "food")
        .await
        .unwrap();
    assert_eq!(restored.id, food.id);
    assert_eq!(restored.name, "food");
    assert_eq!(restored.status, EntityStatus::Active);
}

#[tokio::test]
async fn writes_invalidate_cached_dropdowns() {
    let fx = fixture().await;
    let owner = fx.alice.user_id;

    let empty = fx
        .engine
        .dropdown(fx.alice, ReferenceKind::Categories, owner, false)
        .await
        .unwrap();
    assert!(empty.is_empty());
    // Warm the other variant too.
    fx.engine
        .dropdown(fx.alice, ReferenceKind::Categories, owner, true)
        .await
        .unwrap();

    let food = fx.category(fx.alice, "Food").await;
    for include_deleted in [false, true] {
        let items = fx
            .engine
            .dropdown(fx.alice, ReferenceKind::Categories, owner, include_deleted)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    fx.engine
        .rename_category(fx.alice, food.id, "Groceries")
        .await
        .unwrap();
    let items = fx
        .engine
        .dropdown(fx.alice, ReferenceKind::Categories, owner, false)
        .await
        .unwrap();
    assert_eq!(items[0].name, "Groceries");

    fx.engine.delete_category(fx.alice, food.id).await.unwrap();
    for include_deleted in [false, true] {
        let items = fx
            .engine
            .dropdown(fx.alice, ReferenceKind::Categories, owner, include_deleted)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    let eur = fx.currency(fx.alice, "EUR").await;
    let accounts = fx
        .engine
        .dropdown(fx.alice, ReferenceKind::Accounts, owner, false)
        .await
        .unwrap();
    assert!(accounts.is_empty());
    fx.account(fx.alice, "Wallet", eur.id, 0).await;
    let accounts = fx
        .engine
        .dropdown(fx.alice, ReferenceKind::Accounts, owner, false)
        .await
        .unwrap();
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn dropdowns_of_other_users_need_admin() {
    let fx = fixture().await;
    fx.category(fx.alice, "Food").await;

    let err = fx
        .engine
        .dropdown(fx.bob, ReferenceKind::Categories, fx.alice.user_id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let items = fx
        .engine
        .dropdown(fx.admin, ReferenceKind::Categories, fx.alice.user_id, false)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}
