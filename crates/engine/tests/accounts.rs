mod common;

use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

use engine::{
    EngineError, EntityStatus, Money, NewAccountCmd, NewTransactionCmd, Removal, TransactionKind,
    UpdateAccountCmd, UpdateTransactionCmd,
};

use common::{cash_type, fixture};

#[tokio::test]
async fn initial_balance_becomes_a_signed_transaction() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;

    let positive = fx.account(fx.alice, "Savings", eur.id, 10_000).await;
    let negative = fx.account(fx.alice, "Credit", eur.id, -2_500).await;
    let empty = fx.account(fx.alice, "Empty", eur.id, 0).await;

    let detail = fx.engine.account(fx.alice, positive).await.unwrap();
    assert_eq!(detail.account.balance, Money::new(10_000));
    assert_eq!(detail.initial_balance, Money::new(10_000));
    assert_eq!(detail.account_type, "Cash");
    assert_eq!(detail.currency, "EUR");

    let detail = fx.engine.account(fx.alice, negative).await.unwrap();
    assert_eq!(detail.account.balance, Money::new(-2_500));
    assert_eq!(detail.initial_balance, Money::new(-2_500));

    let detail = fx.engine.account(fx.alice, empty).await.unwrap();
    assert_eq!(detail.initial_balance, Money::ZERO);

    for account in [positive, negative, empty] {
        fx.assert_consistent(fx.alice, account).await;
    }
}

#[tokio::test]
async fn updating_initial_balance_shifts_the_balance() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let food = fx.category(fx.alice, "Food").await;
    let account = fx.account(fx.alice, "Wallet", eur.id, 0).await;
    fx.engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::expense(account, food.id, Money::new(300)),
        )
        .await
        .unwrap();

    // create
    let updated = fx
        .engine
        .update_account(
            fx.alice,
            UpdateAccountCmd::new(account).initial_balance(Money::new(1_000)),
        )
        .await
        .unwrap();
    assert_eq!(updated.balance, Money::new(700));

    // update, flipping the sign
    let updated = fx
        .engine
        .update_account(
            fx.alice,
            UpdateAccountCmd::new(account).initial_balance(Money::new(-200)),
        )
        .await
        .unwrap();
    assert_eq!(updated.balance, Money::new(-500));
    let detail = fx.engine.account(fx.alice, account).await.unwrap();
    assert_eq!(detail.initial_balance, Money::new(-200));

    // remove
    let updated = fx
        .engine
        .update_account(
            fx.alice,
            UpdateAccountCmd::new(account).initial_balance(Money::ZERO),
        )
        .await
        .unwrap();
    assert_eq!(updated.balance, Money::new(-300));
    fx.assert_consistent(fx.alice, account).await;
}

#[tokio::test]
async fn only_one_initial_balance_row_per_account() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let account = fx.account(fx.alice, "Wallet", eur.id, 100).await;

    for amount in [200, 300, -50] {
        fx.engine
            .update_account(
                fx.alice,
                UpdateAccountCmd::new(account).initial_balance(Money::new(amount)),
            )
            .await
            .unwrap();
    }

    let backend = fx.db.get_database_backend();
    let count: i64 = fx
        .db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS n FROM transactions WHERE account_id = ? AND is_initial_balance = 1",
            vec![account.into()],
        ))
        .await
        .unwrap()
        .unwrap()
        .try_get("", "n")
        .unwrap();
    assert_eq!(count, 1);

    // The schema refuses a second one as well.
    let duplicate = fx
        .db
        .execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO transactions \
             (id, account_id, owner_id, category_id, kind, amount_minor, created_on, is_initial_balance) \
             VALUES (?, ?, ?, ?, 'income', 1, ?, 1)",
            vec![
                Uuid::new_v4().into(),
                account.into(),
                fx.alice.user_id.into(),
                migration::INITIAL_BALANCE_CATEGORY_ID.into(),
                Utc::now().into(),
            ],
        ))
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn initial_balance_outside_i64_is_rejected() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;

    let err = fx
        .engine
        .create_account(
            fx.alice,
            NewAccountCmd::new(fx.alice.user_id, "Broken", cash_type(), eur.id)
                .initial_balance(Money::new(i64::MIN)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let account = fx.account(fx.alice, "Credit", eur.id, -100).await;
    for amount in [i64::MAX, i64::MIN] {
        let err = fx
            .engine
            .update_account(
                fx.alice,
                UpdateAccountCmd::new(account).initial_balance(Money::new(amount)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
    assert_eq!(fx.balance(fx.alice, account).await, -100);
    let detail = fx.engine.account(fx.alice, account).await.unwrap();
    assert_eq!(detail.initial_balance, Money::new(-100));
    fx.assert_consistent(fx.alice, account).await;
}

#[tokio::test]
async fn transaction_overflowing_the_balance_is_rejected() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let salary = fx.category(fx.alice, "Salary").await;
    let food = fx.category(fx.alice, "Food").await;
    let account = fx.account(fx.alice, "Vault", eur.id, i64::MAX - 10).await;

    let err = fx
        .engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::income(account, salary.id, Money::new(100)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(fx.balance(fx.alice, account).await, i64::MAX - 10);

    // Right at the upper bound is still fine.
    fx.engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::income(account, salary.id, Money::new(10)),
        )
        .await
        .unwrap();
    assert_eq!(fx.balance(fx.alice, account).await, i64::MAX);

    let debt = fx.account(fx.alice, "Debt", eur.id, i64::MIN + 1).await;
    let err = fx
        .engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::expense(debt, food.id, Money::new(2)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(fx.balance(fx.alice, debt).await, i64::MIN + 1);
    fx.assert_consistent(fx.alice, account).await;
    fx.assert_consistent(fx.alice, debt).await;
}

#[tokio::test]
async fn delete_is_hard_without_history_and_soft_with_history() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let food = fx.category(fx.alice, "Food").await;
    let fresh = fx.account(fx.alice, "Fresh", eur.id, 5_000).await;
    let used = fx.account(fx.alice, "Used", eur.id, 5_000).await;
    let tx = fx
        .engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::expense(used, food.id, Money::new(10)),
        )
        .await
        .unwrap();

    let removal = fx.engine.delete_account(fx.alice, fresh).await.unwrap();
    assert_eq!(removal, Removal::Removed);
    let err = fx.engine.account(fx.alice, fresh).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));

    let removal = fx.engine.delete_account(fx.alice, used).await.unwrap();
    assert_eq!(removal, Removal::Archived);
    let detail = fx.engine.account(fx.alice, used).await.unwrap();
    assert_eq!(detail.account.status, EntityStatus::Deleted);
    assert_eq!(detail.account.balance, Money::new(4_990));

    // A deleted account keeps its history read-only.
    let err = fx
        .engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::expense(used, food.id, Money::new(1)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));
    let err = fx
        .engine
        .update_transaction(fx.alice, UpdateTransactionCmd::new(tx.id).amount(Money::new(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOperation(_)));

    let active = fx
        .engine
        .list_accounts(fx.alice, fx.alice.user_id, false)
        .await
        .unwrap();
    assert!(active.is_empty());
    let all = fx
        .engine
        .list_accounts(fx.alice, fx.alice.user_id, true)
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn account_names_are_unique_per_owner() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    fx.account(fx.alice, "Main", eur.id, 0).await;

    let err = fx
        .engine
        .create_account(
            fx.alice,
            NewAccountCmd::new(fx.alice.user_id, "  main ", cash_type(), eur.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let bob_eur = fx.currency(fx.bob, "EUR").await;
    fx.account(fx.bob, "Main", bob_eur.id, 0).await;
}

#[tokio::test]
async fn accounts_require_own_active_references() {
    let fx = fixture().await;
    let bob_eur = fx.currency(fx.bob, "EUR").await;

    let err = fx
        .engine
        .create_account(
            fx.alice,
            NewAccountCmd::new(fx.alice.user_id, "Main", cash_type(), bob_eur.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = fx
        .engine
        .create_account(
            fx.bob,
            NewAccountCmd::new(fx.alice.user_id, "Main", cash_type(), bob_eur.id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // Admins open accounts for other users.
    let account = fx
        .engine
        .create_account(
            fx.admin,
            NewAccountCmd::new(fx.bob.user_id, "Main", cash_type(), bob_eur.id),
        )
        .await
        .unwrap();
    assert_eq!(account.owner_id, fx.bob.user_id);
}

#[tokio::test]
async fn balances_are_totalled_per_currency() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let usd = fx.currency(fx.alice, "USD").await;
    fx.account(fx.alice, "Cash", eur.id, 1_000).await;
    fx.account(fx.alice, "Bank", eur.id, 2_000).await;
    fx.account(fx.alice, "Brokerage", usd.id, 700).await;
    let closed = fx.account(fx.alice, "Closed", usd.id, 0).await;
    fx.engine.delete_account(fx.alice, closed).await.unwrap();

    let totals = fx
        .engine
        .balances_by_currency(fx.alice, fx.alice.user_id)
        .await
        .unwrap();
    let totals: Vec<(String, i64)> = totals
        .into_iter()
        .map(|t| (t.currency, t.balance.minor()))
        .collect();
    assert_eq!(
        totals,
        vec![("EUR".to_string(), 3_000), ("USD".to_string(), 700)]
    );
}

#[tokio::test]
async fn cash_flow_groups_by_currency_and_skips_initial_balances() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let usd = fx.currency(fx.alice, "USD").await;
    let salary = fx.category(fx.alice, "Salary").await;
    let food = fx.category(fx.alice, "Food").await;
    let rent = fx.category(fx.alice, "Rent").await;
    let eur_account = fx.account(fx.alice, "EUR wallet", eur.id, 50_000).await;
    let usd_account = fx.account(fx.alice, "USD wallet", usd.id, 0).await;

    let day = Utc.with_ymd_and_hms(2026, 2, 10, 9, 0, 0).unwrap();
    let entries = [
        (eur_account, salary.id, TransactionKind::Income, 3_000),
        (eur_account, food.id, TransactionKind::Expense, 200),
        (eur_account, food.id, TransactionKind::Expense, 300),
        (eur_account, rent.id, TransactionKind::Expense, 1_000),
        (usd_account, salary.id, TransactionKind::Income, 900),
    ];
    for (account, category, kind, amount) in entries {
        fx.engine
            .create_transaction(
                fx.alice,
                NewTransactionCmd::new(account, category, kind, Money::new(amount), day),
            )
            .await
            .unwrap();
    }
    // Outside of the period.
    fx.engine
        .create_transaction(
            fx.alice,
            NewTransactionCmd::new(
                eur_account,
                food.id,
                TransactionKind::Expense,
                Money::new(7),
                day + Duration::days(40),
            ),
        )
        .await
        .unwrap();

    let from = Some(day - Duration::days(1));
    let to = Some(day + Duration::days(1));
    let totals = fx
        .engine
        .cash_flow(fx.alice, fx.alice.user_id, from, to)
        .await
        .unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].currency, "EUR");
    assert_eq!(totals[0].income, Money::new(3_000));
    assert_eq!(totals[0].expense, Money::new(1_500));
    assert_eq!(totals[0].net(), Some(Money::new(1_500)));
    assert_eq!(totals[1].currency, "USD");
    assert_eq!(totals[1].income, Money::new(900));
    assert_eq!(totals[1].expense, Money::ZERO);

    let by_category = fx
        .engine
        .cash_flow_by_category(fx.alice, fx.alice.user_id, from, to)
        .await
        .unwrap();
    let rows: Vec<(String, String, TransactionKind, i64)> = by_category
        .into_iter()
        .map(|r| (r.currency, r.category, r.kind, r.total.minor()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("EUR".to_string(), "Food".to_string(), TransactionKind::Expense, 500),
            ("EUR".to_string(), "Rent".to_string(), TransactionKind::Expense, 1_000),
            ("EUR".to_string(), "Salary".to_string(), TransactionKind::Income, 3_000),
            ("USD".to_string(), "Salary".to_string(), TransactionKind::Income, 900),
        ]
    );

    let err = fx
        .engine
        .cash_flow(fx.bob, fx.alice.user_id, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn recompute_repairs_a_drifted_balance() {
    let fx = fixture().await;
    let eur = fx.currency(fx.alice, "EUR").await;
    let account = fx.account(fx.alice, "Wallet", eur.id, 1_234).await;

    let backend = fx.db.get_database_backend();
    fx.db
        .execute(Statement::from_sql_and_values(
            backend,
            "UPDATE accounts SET balance_minor = 0 WHERE id = ?",
            vec![account.into()],
        ))
        .await
        .unwrap();

    let balance = fx
        .engine
        .recompute_account_balance(fx.alice, account)
        .await
        .unwrap();
    assert_eq!(balance, Money::new(1_234));
    assert_eq!(fx.balance(fx.alice, account).await, 1_234);
}
