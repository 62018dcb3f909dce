#![allow(dead_code)]

use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{Actor, Engine, NewAccountCmd, Money, ReferenceItem, Role};
use migration::MigratorTrait;

pub struct Fixture {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub alice: Actor,
    pub bob: Actor,
    pub admin: Actor,
}

pub async fn fixture() -> Fixture {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    let alice = engine
        .create_user("Alice", "alice@example.com", "alice-pw", Role::User)
        .await
        .unwrap();
    let bob = engine
        .create_user("Bob", "bob@example.com", "bob-pw", Role::User)
        .await
        .unwrap();
    let admin = engine
        .create_user("Root", "root@example.com", "root-pw", Role::Admin)
        .await
        .unwrap();

    Fixture {
        engine,
        db,
        alice: Actor::user(alice.id),
        bob: Actor::user(bob.id),
        admin: Actor::admin(admin.id),
    }
}

/// Id of the system "Cash" account type.
pub fn cash_type() -> Uuid {
    migration::DEFAULT_ACCOUNT_TYPES[0].0
}

impl Fixture {
    pub async fn currency(&self, actor: Actor, name: &str) -> ReferenceItem {
        self.engine
            .create_currency(actor, actor.user_id, name)
            .await
            .unwrap()
    }

    pub async fn category(&self, actor: Actor, name: &str) -> ReferenceItem {
        self.engine
            .create_category(actor, actor.user_id, name)
            .await
            .unwrap()
    }

    /// Opens a Cash account in `currency_id`.
    pub async fn account(
        &self,
        actor: Actor,
        name: &str,
        currency_id: Uuid,
        initial: i64,
    ) -> Uuid {
        self.engine
            .create_account(
                actor,
                NewAccountCmd::new(actor.user_id, name, cash_type(), currency_id)
                    .initial_balance(Money::new(initial)),
            )
            .await
            .unwrap()
            .id
    }

    pub async fn balance(&self, actor: Actor, account_id: Uuid) -> i64 {
        self.engine
            .account(actor, account_id)
            .await
            .unwrap()
            .account
            .balance
            .minor()
    }

    /// Asserts the stored balance equals the signed sum of the ledger.
    pub async fn assert_consistent(&self, actor: Actor, account_id: Uuid) {
        let stored = self.balance(actor, account_id).await;
        let recomputed = self
            .engine
            .recompute_account_balance(actor, account_id)
            .await
            .unwrap();
        assert_eq!(stored, recomputed.minor());
    }
}
