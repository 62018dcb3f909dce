//! Initial schema migration.
//!
//! - `users`: people owning data, with a `user`/`admin` role
//! - `account_types`: cash, bank, savings... (system defaults have no owner)
//! - `currencies`: user defined currencies
//! - `categories`: income/expense categories (the reserved one has no owner)
//! - `accounts`: money containers with a denormalized `balance_minor`
//! - `transactions`: income/expense rows, one of them may be the initial balance
//! - `messages` / `message_replies`: user ⇄ admin conversations

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
    Role,
    CreatedOn,
}

#[derive(Iden, Clone, Copy)]
enum AccountTypes {
    Table,
    Id,
    Name,
    NameNorm,
    OwnerId,
    Status,
}

#[derive(Iden, Clone, Copy)]
enum Currencies {
    Table,
    Id,
    Name,
    NameNorm,
    OwnerId,
    Status,
}

#[derive(Iden, Clone, Copy)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    OwnerId,
    Status,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    NameNorm,
    BalanceMinor,
    OwnerId,
    AccountTypeId,
    CurrencyId,
    Status,
    CreatedOn,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    AccountId,
    OwnerId,
    CategoryId,
    Kind,
    AmountMinor,
    CreatedOn,
    Reference,
    IsInitialBalance,
}

#[derive(Iden)]
enum Messages {
    Table,
    Id,
    AuthorId,
    Subject,
    Body,
    CreatedOn,
    SeenByAuthor,
    SeenByAdmin,
}

#[derive(Iden)]
enum MessageReplies {
    Table,
    Id,
    MessageId,
    AuthorId,
    Body,
    CreatedOn,
}

/// Builds the shared shape of the owner scoped reference tables
/// (`account_types`, `currencies`, `categories`).
fn reference_table<T>(
    table: T,
    id: T,
    name: T,
    name_norm: T,
    owner_id: T,
    status: T,
) -> TableCreateStatement
where
    T: Iden + Copy + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).blob().not_null().primary_key())
        .col(ColumnDef::new(name).string().not_null())
        .col(ColumnDef::new(name_norm).string().not_null())
        .col(ColumnDef::new(owner_id).blob())
        .col(
            ColumnDef::new(status)
                .string()
                .not_null()
                .default("active"),
        )
        .foreign_key(
            ForeignKey::create()
                .from(table, owner_id)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(ColumnDef::new(Users::CreatedOn).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Reference tables
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(reference_table(
                AccountTypes::Table,
                AccountTypes::Id,
                AccountTypes::Name,
                AccountTypes::NameNorm,
                AccountTypes::OwnerId,
                AccountTypes::Status,
            ))
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-account_types-owner_id-name_norm-unique")
                    .table(AccountTypes::Table)
                    .col(AccountTypes::OwnerId)
                    .col(AccountTypes::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(reference_table(
                Currencies::Table,
                Currencies::Id,
                Currencies::Name,
                Currencies::NameNorm,
                Currencies::OwnerId,
                Currencies::Status,
            ))
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-currencies-owner_id-name_norm-unique")
                    .table(Currencies::Table)
                    .col(Currencies::OwnerId)
                    .col(Currencies::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(reference_table(
                Categories::Table,
                Categories::Id,
                Categories::Name,
                Categories::NameNorm,
                Categories::OwnerId,
                Categories::Status,
            ))
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx-categories-owner_id-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::OwnerId)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::NameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::OwnerId).blob().not_null())
                    .col(ColumnDef::new(Accounts::AccountTypeId).blob().not_null())
                    .col(ColumnDef::new(Accounts::CurrencyId).blob().not_null())
                    .col(
                        ColumnDef::new(Accounts::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Accounts::CreatedOn).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-owner_id")
                            .from(Accounts::Table, Accounts::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-account_type_id")
                            .from(Accounts::Table, Accounts::AccountTypeId)
                            .to(AccountTypes::Table, AccountTypes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-currency_id")
                            .from(Accounts::Table, Accounts::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-owner_id")
                    .table(Accounts::Table)
                    .col(Accounts::OwnerId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::AccountId).blob().not_null())
                    .col(ColumnDef::new(Transactions::OwnerId).blob().not_null())
                    .col(ColumnDef::new(Transactions::CategoryId).blob().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedOn)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Reference).string())
                    .col(
                        ColumnDef::new(Transactions::IsInitialBalance)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-owner_id")
                            .from(Transactions::Table, Transactions::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-category_id")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-owner_id-created_on")
                    .table(Transactions::Table)
                    .col(Transactions::OwnerId)
                    .col(Transactions::CreatedOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .to_owned(),
            )
            .await?;

        // At most one initial balance row per account.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS \"idx-transactions-account_id-initial-unique\" \
                 ON transactions (account_id) WHERE is_initial_balance = 1",
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Messages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Messages::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Messages::AuthorId).blob().not_null())
                    .col(ColumnDef::new(Messages::Subject).string().not_null())
                    .col(ColumnDef::new(Messages::Body).text().not_null())
                    .col(ColumnDef::new(Messages::CreatedOn).timestamp().not_null())
                    .col(
                        ColumnDef::new(Messages::SeenByAuthor)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Messages::SeenByAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-messages-author_id")
                            .from(Messages::Table, Messages::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MessageReplies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MessageReplies::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MessageReplies::MessageId).blob().not_null())
                    .col(ColumnDef::new(MessageReplies::AuthorId).blob().not_null())
                    .col(ColumnDef::new(MessageReplies::Body).text().not_null())
                    .col(
                        ColumnDef::new(MessageReplies::CreatedOn)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-message_replies-message_id")
                            .from(MessageReplies::Table, MessageReplies::MessageId)
                            .to(Messages::Table, Messages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-message_replies-author_id")
                            .from(MessageReplies::Table, MessageReplies::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-message_replies-message_id")
                    .table(MessageReplies::Table)
                    .col(MessageReplies::MessageId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(MessageReplies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Currencies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
