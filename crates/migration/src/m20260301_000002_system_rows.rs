//! Seeds rows that every installation needs and no user owns:
//!
//! - the reserved `Initial Balance` category used by opening transactions
//! - the default account types (`Cash`, `Bank`, `Savings`)

use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    OwnerId,
    Status,
}

#[derive(Iden)]
enum AccountTypes {
    Table,
    Id,
    Name,
    NameNorm,
    OwnerId,
    Status,
}

/// Stable id of the reserved `Initial Balance` category.
pub const INITIAL_BALANCE_CATEGORY_ID: Uuid =
    Uuid::from_u128(0x6c0f_1d3e_2b4a_4f6e_9a51_0000_0000_0001);

/// Stable ids and names of the system account types.
pub const DEFAULT_ACCOUNT_TYPES: [(Uuid, &str); 3] = [
    (Uuid::from_u128(0x6c0f_1d3e_2b4a_4f6e_9a51_0000_0000_0101), "Cash"),
    (Uuid::from_u128(0x6c0f_1d3e_2b4a_4f6e_9a51_0000_0000_0102), "Bank"),
    (Uuid::from_u128(0x6c0f_1d3e_2b4a_4f6e_9a51_0000_0000_0103), "Savings"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert
            .into_table(Categories::Table)
            .columns([
                Categories::Id,
                Categories::Name,
                Categories::NameNorm,
                Categories::OwnerId,
                Categories::Status,
            ])
            .values([
                INITIAL_BALANCE_CATEGORY_ID.into(),
                "Initial Balance".into(),
                "initial balance".into(),
                Option::<Uuid>::None.into(),
                "active".into(),
            ])
            .map_err(|err| DbErr::Custom(err.to_string()))?;
        manager.exec_stmt(insert).await?;

        let mut insert = Query::insert();
        insert.into_table(AccountTypes::Table).columns([
            AccountTypes::Id,
            AccountTypes::Name,
            AccountTypes::NameNorm,
            AccountTypes::OwnerId,
            AccountTypes::Status,
        ]);
        for (id, name) in DEFAULT_ACCOUNT_TYPES {
            insert
                .values([
                    id.into(),
                    name.into(),
                    name.to_lowercase().into(),
                    Option::<Uuid>::None.into(),
                    "active".into(),
                ])
                .map_err(|err| DbErr::Custom(err.to_string()))?;
        }
        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Categories::Table)
            .and_where(Expr::col(Categories::Id).eq(INITIAL_BALANCE_CATEGORY_ID))
            .to_owned();
        manager.exec_stmt(delete).await?;

        let ids: Vec<Uuid> = DEFAULT_ACCOUNT_TYPES.iter().map(|(id, _)| *id).collect();
        let delete = Query::delete()
            .from_table(AccountTypes::Table)
            .and_where(Expr::col(AccountTypes::Id).is_in(ids))
            .to_owned();
        manager.exec_stmt(delete).await?;
        Ok(())
    }
}
