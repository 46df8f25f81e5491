use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // user_id comes from the identity provider; a profile row is not required.
        manager
            .create_table(
                Table::create()
                    .table(CartItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CartItems::UserId).uuid().not_null())
                    .col(ColumnDef::new(CartItems::PhoneId).uuid().not_null())
                    .col(
                        ColumnDef::new(CartItems::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(CartItems::Quantity).gt(0)),
                    )
                    .col(
                        ColumnDef::new(CartItems::AddedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(CartItems::UserId)
                            .col(CartItems::PhoneId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CartItems::Table, CartItems::PhoneId)
                            .to(Phones::Table, Phones::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CartItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CartItems {
    Table,
    UserId,
    PhoneId,
    Quantity,
    AddedAt,
}

#[derive(Iden)]
enum Phones {
    Table,
    Id,
}
