use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Phones::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Phones::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Phones::SellerId).uuid().not_null())
                    .col(ColumnDef::new(Phones::Title).string().not_null())
                    .col(
                        ColumnDef::new(Phones::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Phones::Brand).string().not_null())
                    .col(ColumnDef::new(Phones::Price).big_integer().not_null())
                    .col(ColumnDef::new(Phones::Condition).string().not_null())
                    .col(ColumnDef::new(Phones::Images).json_binary().not_null())
                    .col(ColumnDef::new(Phones::Specs).json_binary().not_null())
                    .col(
                        ColumnDef::new(Phones::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Phones::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Phones::ApprovedBy).uuid())
                    .col(ColumnDef::new(Phones::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Phones::RejectedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Phones::AdminNotes).text())
                    .col(
                        ColumnDef::new(Phones::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Phones::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Phones::Table, Phones::SellerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Phones::Table, Phones::ApprovedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Phones::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Phones {
    Table,
    Id,
    SellerId,
    Title,
    Description,
    Brand,
    Price,
    Condition,
    Images,
    Specs,
    Status,
    IsAvailable,
    ApprovedBy,
    ApprovedAt,
    RejectedAt,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
