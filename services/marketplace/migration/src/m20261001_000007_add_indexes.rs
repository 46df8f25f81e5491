use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXES: [&str; 5] = [
    "idx_phones_status_created_at",
    "idx_phones_seller_id",
    "idx_order_items_seller_id",
    "idx_order_items_order_id",
    "idx_orders_buyer_id_created_at",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(Phones::Table)
                    .col(Phones::Status)
                    .col(Phones::CreatedAt)
                    .name(INDEXES[0])
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Phones::Table)
                    .col(Phones::SellerId)
                    .name(INDEXES[1])
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(OrderItems::Table)
                    .col(OrderItems::SellerId)
                    .name(INDEXES[2])
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .name(INDEXES[3])
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Orders::Table)
                    .col(Orders::BuyerId)
                    .col(Orders::CreatedAt)
                    .name(INDEXES[4])
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in INDEXES.iter().rev() {
            manager
                .drop_index(Index::drop().name(*name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Phones {
    Table,
    Status,
    SellerId,
    CreatedAt,
}

#[derive(Iden)]
enum OrderItems {
    Table,
    OrderId,
    SellerId,
}

#[derive(Iden)]
enum Orders {
    Table,
    BuyerId,
    CreatedAt,
}
