use sea_orm::entity::prelude::*;

/// A phone in a user's favorites, ordered by `created_at`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "favorites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub phone_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::phones::Entity",
        from = "Column::PhoneId",
        to = "super::phones::Column::Id"
    )]
    Phone,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::phones::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Phone.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
