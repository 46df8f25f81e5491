use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Alias, Expr, Func, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionError, TransactionTrait,
};
use uuid::Uuid;

use phonemart_core::sea_ext::{PageExt, contains_pattern};
use phonemart_domain::id::{OrderId, PhoneId, UserId};
use phonemart_domain::listing::{Brand, Condition as DeviceCondition, ListingSortBy, ListingStatus};
use phonemart_domain::order::OrderStatus;
use phonemart_domain::pagination::{PageRequest, Sort};
use phonemart_domain::user::Role;
use phonemart_marketplace_schema::{cart_items, favorites, order_items, orders, phones, users};

use crate::domain::repository::{
    CartRepository, FavoriteRepository, ListingRepository, OrderRepository, UserRepository,
};
use crate::domain::types::{
    CartLine, ListingFilter, MAX_LINE_QUANTITY, Moderation, Order, OrderItem, Phone, PhoneSpecs,
    ProfilePatch, Rating, StatusCounts, User,
};
use crate::error::MarketplaceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find(&self, id: UserId) -> Result<Option<User>, MarketplaceError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, MarketplaceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .all(&self.db)
            .await
            .context("find users by ids")?;
        models.into_iter().map(user_from_model).collect()
    }

    async fn create(&self, user: &User) -> Result<bool, MarketplaceError> {
        let model = users::ActiveModel {
            id: Set(user.id.0),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            role: Set(user.role.as_str().to_owned()),
            phone_number: Set(user.phone_number.clone()),
            address: Set(user.address.clone()),
            avatar_url: Set(user.avatar_url.clone()),
            rating_total: Set(user.rating.total),
            rating_count: Set(user.rating.count),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        };
        // Conflicts on either the id or the unique email.
        let inserted = users::Entity::insert(model)
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await
            .context("create user")?;
        Ok(inserted > 0)
    }

    async fn update_profile(
        &self,
        id: UserId,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, MarketplaceError> {
        let Some(model) = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user for profile update")?
        else {
            return Ok(None);
        };
        let mut am = model.into_active_model();
        if let Some(name) = &patch.name {
            am.name = Set(name.trim().to_owned());
        }
        if let Some(phone_number) = &patch.phone_number {
            am.phone_number = Set(Some(phone_number.clone()));
        }
        if let Some(address) = &patch.address {
            am.address = Set(Some(address.clone()));
        }
        if let Some(avatar_url) = &patch.avatar_url {
            am.avatar_url = Set(Some(avatar_url.clone()));
        }
        am.updated_at = Set(Utc::now());
        let model = am.update(&self.db).await.context("update user profile")?;
        user_from_model(model).map(Some)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, MarketplaceError> {
        let count = users::Entity::find()
            .filter(users::Column::Role.eq(role.as_str()))
            .count(&self.db)
            .await
            .context("count users by role")?;
        Ok(count)
    }

    async fn record_rating(
        &self,
        id: UserId,
        score: u8,
    ) -> Result<Option<Rating>, MarketplaceError> {
        let updated = users::Entity::update_many()
            .col_expr(
                users::Column::RatingTotal,
                Expr::col(users::Column::RatingTotal).add(i64::from(score)),
            )
            .col_expr(
                users::Column::RatingCount,
                Expr::col(users::Column::RatingCount).add(1i64),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id.0))
            .exec_with_returning(&self.db)
            .await
            .context("record seller rating")?;
        Ok(updated.into_iter().next().map(|m| Rating {
            total: m.rating_total,
            count: m.rating_count,
        }))
    }
}

fn user_from_model(model: users::Model) -> Result<User, MarketplaceError> {
    let role = model
        .role
        .parse::<Role>()
        .with_context(|| format!("user {} has unknown role", model.id))?;
    Ok(User {
        id: UserId(model.id),
        name: model.name,
        email: model.email,
        role,
        phone_number: model.phone_number,
        address: model.address,
        avatar_url: model.avatar_url,
        rating: Rating {
            total: model.rating_total,
            count: model.rating_count,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Favorite repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: DatabaseConnection,
}

impl FavoriteRepository for DbFavoriteRepository {
    async fn toggle(&self, user: UserId, phone: PhoneId) -> Result<bool, MarketplaceError> {
        let removed = favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user.0))
            .filter(favorites::Column::PhoneId.eq(phone.0))
            .exec(&self.db)
            .await
            .context("remove favorite")?;
        if removed.rows_affected > 0 {
            return Ok(false);
        }

        favorites::Entity::insert(favorites::ActiveModel {
            user_id: Set(user.0),
            phone_id: Set(phone.0),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([favorites::Column::UserId, favorites::Column::PhoneId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("add favorite")?;
        Ok(true)
    }

    async fn list(&self, user: UserId) -> Result<Vec<PhoneId>, MarketplaceError> {
        let models = favorites::Entity::find()
            .filter(favorites::Column::UserId.eq(user.0))
            .order_by_asc(favorites::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list favorites")?;
        Ok(models.into_iter().map(|m| PhoneId(m.phone_id)).collect())
    }
}

// ── Listing repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbListingRepository {
    pub db: DatabaseConnection,
}

impl ListingRepository for DbListingRepository {
    async fn find(&self, id: PhoneId) -> Result<Option<Phone>, MarketplaceError> {
        let model = phones::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find phone by id")?;
        model.map(phone_from_model).transpose()
    }

    async fn find_many(&self, ids: &[PhoneId]) -> Result<Vec<Phone>, MarketplaceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = phones::Entity::find()
            .filter(phones::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .all(&self.db)
            .await
            .context("find phones by ids")?;
        let mut by_id: HashMap<Uuid, phones::Model> =
            models.into_iter().map(|m| (m.id, m)).collect();
        ids.iter()
            .filter_map(|id| by_id.remove(&id.0))
            .map(phone_from_model)
            .collect()
    }

    async fn create(&self, phone: &Phone) -> Result<(), MarketplaceError> {
        phones::ActiveModel {
            id: Set(phone.id.0),
            seller_id: Set(phone.seller_id.0),
            title: Set(phone.title.clone()),
            description: Set(phone.description.clone()),
            brand: Set(phone.brand.as_str().to_owned()),
            price: Set(phone.price),
            condition: Set(phone.condition.as_str().to_owned()),
            images: Set(serde_json::json!(phone.images)),
            specs: Set(specs_to_json(&phone.specs)?),
            status: Set(phone.status.as_str().to_owned()),
            is_available: Set(phone.is_available),
            approved_by: Set(phone.approved_by.map(|id| id.0)),
            approved_at: Set(phone.approved_at),
            rejected_at: Set(phone.rejected_at),
            admin_notes: Set(phone.admin_notes.clone()),
            created_at: Set(phone.created_at),
            updated_at: Set(phone.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create phone")?;
        Ok(())
    }

    async fn update_details(&self, phone: &Phone) -> Result<(), MarketplaceError> {
        phones::Entity::update_many()
            .col_expr(phones::Column::Title, Expr::value(phone.title.clone()))
            .col_expr(
                phones::Column::Description,
                Expr::value(phone.description.clone()),
            )
            .col_expr(phones::Column::Brand, Expr::value(phone.brand.as_str()))
            .col_expr(phones::Column::Price, Expr::value(phone.price))
            .col_expr(
                phones::Column::Condition,
                Expr::value(phone.condition.as_str()),
            )
            .col_expr(
                phones::Column::Images,
                Expr::value(serde_json::json!(phone.images)),
            )
            .col_expr(phones::Column::Specs, Expr::value(specs_to_json(&phone.specs)?))
            .col_expr(phones::Column::UpdatedAt, Expr::value(phone.updated_at))
            .filter(phones::Column::Id.eq(phone.id.0))
            .exec(&self.db)
            .await
            .context("update phone details")?;
        Ok(())
    }

    async fn delete(&self, id: PhoneId) -> Result<bool, MarketplaceError> {
        let result = phones::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .context("delete phone")?;
        Ok(result.rows_affected > 0)
    }

    async fn list(
        &self,
        filter: &ListingFilter,
        sort_by: ListingSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Phone>, u64), MarketplaceError> {
        let query = phones::Entity::find().filter(listing_condition(filter));
        let total = query
            .clone()
            .count(&self.db)
            .await
            .context("count phones")?;
        let models = sort_listings(query, sort_by)
            .page(page)
            .all(&self.db)
            .await
            .context("list phones")?;
        let items = models
            .into_iter()
            .map(phone_from_model)
            .collect::<Result<_, _>>()?;
        Ok((items, total))
    }

    async fn count_by_status(
        &self,
        seller: Option<UserId>,
    ) -> Result<StatusCounts, MarketplaceError> {
        let mut query = phones::Entity::find()
            .select_only()
            .column(phones::Column::Status)
            .column_as(phones::Column::Id.count(), "count")
            .group_by(phones::Column::Status);
        if let Some(seller) = seller {
            query = query.filter(phones::Column::SellerId.eq(seller.0));
        }
        let rows: Vec<(String, i64)> = query
            .into_tuple()
            .all(&self.db)
            .await
            .context("count phones by status")?;

        let mut counts = StatusCounts::default();
        for (status, n) in rows {
            let status = status
                .parse::<ListingStatus>()
                .context("phone has unknown status")?;
            counts.add(status, n.max(0) as u64);
        }
        Ok(counts)
    }

    async fn moderate(
        &self,
        id: PhoneId,
        moderation: &Moderation,
    ) -> Result<Option<Phone>, MarketplaceError> {
        let mut update = phones::Entity::update_many()
            .col_expr(
                phones::Column::Status,
                Expr::value(moderation.target_status().as_str()),
            )
            .col_expr(
                phones::Column::AdminNotes,
                Expr::value(moderation.admin_notes().map(str::to_owned)),
            );
        update = match moderation {
            Moderation::Approve { admin, at, .. } => update
                .col_expr(phones::Column::ApprovedBy, Expr::value(admin.0))
                .col_expr(phones::Column::ApprovedAt, Expr::value(*at))
                .col_expr(phones::Column::UpdatedAt, Expr::value(*at)),
            Moderation::Reject { at, .. } => update
                .col_expr(phones::Column::RejectedAt, Expr::value(*at))
                .col_expr(phones::Column::IsAvailable, Expr::value(false))
                .col_expr(phones::Column::UpdatedAt, Expr::value(*at)),
        };
        let updated = update
            .filter(phones::Column::Id.eq(id.0))
            .filter(phones::Column::Status.eq(ListingStatus::Pending.as_str()))
            .exec_with_returning(&self.db)
            .await
            .context("moderate phone")?;
        updated.into_iter().next().map(phone_from_model).transpose()
    }

    async fn approve_pending(
        &self,
        ids: &[PhoneId],
        admin: UserId,
        notes: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Phone>, MarketplaceError> {
        let updated = phones::Entity::update_many()
            .col_expr(
                phones::Column::Status,
                Expr::value(ListingStatus::Approved.as_str()),
            )
            .col_expr(phones::Column::ApprovedBy, Expr::value(admin.0))
            .col_expr(phones::Column::ApprovedAt, Expr::value(at))
            .col_expr(
                phones::Column::AdminNotes,
                Expr::value(notes.map(str::to_owned)),
            )
            .col_expr(phones::Column::UpdatedAt, Expr::value(at))
            .filter(phones::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .filter(phones::Column::Status.eq(ListingStatus::Pending.as_str()))
            .exec_with_returning(&self.db)
            .await
            .context("batch approve phones")?;
        updated.into_iter().map(phone_from_model).collect()
    }
}

fn listing_condition(filter: &ListingFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(status) = filter.status {
        cond = cond.add(phones::Column::Status.eq(status.as_str()));
    }
    if let Some(brand) = filter.brand {
        cond = cond.add(phones::Column::Brand.eq(brand.as_str()));
    }
    if let Some(seller) = filter.seller {
        cond = cond.add(phones::Column::SellerId.eq(seller.0));
    }
    if let Some(exclude) = filter.exclude {
        cond = cond.add(phones::Column::Id.ne(exclude.0));
    }
    if filter.available_only {
        cond = cond.add(phones::Column::IsAvailable.eq(true));
    }
    if let Some(min) = filter.min_price {
        cond = cond.add(phones::Column::Price.gte(min));
    }
    if let Some(max) = filter.max_price {
        cond = cond.add(phones::Column::Price.lte(max));
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = contains_pattern(search);
        cond = cond.add(
            Condition::any()
                .add(Expr::col((phones::Entity, phones::Column::Title)).ilike(pattern.clone()))
                .add(Expr::col((phones::Entity, phones::Column::Brand)).ilike(pattern.clone()))
                .add(Expr::col((phones::Entity, phones::Column::Description)).ilike(pattern)),
        );
    }
    cond
}

fn sort_listings(query: Select<phones::Entity>, sort_by: ListingSortBy) -> Select<phones::Entity> {
    let (column, sort) = match sort_by {
        ListingSortBy::CreatedAt(sort) => (phones::Column::CreatedAt, sort),
        ListingSortBy::UpdatedAt(sort) => (phones::Column::UpdatedAt, sort),
        ListingSortBy::Price(sort) => (phones::Column::Price, sort),
        ListingSortBy::Title(sort) => (phones::Column::Title, sort),
    };
    // Id breaks ties so pages do not overlap.
    match sort {
        Sort::Desc => query
            .order_by_desc(column)
            .order_by_desc(phones::Column::Id),
        Sort::Asc => query.order_by_asc(column).order_by_asc(phones::Column::Id),
    }
}

fn specs_to_json(specs: &PhoneSpecs) -> Result<serde_json::Value, MarketplaceError> {
    Ok(serde_json::to_value(specs).context("encode phone specs")?)
}

fn phone_from_model(model: phones::Model) -> Result<Phone, MarketplaceError> {
    let id = model.id;
    let images: Vec<String> = serde_json::from_value(model.images)
        .with_context(|| format!("phone {id} has malformed images"))?;
    let specs: PhoneSpecs = serde_json::from_value(model.specs)
        .with_context(|| format!("phone {id} has malformed specs"))?;
    Ok(Phone {
        id: PhoneId(id),
        seller_id: UserId(model.seller_id),
        title: model.title,
        description: model.description,
        brand: model.brand.parse::<Brand>().context("phone has unknown brand")?,
        price: model.price,
        condition: model
            .condition
            .parse::<DeviceCondition>()
            .context("phone has unknown condition")?,
        images,
        specs,
        status: model
            .status
            .parse::<ListingStatus>()
            .context("phone has unknown status")?,
        is_available: model.is_available,
        approved_by: model.approved_by.map(UserId),
        approved_at: model.approved_at,
        rejected_at: model.rejected_at,
        admin_notes: model.admin_notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Cart repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCartRepository {
    pub db: DatabaseConnection,
}

fn db_quantity(quantity: u32) -> Result<i32, MarketplaceError> {
    i32::try_from(quantity).map_err(|_| MarketplaceError::InvalidQuantity)
}

impl CartRepository for DbCartRepository {
    async fn add(
        &self,
        user: UserId,
        phone: PhoneId,
        quantity: u32,
    ) -> Result<(), MarketplaceError> {
        let line = cart_items::ActiveModel {
            user_id: Set(user.0),
            phone_id: Set(phone.0),
            quantity: Set(db_quantity(quantity)?),
            added_at: Set(Utc::now()),
        };
        cart_items::Entity::insert(line)
            .on_conflict(
                OnConflict::columns([cart_items::Column::UserId, cart_items::Column::PhoneId])
                    .value(
                        cart_items::Column::Quantity,
                        Func::least([
                            Expr::col((cart_items::Entity, cart_items::Column::Quantity)).add(
                                Expr::col((Alias::new("excluded"), cart_items::Column::Quantity)),
                            ),
                            Expr::value(db_quantity(MAX_LINE_QUANTITY)?),
                        ]),
                    )
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("add cart line")?;
        Ok(())
    }

    async fn set_quantity(
        &self,
        user: UserId,
        phone: PhoneId,
        quantity: u32,
    ) -> Result<bool, MarketplaceError> {
        let result = cart_items::Entity::update_many()
            .col_expr(
                cart_items::Column::Quantity,
                Expr::value(db_quantity(quantity)?),
            )
            .filter(cart_items::Column::UserId.eq(user.0))
            .filter(cart_items::Column::PhoneId.eq(phone.0))
            .exec(&self.db)
            .await
            .context("set cart line quantity")?;
        Ok(result.rows_affected > 0)
    }

    async fn remove(&self, user: UserId, phone: PhoneId) -> Result<bool, MarketplaceError> {
        let result = cart_items::Entity::delete_many()
            .filter(cart_items::Column::UserId.eq(user.0))
            .filter(cart_items::Column::PhoneId.eq(phone.0))
            .exec(&self.db)
            .await
            .context("remove cart line")?;
        Ok(result.rows_affected > 0)
    }

    async fn clear(&self, user: UserId) -> Result<(), MarketplaceError> {
        cart_items::Entity::delete_many()
            .filter(cart_items::Column::UserId.eq(user.0))
            .exec(&self.db)
            .await
            .context("clear cart")?;
        Ok(())
    }

    async fn lines(&self, user: UserId) -> Result<Vec<CartLine>, MarketplaceError> {
        let rows = cart_items::Entity::find()
            .filter(cart_items::Column::UserId.eq(user.0))
            .order_by_asc(cart_items::Column::AddedAt)
            .find_also_related(phones::Entity)
            .all(&self.db)
            .await
            .context("list cart lines")?;
        rows.into_iter()
            .filter_map(|(line, phone)| phone.map(|phone| (line, phone)))
            .map(|(line, phone)| {
                Ok(CartLine {
                    phone: phone_from_model(phone)?,
                    quantity: u32::try_from(line.quantity).unwrap_or(0),
                    added_at: line.added_at,
                })
            })
            .collect()
    }
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl DbOrderRepository {
    async fn with_items(&self, models: Vec<orders::Model>) -> Result<Vec<Order>, MarketplaceError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let items = order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(models.iter().map(|m| m.id)))
            .order_by_asc(order_items::Column::Position)
            .all(&self.db)
            .await
            .context("list order items")?;
        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(OrderItem {
                phone_id: PhoneId(item.phone_id),
                seller_id: UserId(item.seller_id),
                title: item.title,
                quantity: u32::try_from(item.quantity).unwrap_or(0),
                unit_price: item.unit_price,
            });
        }
        models
            .into_iter()
            .map(|m| {
                let items = by_order.remove(&m.id).unwrap_or_default();
                order_from_model(m, items)
            })
            .collect()
    }
}

impl OrderRepository for DbOrderRepository {
    async fn place(&self, order: &Order) -> Result<(), MarketplaceError> {
        let order = order.clone();
        let result = self
            .db
            .transaction::<_, (), MarketplaceError>(|txn| {
                Box::pin(async move {
                    for item in &order.items {
                        let flipped = phones::Entity::update_many()
                            .col_expr(phones::Column::IsAvailable, Expr::value(false))
                            .col_expr(phones::Column::UpdatedAt, Expr::value(order.created_at))
                            .filter(phones::Column::Id.eq(item.phone_id.0))
                            .filter(phones::Column::IsAvailable.eq(true))
                            .filter(
                                phones::Column::Status.eq(ListingStatus::Approved.as_str()),
                            )
                            .exec(txn)
                            .await
                            .context("mark phone sold")?;
                        if flipped.rows_affected == 0 {
                            return Err(MarketplaceError::ListingSoldOut);
                        }
                    }

                    orders::ActiveModel {
                        id: Set(order.id.0),
                        buyer_id: Set(order.buyer_id.0),
                        total_amount: Set(order.total_amount),
                        delivery_address: Set(order.delivery_address.clone()),
                        contact_number: Set(order.contact_number.clone()),
                        status: Set(order.status.as_str().to_owned()),
                        created_at: Set(order.created_at),
                        updated_at: Set(order.updated_at),
                    }
                    .insert(txn)
                    .await
                    .context("insert order")?;

                    for (position, item) in order.items.iter().enumerate() {
                        order_items::ActiveModel {
                            id: Set(Uuid::now_v7()),
                            order_id: Set(order.id.0),
                            phone_id: Set(item.phone_id.0),
                            seller_id: Set(item.seller_id.0),
                            title: Set(item.title.clone()),
                            quantity: Set(db_quantity(item.quantity)?),
                            unit_price: Set(item.unit_price),
                            position: Set(position as i32),
                        }
                        .insert(txn)
                        .await
                        .context("insert order item")?;
                    }

                    cart_items::Entity::delete_many()
                        .filter(cart_items::Column::UserId.eq(order.buyer_id.0))
                        .exec(txn)
                        .await
                        .context("clear cart after order")?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Transaction(e)) => Err(e),
            Err(TransactionError::Connection(e)) => {
                Err(anyhow::Error::new(e).context("place order").into())
            }
        }
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, MarketplaceError> {
        let Some(model) = orders::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find order by id")?
        else {
            return Ok(None);
        };
        Ok(self.with_items(vec![model]).await?.pop())
    }

    async fn list_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>, MarketplaceError> {
        let models = orders::Entity::find()
            .filter(orders::Column::BuyerId.eq(buyer.0))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list orders by buyer")?;
        self.with_items(models).await
    }

    async fn list_containing_seller(
        &self,
        seller: UserId,
    ) -> Result<Vec<Order>, MarketplaceError> {
        let models = orders::Entity::find()
            .filter(
                orders::Column::Id.in_subquery(
                    Query::select()
                        .column(order_items::Column::OrderId)
                        .from(order_items::Entity)
                        .and_where(Expr::col(order_items::Column::SellerId).eq(seller.0))
                        .to_owned(),
                ),
            )
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list orders containing seller")?;
        self.with_items(models).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, MarketplaceError> {
        let updated = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(to.as_str()))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(id.0))
            .filter(orders::Column::Status.eq(from.as_str()))
            .exec_with_returning(&self.db)
            .await
            .context("update order status")?;
        Ok(self.with_items(updated).await?.pop())
    }
}

fn order_from_model(model: orders::Model, items: Vec<OrderItem>) -> Result<Order, MarketplaceError> {
    Ok(Order {
        id: OrderId(model.id),
        buyer_id: UserId(model.buyer_id),
        items,
        total_amount: model.total_amount,
        delivery_address: model.delivery_address,
        contact_number: model.contact_number,
        status: model
            .status
            .parse::<OrderStatus>()
            .with_context(|| format!("order {} has unknown status", model.id))?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
