use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::{OrderId, PhoneId, UserId};
use phonemart_domain::listing::{Brand, Condition, ListingSortBy, ListingStatus};
use phonemart_domain::order::OrderStatus;
use phonemart_domain::pagination::{PageRequest, Sort};
use phonemart_domain::user::Role;

use phonemart_marketplace::domain::repository::{
    CartRepository, FavoriteRepository, ListingRepository, OrderRepository, SideEffectPort,
    UserRepository,
};
use phonemart_marketplace::domain::types::{
    CartLine, Email, ListingDraft, ListingFilter, MAX_LINE_QUANTITY, Moderation, Notification,
    Order, Phone, PhoneSpecs, ProfilePatch, Rating, StatusCounts, User,
};
use phonemart_marketplace::error::MarketplaceError;
use phonemart_marketplace::usecase::effects::Effect;

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StoreData {
    pub users: Vec<User>,
    pub phones: Vec<Phone>,
    pub favorites: Vec<(UserId, PhoneId)>,
    pub cart: Vec<CartRow>,
    pub orders: Vec<Order>,
    /// `moderate` calls that found the listing no longer pending.
    pub moderation_misses: usize,
}

#[derive(Debug, Clone)]
pub struct CartRow {
    pub user: UserId,
    pub phone: PhoneId,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

/// In-memory backing shared by every mock repository.
#[derive(Clone, Default)]
pub struct Store {
    pub data: Arc<Mutex<StoreData>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> MockUserRepo {
        MockUserRepo {
            store: self.clone(),
        }
    }

    pub fn favorites(&self) -> MockFavoriteRepo {
        MockFavoriteRepo {
            store: self.clone(),
        }
    }

    pub fn listings(&self) -> MockListingRepo {
        MockListingRepo {
            store: self.clone(),
        }
    }

    pub fn carts(&self) -> MockCartRepo {
        MockCartRepo {
            store: self.clone(),
        }
    }

    pub fn orders(&self) -> MockOrderRepo {
        MockOrderRepo {
            store: self.clone(),
        }
    }

    pub fn add_user(&self, user: User) -> User {
        self.data.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_phone(&self, phone: Phone) -> Phone {
        self.data.lock().unwrap().phones.push(phone.clone());
        phone
    }

    pub fn add_order(&self, order: Order) -> Order {
        self.data.lock().unwrap().orders.push(order.clone());
        order
    }

    pub fn phone(&self, id: PhoneId) -> Option<Phone> {
        self.data
            .lock()
            .unwrap()
            .phones
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn cart_rows(&self, user: UserId) -> Vec<CartRow> {
        self.data
            .lock()
            .unwrap()
            .cart
            .iter()
            .filter(|row| row.user == user)
            .cloned()
            .collect()
    }

    pub fn order_count(&self) -> usize {
        self.data.lock().unwrap().orders.len()
    }

    pub fn moderation_misses(&self) -> usize {
        self.data.lock().unwrap().moderation_misses
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub store: Store,
}

impl UserRepository for MockUserRepo {
    async fn find(&self, id: UserId) -> Result<Option<User>, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(data
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create(&self, user: &User) -> Result<bool, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        if data
            .users
            .iter()
            .any(|u| u.id == user.id || u.email == user.email)
        {
            return Ok(false);
        }
        data.users.push(user.clone());
        Ok(true)
    }

    async fn update_profile(
        &self,
        id: UserId,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        let Some(user) = data.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            user.name = name.clone();
        }
        if let Some(phone_number) = &patch.phone_number {
            user.phone_number = Some(phone_number.clone());
        }
        if let Some(address) = &patch.address {
            user.address = Some(address.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            user.avatar_url = Some(avatar_url.clone());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(data.users.iter().filter(|u| u.role == role).count() as u64)
    }

    async fn record_rating(
        &self,
        id: UserId,
        score: u8,
    ) -> Result<Option<Rating>, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        Ok(data.users.iter_mut().find(|u| u.id == id).map(|u| {
            u.rating.total += i64::from(score);
            u.rating.count += 1;
            u.rating
        }))
    }
}

// ── MockFavoriteRepo ─────────────────────────────────────────────────────────

pub struct MockFavoriteRepo {
    pub store: Store,
}

impl FavoriteRepository for MockFavoriteRepo {
    async fn toggle(&self, user: UserId, phone: PhoneId) -> Result<bool, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        let before = data.favorites.len();
        data.favorites.retain(|&(u, p)| !(u == user && p == phone));
        if data.favorites.len() < before {
            return Ok(false);
        }
        data.favorites.push((user, phone));
        Ok(true)
    }

    async fn list(&self, user: UserId) -> Result<Vec<PhoneId>, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(data
            .favorites
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, p)| *p)
            .collect())
    }
}

// ── MockListingRepo ──────────────────────────────────────────────────────────

pub struct MockListingRepo {
    pub store: Store,
}

fn sort_phones(phones: &mut [Phone], sort_by: ListingSortBy) {
    let (sort, cmp): (Sort, fn(&Phone, &Phone) -> std::cmp::Ordering) = match sort_by {
        ListingSortBy::CreatedAt(s) => (s, |a, b| a.created_at.cmp(&b.created_at)),
        ListingSortBy::UpdatedAt(s) => (s, |a, b| a.updated_at.cmp(&b.updated_at)),
        ListingSortBy::Price(s) => (s, |a, b| a.price.cmp(&b.price)),
        ListingSortBy::Title(s) => (s, |a, b| a.title.cmp(&b.title)),
    };
    phones.sort_by(|a, b| {
        let ord = cmp(a, b).then_with(|| a.id.cmp(&b.id));
        match sort {
            Sort::Asc => ord,
            Sort::Desc => ord.reverse(),
        }
    });
}

impl ListingRepository for MockListingRepo {
    async fn find(&self, id: PhoneId) -> Result<Option<Phone>, MarketplaceError> {
        let snapshot = self.store.phone(id);
        // Let concurrent callers read before anyone writes.
        tokio::task::yield_now().await;
        Ok(snapshot)
    }

    async fn find_many(&self, ids: &[PhoneId]) -> Result<Vec<Phone>, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| data.phones.iter().find(|p| p.id == *id).cloned())
            .collect())
    }

    async fn create(&self, phone: &Phone) -> Result<(), MarketplaceError> {
        self.store.add_phone(phone.clone());
        Ok(())
    }

    async fn update_details(&self, phone: &Phone) -> Result<(), MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        if let Some(stored) = data.phones.iter_mut().find(|p| p.id == phone.id) {
            let draft = phone.draft();
            stored.title = draft.title;
            stored.description = draft.description;
            stored.brand = draft.brand;
            stored.price = draft.price;
            stored.condition = draft.condition;
            stored.images = draft.images;
            stored.specs = draft.specs;
            stored.updated_at = phone.updated_at;
        }
        Ok(())
    }

    async fn delete(&self, id: PhoneId) -> Result<bool, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        let before = data.phones.len();
        data.phones.retain(|p| p.id != id);
        data.cart.retain(|row| row.phone != id);
        data.favorites.retain(|&(_, p)| p != id);
        Ok(data.phones.len() < before)
    }

    async fn list(
        &self,
        filter: &ListingFilter,
        sort_by: ListingSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Phone>, u64), MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        let mut matched: Vec<Phone> = data
            .phones
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        let total = matched.len() as u64;
        sort_phones(&mut matched, sort_by);
        let items = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn count_by_status(
        &self,
        seller: Option<UserId>,
    ) -> Result<StatusCounts, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        let mut counts = StatusCounts::default();
        for phone in &data.phones {
            if seller.is_none_or(|s| s == phone.seller_id) {
                counts.add(phone.status, 1);
            }
        }
        Ok(counts)
    }

    async fn moderate(
        &self,
        id: PhoneId,
        moderation: &Moderation,
    ) -> Result<Option<Phone>, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        let Some(phone) = data.phones.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        match moderation.apply(phone) {
            Ok(()) => Ok(Some(phone.clone())),
            Err(_) => {
                data.moderation_misses += 1;
                Ok(None)
            }
        }
    }

    async fn approve_pending(
        &self,
        ids: &[PhoneId],
        admin: UserId,
        notes: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Phone>, MarketplaceError> {
        let moderation = Moderation::Approve {
            admin,
            notes: notes.map(str::to_owned),
            at,
        };
        let mut data = self.store.data.lock().unwrap();
        Ok(data
            .phones
            .iter_mut()
            .filter(|p| ids.contains(&p.id))
            .filter_map(|p| moderation.apply(p).ok().map(|()| p.clone()))
            .collect())
    }
}

// ── MockCartRepo ─────────────────────────────────────────────────────────────

pub struct MockCartRepo {
    pub store: Store,
}

impl CartRepository for MockCartRepo {
    async fn add(
        &self,
        user: UserId,
        phone: PhoneId,
        quantity: u32,
    ) -> Result<(), MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        match data
            .cart
            .iter_mut()
            .find(|row| row.user == user && row.phone == phone)
        {
            Some(row) => row.quantity = (row.quantity + quantity).min(MAX_LINE_QUANTITY),
            None => data.cart.push(CartRow {
                user,
                phone,
                quantity,
                added_at: Utc::now(),
            }),
        }
        Ok(())
    }

    async fn set_quantity(
        &self,
        user: UserId,
        phone: PhoneId,
        quantity: u32,
    ) -> Result<bool, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        match data
            .cart
            .iter_mut()
            .find(|row| row.user == user && row.phone == phone)
        {
            Some(row) => {
                row.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, user: UserId, phone: PhoneId) -> Result<bool, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        let before = data.cart.len();
        data.cart
            .retain(|row| !(row.user == user && row.phone == phone));
        Ok(data.cart.len() < before)
    }

    async fn clear(&self, user: UserId) -> Result<(), MarketplaceError> {
        self.store
            .data
            .lock()
            .unwrap()
            .cart
            .retain(|row| row.user != user);
        Ok(())
    }

    async fn lines(&self, user: UserId) -> Result<Vec<CartLine>, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(data
            .cart
            .iter()
            .filter(|row| row.user == user)
            .filter_map(|row| {
                let phone = data.phones.iter().find(|p| p.id == row.phone)?;
                Some(CartLine {
                    phone: phone.clone(),
                    quantity: row.quantity,
                    added_at: row.added_at,
                })
            })
            .collect())
    }
}

// ── MockOrderRepo ────────────────────────────────────────────────────────────

pub struct MockOrderRepo {
    pub store: Store,
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    orders
}

impl OrderRepository for MockOrderRepo {
    async fn place(&self, order: &Order) -> Result<(), MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        let all_available = order.items.iter().all(|item| {
            data.phones
                .iter()
                .any(|p| p.id == item.phone_id && p.is_purchasable())
        });
        if !all_available {
            return Err(MarketplaceError::ListingSoldOut);
        }
        for item in &order.items {
            if let Some(phone) = data.phones.iter_mut().find(|p| p.id == item.phone_id) {
                phone.is_available = false;
            }
        }
        data.orders.push(order.clone());
        data.cart.retain(|row| row.user != order.buyer_id);
        Ok(())
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(data.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(newest_first(
            data.orders
                .iter()
                .filter(|o| o.buyer_id == buyer)
                .cloned()
                .collect(),
        ))
    }

    async fn list_containing_seller(
        &self,
        seller: UserId,
    ) -> Result<Vec<Order>, MarketplaceError> {
        let data = self.store.data.lock().unwrap();
        Ok(newest_first(
            data.orders
                .iter()
                .filter(|o| o.items.iter().any(|i| i.seller_id == seller))
                .cloned()
                .collect(),
        ))
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, MarketplaceError> {
        let mut data = self.store.data.lock().unwrap();
        Ok(data
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == from)
            .map(|o| {
                o.status = to;
                o.updated_at = Utc::now();
                o.clone()
            }))
    }
}

// ── RecordingEffects ─────────────────────────────────────────────────────────

/// Records every side effect; with `failing` set, every effect errors after recording.
#[derive(Clone, Default)]
pub struct RecordingEffects {
    pub effects: Arc<Mutex<Vec<Effect>>>,
    pub failing: bool,
}

impl RecordingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Returns a shared handle to the recorded effects for post-execution inspection.
    pub fn effects_handle(&self) -> Arc<Mutex<Vec<Effect>>> {
        Arc::clone(&self.effects)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.effects
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Effect::Notify(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn emails(&self) -> Vec<Email> {
        self.effects
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Effect::SendEmail(email) => Some(email.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn deleted_media(&self) -> Vec<String> {
        self.effects
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Effect::DeleteMedia(uri) => Some(uri.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, effect: Effect) -> anyhow::Result<()> {
        self.effects.lock().unwrap().push(effect);
        if self.failing {
            anyhow::bail!("effect sink unavailable");
        }
        Ok(())
    }
}

impl SideEffectPort for RecordingEffects {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        self.record(Effect::Notify(notification.clone()))
    }

    async fn send_email(&self, email: &Email) -> anyhow::Result<()> {
        self.record(Effect::SendEmail(email.clone()))
    }

    async fn delete_media(&self, uri: &str) -> anyhow::Result<()> {
        self.record(Effect::DeleteMedia(uri.to_owned()))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn identity(user: &User) -> IdentityHeaders {
    IdentityHeaders {
        user_id: user.id,
        role: user.role,
    }
}

pub fn test_user(role: Role, name: &str) -> User {
    let now = Utc::now();
    User {
        id: UserId(Uuid::new_v4()),
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
        phone_number: None,
        address: None,
        avatar_url: None,
        rating: Rating::default(),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_draft(title: &str, price: i64) -> ListingDraft {
    ListingDraft {
        title: title.to_owned(),
        description: format!("{title} in good shape"),
        brand: Brand::Samsung,
        price,
        condition: Condition::Good,
        images: vec![format!("https://img.example/{}.jpg", title.replace(' ', "-"))],
        specs: PhoneSpecs {
            storage: Some("128GB".to_owned()),
            ..PhoneSpecs::default()
        },
    }
}

/// A pending listing owned by `seller`.
pub fn pending_phone(seller: &User, title: &str, price: i64) -> Phone {
    Phone::new(PhoneId(Uuid::now_v7()), seller.id, test_draft(title, price), Utc::now())
}

/// An approved, available listing owned by `seller`.
pub fn approved_phone(seller: &User, admin: &User, title: &str, price: i64) -> Phone {
    let mut phone = pending_phone(seller, title, price);
    Moderation::Approve {
        admin: admin.id,
        notes: None,
        at: Utc::now(),
    }
    .apply(&mut phone)
    .unwrap();
    phone
}

pub fn assert_status(phone: &Phone, status: ListingStatus) {
    assert_eq!(phone.status, status, "listing {} has unexpected status", phone.id);
}
