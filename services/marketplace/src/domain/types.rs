use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use phonemart_domain::id::{OrderId, PhoneId, UserId};
use phonemart_domain::listing::{Brand, Condition, ListingStatus};
use phonemart_domain::order::OrderStatus;
use phonemart_domain::user::Role;

pub const MAX_LISTING_IMAGES: usize = 10;
/// Highest accepted listing price, in minor currency units.
pub const MAX_LISTING_PRICE: i64 = 1_000_000_000;
/// Highest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

// ── Users ────────────────────────────────────────────────────────────────────

/// Marketplace profile of an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Running rating aggregate; the average is derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rating {
    pub total: i64,
    pub count: i64,
}

impl Rating {
    pub fn average(self) -> Option<f64> {
        (self.count > 0).then(|| self.total as f64 / self.count as f64)
    }
}

/// Profile fields a user may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.address.is_none()
            && self.avatar_url.is_none()
    }
}

/// Public view of a user attached to listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub rating: Option<f64>,
    pub rating_count: i64,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            rating: user.rating.average(),
            rating_count: user.rating.count,
        }
    }
}

// ── Listings ─────────────────────────────────────────────────────────────────

/// Hardware details of a listing. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneSpecs {
    pub storage: Option<String>,
    pub ram: Option<String>,
    pub color: Option<String>,
    pub screen_size: Option<String>,
    pub battery: Option<String>,
    pub camera: Option<String>,
    pub processor: Option<String>,
    pub os: Option<String>,
}

/// A phone listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phone {
    pub id: PhoneId,
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    pub brand: Brand,
    pub price: i64,
    pub condition: Condition,
    pub images: Vec<String>,
    pub specs: PhoneSpecs,
    pub status: ListingStatus,
    pub is_available: bool,
    pub approved_by: Option<UserId>,
    #[serde(serialize_with = "phonemart_core::serde::opt_to_rfc3339_ms")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "phonemart_core::serde::opt_to_rfc3339_ms")]
    pub rejected_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    #[serde(serialize_with = "phonemart_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "phonemart_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

/// Seller-writable part of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub brand: Brand,
    pub price: i64,
    pub condition: Condition,
    pub images: Vec<String>,
    pub specs: PhoneSpecs,
}

impl ListingDraft {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty");
        }
        if self.price <= 0 {
            return Err("price must be positive");
        }
        if self.price > MAX_LISTING_PRICE {
            return Err("price exceeds the maximum");
        }
        if self.images.is_empty() {
            return Err("at least one image is required");
        }
        if self.images.len() > MAX_LISTING_IMAGES {
            return Err("at most 10 images are allowed");
        }
        Ok(())
    }
}

/// Partial update of a listing's seller-writable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub brand: Option<Brand>,
    pub price: Option<i64>,
    pub condition: Option<Condition>,
    pub images: Option<Vec<String>>,
    pub specs: Option<PhoneSpecs>,
}

impl ListingPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Phone {
    /// A fresh listing: always `pending` and available.
    pub fn new(id: PhoneId, seller_id: UserId, draft: ListingDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            seller_id,
            title: draft.title,
            description: draft.description,
            brand: draft.brand,
            price: draft.price,
            condition: draft.condition,
            images: draft.images,
            specs: draft.specs,
            status: ListingStatus::Pending,
            is_available: true,
            approved_by: None,
            approved_at: None,
            rejected_at: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn draft(&self) -> ListingDraft {
        ListingDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            brand: self.brand,
            price: self.price,
            condition: self.condition,
            images: self.images.clone(),
            specs: self.specs.clone(),
        }
    }

    /// Apply a patch to the seller-writable fields. Returns the image URIs that the
    /// patch dropped.
    pub fn apply_patch(&mut self, patch: ListingPatch, now: DateTime<Utc>) -> Vec<String> {
        let mut dropped = Vec::new();
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(brand) = patch.brand {
            self.brand = brand;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(condition) = patch.condition {
            self.condition = condition;
        }
        if let Some(images) = patch.images {
            dropped = self
                .images
                .iter()
                .filter(|uri| !images.contains(uri))
                .cloned()
                .collect();
            self.images = images;
        }
        if let Some(specs) = patch.specs {
            self.specs = specs;
        }
        self.updated_at = now;
        dropped
    }

    /// Approved and not yet sold.
    pub fn is_purchasable(&self) -> bool {
        self.status == ListingStatus::Approved && self.is_available
    }

    pub fn summary(&self) -> ListingSummary {
        ListingSummary {
            id: self.id,
            seller_id: self.seller_id,
            title: self.title.clone(),
            brand: self.brand,
            price: self.price,
            status: self.status,
        }
    }
}

/// Short form of a listing used in broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingSummary {
    pub id: PhoneId,
    pub seller_id: UserId,
    pub title: String,
    pub brand: Brand,
    pub price: i64,
    pub status: ListingStatus,
}

/// The listing is not `pending`, so it cannot be moderated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("listing is {0}, not pending")]
pub struct NotPending(pub ListingStatus);

/// A moderation decision on a pending listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Moderation {
    Approve {
        admin: UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    },
    Reject {
        admin: UserId,
        reason: String,
        notes: Option<String>,
        at: DateTime<Utc>,
    },
}

impl Moderation {
    pub fn target_status(&self) -> ListingStatus {
        match self {
            Self::Approve { .. } => ListingStatus::Approved,
            Self::Reject { .. } => ListingStatus::Rejected,
        }
    }

    /// Notes stored on the listing. A rejection falls back to its reason.
    pub fn admin_notes(&self) -> Option<&str> {
        match self {
            Self::Approve { notes, .. } => notes.as_deref(),
            Self::Reject { reason, notes, .. } => Some(notes.as_deref().unwrap_or(reason)),
        }
    }

    /// `pending → approved | rejected`; any other source state is refused and the
    /// listing is left unchanged.
    pub fn apply(&self, phone: &mut Phone) -> Result<(), NotPending> {
        if phone.status != ListingStatus::Pending {
            return Err(NotPending(phone.status));
        }
        phone.status = self.target_status();
        phone.admin_notes = self.admin_notes().map(str::to_owned);
        match self {
            Self::Approve { admin, at, .. } => {
                phone.approved_by = Some(*admin);
                phone.approved_at = Some(*at);
                phone.updated_at = *at;
            }
            Self::Reject { at, .. } => {
                phone.rejected_at = Some(*at);
                phone.is_available = false;
                phone.updated_at = *at;
            }
        }
        Ok(())
    }
}

/// Filters for listing queries. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub brand: Option<Brand>,
    /// Case-insensitive substring match on title, brand or description.
    pub search: Option<String>,
    pub seller: Option<UserId>,
    pub exclude: Option<PhoneId>,
    pub available_only: bool,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl ListingFilter {
    pub fn matches(&self, phone: &Phone) -> bool {
        if self.status.is_some_and(|s| s != phone.status) {
            return false;
        }
        if self.brand.is_some_and(|b| b != phone.brand) {
            return false;
        }
        if self.seller.is_some_and(|s| s != phone.seller_id) {
            return false;
        }
        if self.exclude == Some(phone.id) {
            return false;
        }
        if self.available_only && !phone.is_available {
            return false;
        }
        if self.min_price.is_some_and(|min| phone.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| phone.price > max) {
            return false;
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) => {
                phone.title.to_lowercase().contains(&needle)
                    || phone.brand.as_str().contains(&needle)
                    || phone.description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

/// Listing counts per moderation status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl StatusCounts {
    pub fn total(self) -> u64 {
        self.pending + self.approved + self.rejected
    }

    pub fn add(&mut self, status: ListingStatus, n: u64) {
        match status {
            ListingStatus::Pending => self.pending += n,
            ListingStatus::Approved => self.approved += n,
            ListingStatus::Rejected => self.rejected += n,
        }
    }
}

/// A listing with the people involved in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub listing: Phone,
    pub seller: Option<UserSummary>,
    pub approver: Option<UserSummary>,
}

/// Operator triage overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub listings: StatusCounts,
    pub total_listings: u64,
    pub total_users: u64,
    pub total_sellers: u64,
    pub recent_pending: Vec<ListingDetail>,
    pub recent_approved: Vec<ListingDetail>,
}

/// Context supporting a moderation decision on one listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewContext {
    pub listing: ListingDetail,
    pub seller_other_listings: Vec<Phone>,
    pub seller_approved_count: u64,
    pub seller_rejected_count: u64,
}

// ── Cart ─────────────────────────────────────────────────────────────────────

/// One cart line joined with the live listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub phone: Phone,
    pub quantity: u32,
    #[serde(serialize_with = "phonemart_core::serde::to_rfc3339_ms")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Priced at the listing's current price. `None` on overflow.
    pub fn line_total(&self) -> Option<i64> {
        self.phone.price.checked_mul(i64::from(self.quantity))
    }
}

fn checked_total(mut totals: impl Iterator<Item = Option<i64>>) -> Option<i64> {
    totals.try_fold(0i64, |sum, line| sum.checked_add(line?))
}

/// A user's cart, priced at current listing prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub total_amount: i64,
}

impl Cart {
    /// `None` when the total does not fit in an `i64`.
    pub fn new(user_id: UserId, items: Vec<CartLine>) -> Option<Self> {
        let total_amount = checked_total(items.iter().map(CartLine::line_total))?;
        Some(Self {
            user_id,
            items,
            total_amount,
        })
    }

    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total_amount: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

/// Snapshot of one purchased listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub phone_id: PhoneId,
    pub seller_id: UserId,
    pub title: String,
    pub quantity: u32,
    pub unit_price: i64,
}

impl OrderItem {
    pub fn line_total(&self) -> Option<i64> {
        self.unit_price.checked_mul(i64::from(self.quantity))
    }
}

/// Immutable record of a checkout. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
    pub delivery_address: String,
    pub contact_number: String,
    pub status: OrderStatus,
    #[serde(serialize_with = "phonemart_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "phonemart_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot a cart at its current prices into a `pending` order. `None` when the
    /// total overflows.
    pub fn from_cart(
        id: OrderId,
        cart: &Cart,
        delivery_address: String,
        contact_number: String,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let items: Vec<OrderItem> = cart
            .items
            .iter()
            .map(|line| OrderItem {
                phone_id: line.phone.id,
                seller_id: line.phone.seller_id,
                title: line.phone.title.clone(),
                quantity: line.quantity,
                unit_price: line.phone.price,
            })
            .collect();
        let total_amount = checked_total(items.iter().map(OrderItem::line_total))?;
        Some(Self {
            id,
            buyer_id: cart.user_id,
            items,
            total_amount,
            delivery_address,
            contact_number,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Distinct sellers in order of first appearance.
    pub fn sellers(&self) -> Vec<UserId> {
        let mut sellers = Vec::new();
        for item in &self.items {
            if !sellers.contains(&item.seller_id) {
                sellers.push(item.seller_id);
            }
        }
        sellers
    }

    pub fn items_for(&self, seller: UserId) -> Vec<OrderItem> {
        self.items
            .iter()
            .filter(|item| item.seller_id == seller)
            .cloned()
            .collect()
    }

    /// Keep only `seller`'s lines; `None` when the seller sold nothing in this order.
    pub fn for_seller(mut self, seller: UserId) -> Option<Self> {
        self.items.retain(|item| item.seller_id == seller);
        (!self.items.is_empty()).then_some(self)
    }
}

// ── Notifications ────────────────────────────────────────────────────────────

/// Who receives a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    User(UserId),
    Everyone,
}

/// Event payloads. Serialized as `{"event": <name>, "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum NotificationEvent {
    ListingApproved {
        listing_id: PhoneId,
        seller_id: UserId,
        listing: Phone,
        message: String,
    },
    ListingRejected {
        listing_id: PhoneId,
        seller_id: UserId,
        reason: String,
        listing: Phone,
    },
    NewPhoneListing {
        listing: ListingSummary,
    },
    CartUpdated {
        cart: Cart,
    },
    NewOrder {
        order_id: OrderId,
        buyer_id: UserId,
        items: Vec<OrderItem>,
    },
    OrderStatusUpdated {
        order_id: OrderId,
        status: OrderStatus,
    },
}

impl NotificationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListingApproved { .. } => "listing_approved",
            Self::ListingRejected { .. } => "listing_rejected",
            Self::NewPhoneListing { .. } => "new_phone_listing",
            Self::CartUpdated { .. } => "cart_updated",
            Self::NewOrder { .. } => "new_order",
            Self::OrderStatusUpdated { .. } => "order_status_updated",
        }
    }
}

/// An event addressed to an audience.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub audience: Audience,
    pub event: NotificationEvent,
}

impl Notification {
    pub fn to_user(user: UserId, event: NotificationEvent) -> Self {
        Self {
            audience: Audience::User(user),
            event,
        }
    }

    pub fn broadcast(event: NotificationEvent) -> Self {
        Self {
            audience: Audience::Everyone,
            event,
        }
    }

    pub fn is_for(&self, user: UserId) -> bool {
        match self.audience {
            Audience::User(id) => id == user,
            Audience::Everyone => true,
        }
    }

    pub fn listing_approved(listing: Phone) -> Self {
        let message = format!("Your listing \"{}\" has been approved!", listing.title);
        Self::to_user(
            listing.seller_id,
            NotificationEvent::ListingApproved {
                listing_id: listing.id,
                seller_id: listing.seller_id,
                listing,
                message,
            },
        )
    }

    pub fn listing_rejected(listing: Phone, reason: String) -> Self {
        Self::to_user(
            listing.seller_id,
            NotificationEvent::ListingRejected {
                listing_id: listing.id,
                seller_id: listing.seller_id,
                reason,
                listing,
            },
        )
    }

    pub fn cart_updated(cart: Cart) -> Self {
        Self::to_user(cart.user_id, NotificationEvent::CartUpdated { cart })
    }
}

// ── Outbound mail ────────────────────────────────────────────────────────────

/// A transactional email handed to the mail collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn order_confirmation(to: &str, buyer_name: &str, order: &Order) -> Self {
        let mut body = format!(
            "Hi {buyer_name},\n\nThanks for your order {}. We received:\n\n",
            order.id
        );
        for item in &order.items {
            body.push_str(&format!(
                "- {} x{} @ {}\n",
                item.title, item.quantity, item.unit_price
            ));
        }
        body.push_str(&format!(
            "\nTotal: {}\nDelivery address: {}\nContact number: {}\n",
            order.total_amount, order.delivery_address, order.contact_number
        ));
        Self {
            to: to.to_owned(),
            subject: format!("Order confirmation {}", order.id),
            body,
        }
    }
}
