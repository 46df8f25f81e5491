#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use phonemart_domain::id::{OrderId, PhoneId, UserId};
use phonemart_domain::listing::ListingSortBy;
use phonemart_domain::order::OrderStatus;
use phonemart_domain::pagination::PageRequest;
use phonemart_domain::user::Role;

use crate::domain::types::{
    CartLine, Email, ListingFilter, Moderation, Notification, Order, Phone, ProfilePatch, Rating,
    StatusCounts, User,
};
use crate::error::MarketplaceError;

/// Repository for user profiles.
pub trait UserRepository: Send + Sync {
    async fn find(&self, id: UserId) -> Result<Option<User>, MarketplaceError>;

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, MarketplaceError>;

    /// Insert a profile. Returns `false` if the id or email is already taken.
    async fn create(&self, user: &User) -> Result<bool, MarketplaceError>;

    /// Returns the updated profile, or `None` if it does not exist.
    async fn update_profile(
        &self,
        id: UserId,
        patch: &ProfilePatch,
    ) -> Result<Option<User>, MarketplaceError>;

    async fn count_by_role(&self, role: Role) -> Result<u64, MarketplaceError>;

    /// Add one score to the aggregate in a single statement. `None` if no such user.
    async fn record_rating(
        &self,
        id: UserId,
        score: u8,
    ) -> Result<Option<Rating>, MarketplaceError>;
}

/// Repository for favorite listings.
pub trait FavoriteRepository: Send + Sync {
    /// Remove the favorite if present, add it otherwise. Returns whether it is now a favorite.
    async fn toggle(&self, user: UserId, phone: PhoneId) -> Result<bool, MarketplaceError>;

    /// Favorites in insertion order.
    async fn list(&self, user: UserId) -> Result<Vec<PhoneId>, MarketplaceError>;
}

/// Repository for phone listings.
pub trait ListingRepository: Send + Sync {
    async fn find(&self, id: PhoneId) -> Result<Option<Phone>, MarketplaceError>;

    /// Listings among `ids`, in the order of `ids`; missing ones are skipped.
    async fn find_many(&self, ids: &[PhoneId]) -> Result<Vec<Phone>, MarketplaceError>;

    async fn create(&self, phone: &Phone) -> Result<(), MarketplaceError>;

    /// Persist the seller-writable fields of `phone`. Moderation fields are never written.
    async fn update_details(&self, phone: &Phone) -> Result<(), MarketplaceError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: PhoneId) -> Result<bool, MarketplaceError>;

    /// One page of matching listings plus the total number of matches.
    async fn list(
        &self,
        filter: &ListingFilter,
        sort_by: ListingSortBy,
        page: PageRequest,
    ) -> Result<(Vec<Phone>, u64), MarketplaceError>;

    async fn count_by_status(
        &self,
        seller: Option<UserId>,
    ) -> Result<StatusCounts, MarketplaceError>;

    /// Apply `moderation` only if the listing is still `pending`.
    ///
    /// Returns the updated listing, or `None` when the listing is missing or no longer
    /// pending (another moderator won the race).
    async fn moderate(
        &self,
        id: PhoneId,
        moderation: &Moderation,
    ) -> Result<Option<Phone>, MarketplaceError>;

    /// Approve every listing in `ids` that is still `pending`; others are skipped.
    /// Returns the listings that were approved.
    async fn approve_pending(
        &self,
        ids: &[PhoneId],
        admin: UserId,
        notes: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Phone>, MarketplaceError>;
}

/// Repository for carts, one per user.
pub trait CartRepository: Send + Sync {
    /// Add `quantity` to the line for `phone`, creating it if absent. Atomic per line.
    async fn add(
        &self,
        user: UserId,
        phone: PhoneId,
        quantity: u32,
    ) -> Result<(), MarketplaceError>;

    /// Overwrite the quantity of an existing line. Returns `false` if there is no line.
    async fn set_quantity(
        &self,
        user: UserId,
        phone: PhoneId,
        quantity: u32,
    ) -> Result<bool, MarketplaceError>;

    /// Returns `true` if a line was removed.
    async fn remove(&self, user: UserId, phone: PhoneId) -> Result<bool, MarketplaceError>;

    async fn clear(&self, user: UserId) -> Result<(), MarketplaceError>;

    /// Lines joined with their live listings, oldest first.
    async fn lines(&self, user: UserId) -> Result<Vec<CartLine>, MarketplaceError>;
}

/// Repository for orders.
pub trait OrderRepository: Send + Sync {
    /// Atomically insert `order`, clear the buyer's cart and mark every purchased
    /// listing unavailable. Fails with `ListingSoldOut`, writing nothing, if any
    /// listing is no longer available.
    async fn place(&self, order: &Order) -> Result<(), MarketplaceError>;

    async fn find(&self, id: OrderId) -> Result<Option<Order>, MarketplaceError>;

    /// Newest first.
    async fn list_by_buyer(&self, buyer: UserId) -> Result<Vec<Order>, MarketplaceError>;

    /// Orders with at least one line sold by `seller`, newest first, with all lines.
    async fn list_containing_seller(
        &self,
        seller: UserId,
    ) -> Result<Vec<Order>, MarketplaceError>;

    /// Move the order from `from` to `to` if it is still in `from`.
    /// Returns `None` when the order is missing or its status changed meanwhile.
    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, MarketplaceError>;
}

/// Best-effort side effects executed after a write has committed.
pub trait SideEffectPort: Send + Sync {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn send_email(&self, email: &Email) -> anyhow::Result<()>;
    async fn delete_media(&self, uri: &str) -> anyhow::Result<()>;
}
