use chrono::Utc;
use uuid::Uuid;

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::PhoneId;
use phonemart_domain::listing::{Brand, ListingSortBy, ListingStatus};
use phonemart_domain::pagination::{Page, PageRequest};
use phonemart_domain::user::Capability;

use crate::domain::repository::{ListingRepository, SideEffectPort, UserRepository};
use crate::domain::types::{
    ListingDetail, ListingDraft, ListingFilter, ListingPatch, Notification, NotificationEvent,
    Phone,
};
use crate::error::MarketplaceError;
use crate::usecase::effects::PostCommit;
use crate::usecase::moderation::attach_people;

// ── CreateListing ────────────────────────────────────────────────────────────

pub struct CreateListingUseCase<L: ListingRepository, U: UserRepository, E: SideEffectPort> {
    pub listings: L,
    pub users: U,
    pub effects: E,
}

impl<L: ListingRepository, U: UserRepository, E: SideEffectPort> CreateListingUseCase<L, U, E> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        draft: ListingDraft,
    ) -> Result<Phone, MarketplaceError> {
        actor.require(Capability::Sell)?;
        draft.validate().map_err(MarketplaceError::InvalidListing)?;
        if self.users.find(actor.user_id).await?.is_none() {
            return Err(MarketplaceError::UserNotFound);
        }

        let phone = Phone::new(PhoneId(Uuid::now_v7()), actor.user_id, draft, Utc::now());
        self.listings.create(&phone).await?;

        let mut post = PostCommit::new();
        post.notify(Notification::broadcast(NotificationEvent::NewPhoneListing {
            listing: phone.summary(),
        }));
        post.run(&self.effects).await;
        Ok(phone)
    }
}

// ── UpdateListing ────────────────────────────────────────────────────────────

pub struct UpdateListingUseCase<L: ListingRepository, E: SideEffectPort> {
    pub listings: L,
    pub effects: E,
}

impl<L: ListingRepository, E: SideEffectPort> UpdateListingUseCase<L, E> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        id: PhoneId,
        patch: ListingPatch,
    ) -> Result<Phone, MarketplaceError> {
        actor.require(Capability::Sell)?;
        if patch.is_empty() {
            return Err(MarketplaceError::MissingData);
        }
        let mut phone = self
            .listings
            .find(id)
            .await?
            .ok_or(MarketplaceError::ListingNotFound)?;
        actor.require_owner(Capability::Sell, phone.seller_id)?;

        let dropped_images = phone.apply_patch(patch, Utc::now());
        phone
            .draft()
            .validate()
            .map_err(MarketplaceError::InvalidListing)?;
        self.listings.update_details(&phone).await?;

        let mut post = PostCommit::new();
        for uri in dropped_images {
            post.delete_media(uri);
        }
        post.run(&self.effects).await;
        Ok(phone)
    }
}

// ── DeleteListing ────────────────────────────────────────────────────────────

pub struct DeleteListingUseCase<L: ListingRepository, E: SideEffectPort> {
    pub listings: L,
    pub effects: E,
}

impl<L: ListingRepository, E: SideEffectPort> DeleteListingUseCase<L, E> {
    pub async fn execute(&self, actor: IdentityHeaders, id: PhoneId) -> Result<(), MarketplaceError> {
        actor.require(Capability::Sell)?;
        let phone = self
            .listings
            .find(id)
            .await?
            .ok_or(MarketplaceError::ListingNotFound)?;
        actor.require_owner(Capability::Sell, phone.seller_id)?;

        if !self.listings.delete(id).await? {
            return Err(MarketplaceError::ListingNotFound);
        }

        let mut post = PostCommit::new();
        for uri in phone.images {
            post.delete_media(uri);
        }
        post.run(&self.effects).await;
        Ok(())
    }
}

// ── MyListings ───────────────────────────────────────────────────────────────

pub struct MyListingsUseCase<L: ListingRepository> {
    pub listings: L,
}

impl<L: ListingRepository> MyListingsUseCase<L> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        status: Option<ListingStatus>,
        sort_by: ListingSortBy,
        page: PageRequest,
    ) -> Result<Page<Phone>, MarketplaceError> {
        actor.require(Capability::Sell)?;
        let filter = ListingFilter {
            seller: Some(actor.user_id),
            status,
            ..Default::default()
        };
        let (items, total) = self.listings.list(&filter, sort_by, page).await?;
        Ok(Page::new(items, page, total))
    }
}

// ── BrowseListings ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct BrowseFilter {
    pub brand: Option<Brand>,
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

pub struct BrowseListingsUseCase<L: ListingRepository> {
    pub listings: L,
}

impl<L: ListingRepository> BrowseListingsUseCase<L> {
    /// Public catalogue: approved listings that are still for sale.
    pub async fn execute(
        &self,
        filter: BrowseFilter,
        sort_by: ListingSortBy,
        page: PageRequest,
    ) -> Result<Page<Phone>, MarketplaceError> {
        let filter = ListingFilter {
            status: Some(ListingStatus::Approved),
            available_only: true,
            brand: filter.brand,
            search: filter
                .search
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            min_price: filter.min_price,
            max_price: filter.max_price,
            ..Default::default()
        };
        let (items, total) = self.listings.list(&filter, sort_by, page).await?;
        Ok(Page::new(items, page, total))
    }
}

// ── GetListing ───────────────────────────────────────────────────────────────

pub struct GetListingUseCase<L: ListingRepository, U: UserRepository> {
    pub listings: L,
    pub users: U,
}

impl<L: ListingRepository, U: UserRepository> GetListingUseCase<L, U> {
    /// Approved listings are public; others are visible to their seller and moderators.
    pub async fn execute(
        &self,
        viewer: Option<IdentityHeaders>,
        id: PhoneId,
    ) -> Result<ListingDetail, MarketplaceError> {
        let phone = self
            .listings
            .find(id)
            .await?
            .ok_or(MarketplaceError::ListingNotFound)?;
        let visible = phone.status == ListingStatus::Approved
            || viewer.is_some_and(|v| v.can_inspect(phone.seller_id));
        if !visible {
            return Err(MarketplaceError::ListingNotFound);
        }
        let mut detail = attach_people(&self.users, vec![phone]).await?;
        detail.pop().ok_or(MarketplaceError::ListingNotFound)
    }
}
