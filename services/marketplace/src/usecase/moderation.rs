use std::collections::HashMap;

use chrono::Utc;

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::{PhoneId, UserId};
use phonemart_domain::listing::{Brand, ListingSortBy, ListingStatus};
use phonemart_domain::pagination::{Page, PageRequest, Sort};
use phonemart_domain::user::{Capability, Role};

use crate::domain::repository::{ListingRepository, SideEffectPort, UserRepository};
use crate::domain::types::{
    DashboardStats, ListingDetail, ListingFilter, Moderation, Notification, Phone, ReviewContext,
    UserSummary,
};
use crate::error::MarketplaceError;
use crate::usecase::effects::PostCommit;

const RECENT_PENDING: u32 = 10;
const RECENT_APPROVED: u32 = 5;
const REVIEW_OTHER_LISTINGS: u32 = 5;

/// Attach seller and approver summaries to each listing.
pub async fn attach_people<U: UserRepository>(
    users: &U,
    listings: Vec<Phone>,
) -> Result<Vec<ListingDetail>, MarketplaceError> {
    let mut ids: Vec<UserId> = listings
        .iter()
        .flat_map(|p| std::iter::once(p.seller_id).chain(p.approved_by))
        .collect();
    ids.sort();
    ids.dedup();
    let people: HashMap<UserId, UserSummary> = users
        .find_many(&ids)
        .await?
        .iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();
    Ok(listings
        .into_iter()
        .map(|listing| ListingDetail {
            seller: people.get(&listing.seller_id).cloned(),
            approver: listing.approved_by.and_then(|id| people.get(&id).cloned()),
            listing,
        })
        .collect())
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

// ── Approve ──────────────────────────────────────────────────────────────────

pub struct ApproveListingUseCase<L: ListingRepository, U: UserRepository, E: SideEffectPort> {
    pub listings: L,
    pub users: U,
    pub effects: E,
}

impl<L: ListingRepository, U: UserRepository, E: SideEffectPort> ApproveListingUseCase<L, U, E> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        id: PhoneId,
        notes: Option<String>,
    ) -> Result<ListingDetail, MarketplaceError> {
        actor.require(Capability::Moderate)?;
        let current = self
            .listings
            .find(id)
            .await?
            .ok_or(MarketplaceError::ListingNotFound)?;
        if current.status != ListingStatus::Pending {
            return Err(MarketplaceError::InvalidListingState);
        }

        let moderation = Moderation::Approve {
            admin: actor.user_id,
            notes: non_blank(notes),
            at: Utc::now(),
        };
        let approved = self
            .listings
            .moderate(id, &moderation)
            .await?
            .ok_or(MarketplaceError::InvalidListingState)?;

        let mut post = PostCommit::new();
        post.notify(Notification::listing_approved(approved.clone()));
        post.run(&self.effects).await;

        let mut detail = attach_people(&self.users, vec![approved]).await?;
        detail.pop().ok_or(MarketplaceError::ListingNotFound)
    }
}

// ── Reject ───────────────────────────────────────────────────────────────────

pub struct RejectListingUseCase<L: ListingRepository, E: SideEffectPort> {
    pub listings: L,
    pub effects: E,
}

impl<L: ListingRepository, E: SideEffectPort> RejectListingUseCase<L, E> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        id: PhoneId,
        reason: Option<String>,
        notes: Option<String>,
    ) -> Result<Phone, MarketplaceError> {
        actor.require(Capability::Moderate)?;
        let reason = non_blank(reason).ok_or(MarketplaceError::MissingRejectionReason)?;
        let current = self
            .listings
            .find(id)
            .await?
            .ok_or(MarketplaceError::ListingNotFound)?;
        if current.status != ListingStatus::Pending {
            return Err(MarketplaceError::InvalidListingState);
        }

        let moderation = Moderation::Reject {
            admin: actor.user_id,
            reason: reason.clone(),
            notes: non_blank(notes),
            at: Utc::now(),
        };
        let rejected = self
            .listings
            .moderate(id, &moderation)
            .await?
            .ok_or(MarketplaceError::InvalidListingState)?;

        let mut post = PostCommit::new();
        post.notify(Notification::listing_rejected(rejected.clone(), reason));
        post.run(&self.effects).await;
        Ok(rejected)
    }
}

// ── BatchApprove ─────────────────────────────────────────────────────────────

pub struct BatchApproveUseCase<L: ListingRepository, E: SideEffectPort> {
    pub listings: L,
    pub effects: E,
}

impl<L: ListingRepository, E: SideEffectPort> BatchApproveUseCase<L, E> {
    /// Returns how many listings were approved. Non-pending ids are skipped.
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        ids: Vec<PhoneId>,
        notes: Option<String>,
    ) -> Result<u64, MarketplaceError> {
        actor.require(Capability::Moderate)?;
        let mut ids = ids;
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(0);
        }

        let notes = non_blank(notes);
        let approved = self
            .listings
            .approve_pending(&ids, actor.user_id, notes.as_deref(), Utc::now())
            .await?;
        let modified = approved.len() as u64;

        let mut post = PostCommit::new();
        for listing in approved {
            post.notify(Notification::listing_approved(listing));
        }
        post.run(&self.effects).await;
        Ok(modified)
    }
}

// ── ListPending ──────────────────────────────────────────────────────────────

pub struct ListPendingUseCase<L: ListingRepository, U: UserRepository> {
    pub listings: L,
    pub users: U,
}

impl<L: ListingRepository, U: UserRepository> ListPendingUseCase<L, U> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        sort_by: ListingSortBy,
        page: PageRequest,
    ) -> Result<Page<ListingDetail>, MarketplaceError> {
        actor.require(Capability::Moderate)?;
        let filter = ListingFilter {
            status: Some(ListingStatus::Pending),
            ..Default::default()
        };
        let (items, total) = self.listings.list(&filter, sort_by, page).await?;
        let items = attach_people(&self.users, items).await?;
        Ok(Page::new(items, page, total))
    }
}

// ── ListAll ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ListAllFilter {
    pub status: Option<ListingStatus>,
    pub brand: Option<Brand>,
    pub search: Option<String>,
}

pub struct ListAllListingsUseCase<L: ListingRepository, U: UserRepository> {
    pub listings: L,
    pub users: U,
}

impl<L: ListingRepository, U: UserRepository> ListAllListingsUseCase<L, U> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        filter: ListAllFilter,
        sort_by: ListingSortBy,
        page: PageRequest,
    ) -> Result<Page<ListingDetail>, MarketplaceError> {
        actor.require(Capability::Moderate)?;
        let filter = ListingFilter {
            status: filter.status,
            brand: filter.brand,
            search: non_blank(filter.search),
            ..Default::default()
        };
        let (items, total) = self.listings.list(&filter, sort_by, page).await?;
        let items = attach_people(&self.users, items).await?;
        Ok(Page::new(items, page, total))
    }
}

// ── GetDashboardStats ────────────────────────────────────────────────────────

pub struct DashboardStatsUseCase<L: ListingRepository, U: UserRepository> {
    pub listings: L,
    pub users: U,
}

impl<L: ListingRepository, U: UserRepository> DashboardStatsUseCase<L, U> {
    pub async fn execute(&self, actor: IdentityHeaders) -> Result<DashboardStats, MarketplaceError> {
        actor.require(Capability::Moderate)?;
        let counts = self.listings.count_by_status(None).await?;
        let buyers = self.users.count_by_role(Role::Buyer).await?;
        let sellers = self.users.count_by_role(Role::Seller).await?;

        let newest = ListingSortBy::CreatedAt(Sort::Desc);
        let (pending, _) = self
            .listings
            .list(
                &ListingFilter {
                    status: Some(ListingStatus::Pending),
                    ..Default::default()
                },
                newest,
                PageRequest::new(Some(1), Some(RECENT_PENDING)),
            )
            .await?;
        let (approved, _) = self
            .listings
            .list(
                &ListingFilter {
                    status: Some(ListingStatus::Approved),
                    ..Default::default()
                },
                newest,
                PageRequest::new(Some(1), Some(RECENT_APPROVED)),
            )
            .await?;

        Ok(DashboardStats {
            listings: counts,
            total_listings: counts.total(),
            total_users: buyers + sellers,
            total_sellers: sellers,
            recent_pending: attach_people(&self.users, pending).await?,
            recent_approved: attach_people(&self.users, approved).await?,
        })
    }
}

// ── GetForReview ─────────────────────────────────────────────────────────────

pub struct GetForReviewUseCase<L: ListingRepository, U: UserRepository> {
    pub listings: L,
    pub users: U,
}

impl<L: ListingRepository, U: UserRepository> GetForReviewUseCase<L, U> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        id: PhoneId,
    ) -> Result<ReviewContext, MarketplaceError> {
        actor.require(Capability::Moderate)?;
        let listing = self
            .listings
            .find(id)
            .await?
            .ok_or(MarketplaceError::ListingNotFound)?;
        let seller = listing.seller_id;

        let (others, _) = self
            .listings
            .list(
                &ListingFilter {
                    seller: Some(seller),
                    exclude: Some(id),
                    ..Default::default()
                },
                ListingSortBy::CreatedAt(Sort::Desc),
                PageRequest::new(Some(1), Some(REVIEW_OTHER_LISTINGS)),
            )
            .await?;
        let counts = self.listings.count_by_status(Some(seller)).await?;

        let mut detail = attach_people(&self.users, vec![listing]).await?;
        let listing = detail.pop().ok_or(MarketplaceError::ListingNotFound)?;
        Ok(ReviewContext {
            listing,
            seller_other_listings: others,
            seller_approved_count: counts.approved,
            seller_rejected_count: counts.rejected,
        })
    }
}
