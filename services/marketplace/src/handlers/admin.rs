use axum::{
    Json,
    body::Bytes,
    extract::{Path, RawQuery, State},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::PhoneId;
use phonemart_domain::listing::{Brand, ListingStatus};
use phonemart_domain::pagination::Page;
use phonemart_domain::user::Capability;

use crate::domain::types::{DashboardStats, ListingDetail, Phone, ReviewContext};
use crate::error::MarketplaceError;
use crate::handlers::{ListingListQuery, parse_opt, parse_query};
use crate::state::AppState;
use crate::usecase::moderation::{
    ApproveListingUseCase, BatchApproveUseCase, DashboardStatsUseCase, GetForReviewUseCase,
    ListAllFilter, ListAllListingsUseCase, ListPendingUseCase, RejectListingUseCase,
};

/// Decode an optional JSON body; an empty body yields the defaults.
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, MarketplaceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|_| MarketplaceError::MissingData)
}

// ── GET /admin/dashboard ─────────────────────────────────────────────────────

pub async fn dashboard(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, MarketplaceError> {
    let usecase = DashboardStatsUseCase {
        listings: state.listing_repo(),
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(identity).await?))
}

// ── GET /admin/phones/pending ────────────────────────────────────────────────

pub async fn pending_phones(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<ListingDetail>>, MarketplaceError> {
    let query: ListingListQuery = parse_query(raw_query)?;
    let usecase = ListPendingUseCase {
        listings: state.listing_repo(),
        users: state.user_repo(),
    };
    let page = usecase
        .execute(identity, query.sort_by(), query.page_request())
        .await?;
    Ok(Json(page))
}

// ── GET /admin/phones ────────────────────────────────────────────────────────

pub async fn all_phones(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<ListingDetail>>, MarketplaceError> {
    let query: ListingListQuery = parse_query(raw_query)?;
    let filter = ListAllFilter {
        status: parse_opt::<ListingStatus>(query.status.as_deref())?,
        brand: parse_opt::<Brand>(query.brand.as_deref())?,
        search: query.search.clone(),
    };
    let usecase = ListAllListingsUseCase {
        listings: state.listing_repo(),
        users: state.user_repo(),
    };
    let page = usecase
        .execute(identity, filter, query.sort_by(), query.page_request())
        .await?;
    Ok(Json(page))
}

// ── GET /admin/phones/{id} ───────────────────────────────────────────────────

pub async fn review_phone(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<PhoneId>,
) -> Result<Json<ReviewContext>, MarketplaceError> {
    let usecase = GetForReviewUseCase {
        listings: state.listing_repo(),
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(identity, id).await?))
}

// ── POST /admin/phones/{id}/approve ──────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ApproveRequest {
    pub notes: Option<String>,
}

pub async fn approve_phone(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<PhoneId>,
    body: Bytes,
) -> Result<Json<ListingDetail>, MarketplaceError> {
    identity.require(Capability::Moderate)?;
    let body: ApproveRequest = optional_json(&body)?;
    let usecase = ApproveListingUseCase {
        listings: state.listing_repo(),
        users: state.user_repo(),
        effects: state.effects(),
    };
    Ok(Json(usecase.execute(identity, id, body.notes).await?))
}

// ── POST /admin/phones/{id}/reject ───────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct RejectRequest {
    pub reason: Option<String>,
    pub notes: Option<String>,
}

pub async fn reject_phone(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<PhoneId>,
    body: Bytes,
) -> Result<Json<Phone>, MarketplaceError> {
    identity.require(Capability::Moderate)?;
    let body: RejectRequest = optional_json(&body)?;
    let usecase = RejectListingUseCase {
        listings: state.listing_repo(),
        effects: state.effects(),
    };
    let phone = usecase
        .execute(identity, id, body.reason, body.notes)
        .await?;
    Ok(Json(phone))
}

// ── POST /admin/phones/batch-approve ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct BatchApproveRequest {
    pub phone_ids: Vec<PhoneId>,
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct BatchApproveResponse {
    pub modified_count: u64,
}

pub async fn batch_approve(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BatchApproveResponse>, MarketplaceError> {
    identity.require(Capability::Moderate)?;
    let body: BatchApproveRequest =
        serde_json::from_slice(&body).map_err(|_| MarketplaceError::MissingData)?;
    let usecase = BatchApproveUseCase {
        listings: state.listing_repo(),
        effects: state.effects(),
    };
    let modified_count = usecase
        .execute(identity, body.phone_ids, body.notes)
        .await?;
    Ok(Json(BatchApproveResponse { modified_count }))
}
