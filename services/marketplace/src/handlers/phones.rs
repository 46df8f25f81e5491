use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::Deserialize;

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::PhoneId;
use phonemart_domain::listing::{Brand, Condition, ListingStatus};
use phonemart_domain::pagination::Page;

use crate::domain::types::{ListingDetail, ListingDraft, ListingPatch, Phone, PhoneSpecs};
use crate::error::MarketplaceError;
use crate::handlers::{ListingListQuery, parse_opt, parse_query};
use crate::state::AppState;
use crate::usecase::listing::{
    BrowseFilter, BrowseListingsUseCase, CreateListingUseCase, DeleteListingUseCase,
    GetListingUseCase, MyListingsUseCase, UpdateListingUseCase,
};

// ── GET /phones ──────────────────────────────────────────────────────────────

pub async fn browse_phones(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<Phone>>, MarketplaceError> {
    let query: ListingListQuery = parse_query(raw_query)?;
    let filter = BrowseFilter {
        brand: parse_opt::<Brand>(query.brand.as_deref())?,
        search: query.search.clone(),
        min_price: query.min_price,
        max_price: query.max_price,
    };
    let usecase = BrowseListingsUseCase {
        listings: state.listing_repo(),
    };
    let page = usecase
        .execute(filter, query.sort_by(), query.page_request())
        .await?;
    Ok(Json(page))
}

// ── GET /phones/{id} ─────────────────────────────────────────────────────────

pub async fn get_phone(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    Path(id): Path<PhoneId>,
) -> Result<Json<ListingDetail>, MarketplaceError> {
    let usecase = GetListingUseCase {
        listings: state.listing_repo(),
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(identity, id).await?))
}

// ── POST /phones ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePhoneRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub brand: Brand,
    pub price: i64,
    pub condition: Condition,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specs: PhoneSpecs,
}

pub async fn create_phone(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreatePhoneRequest>,
) -> Result<(StatusCode, Json<Phone>), MarketplaceError> {
    let usecase = CreateListingUseCase {
        listings: state.listing_repo(),
        users: state.user_repo(),
        effects: state.effects(),
    };
    let phone = usecase
        .execute(
            identity,
            ListingDraft {
                title: body.title,
                description: body.description,
                brand: body.brand,
                price: body.price,
                condition: body.condition,
                images: body.images,
                specs: body.specs,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(phone)))
}

// ── GET /phones/@mine ────────────────────────────────────────────────────────

pub async fn my_phones(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<Phone>>, MarketplaceError> {
    let query: ListingListQuery = parse_query(raw_query)?;
    let status = parse_opt::<ListingStatus>(query.status.as_deref())?;
    let usecase = MyListingsUseCase {
        listings: state.listing_repo(),
    };
    let page = usecase
        .execute(identity, status, query.sort_by(), query.page_request())
        .await?;
    Ok(Json(page))
}

// ── PATCH /phones/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePhoneRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub brand: Option<Brand>,
    pub price: Option<i64>,
    pub condition: Option<Condition>,
    pub images: Option<Vec<String>>,
    pub specs: Option<PhoneSpecs>,
}

pub async fn update_phone(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<PhoneId>,
    Json(body): Json<UpdatePhoneRequest>,
) -> Result<Json<Phone>, MarketplaceError> {
    let usecase = UpdateListingUseCase {
        listings: state.listing_repo(),
        effects: state.effects(),
    };
    let patch = ListingPatch {
        title: body.title,
        description: body.description,
        brand: body.brand,
        price: body.price,
        condition: body.condition,
        images: body.images,
        specs: body.specs,
    };
    Ok(Json(usecase.execute(identity, id, patch).await?))
}

// ── DELETE /phones/{id} ──────────────────────────────────────────────────────

pub async fn delete_phone(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<PhoneId>,
) -> Result<StatusCode, MarketplaceError> {
    let usecase = DeleteListingUseCase {
        listings: state.listing_repo(),
        effects: state.effects(),
    };
    usecase.execute(identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
