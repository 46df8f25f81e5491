use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::{PhoneId, UserId};
use phonemart_domain::user::Role;

use crate::domain::types::{Phone, ProfilePatch, Rating, User};
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::favorite::{GetFavoritesUseCase, ToggleFavoriteUseCase};
use crate::usecase::profile::{
    GetProfileUseCase, RegisterProfileInput, RegisterProfileUseCase, UpdateProfileUseCase,
};
use crate::usecase::rating::RateSellerUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: i64,
    #[serde(serialize_with = "phonemart_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "phonemart_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone_number: user.phone_number,
            address: user.address,
            avatar_url: user.avatar_url,
            rating: user.rating.average(),
            rating_count: user.rating.count,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct RatingResponse {
    pub rating: Option<f64>,
    pub rating_count: i64,
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            rating: rating.average(),
            rating_count: rating.count,
        }
    }
}

#[derive(Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<PhoneId>,
}

// ── POST /users/@me ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterProfileRequest {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn register_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<RegisterProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), MarketplaceError> {
    let usecase = RegisterProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(
            identity,
            RegisterProfileInput {
                name: body.name,
                email: body.email,
                phone_number: body.phone_number,
                address: body.address,
                avatar_url: body.avatar_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /users/@me ───────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, MarketplaceError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(identity).await?.into()))
}

// ── PATCH /users/@me ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

pub async fn update_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, MarketplaceError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
        effects: state.effects(),
    };
    let patch = ProfilePatch {
        name: body.name,
        phone_number: body.phone_number,
        address: body.address,
        avatar_url: body.avatar_url,
    };
    Ok(Json(usecase.execute(identity, patch).await?.into()))
}

// ── GET /users/@me/favorites ─────────────────────────────────────────────────

pub async fn get_favorites(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<Phone>>, MarketplaceError> {
    let usecase = GetFavoritesUseCase {
        favorites: state.favorite_repo(),
        listings: state.listing_repo(),
    };
    Ok(Json(usecase.execute(identity).await?))
}

// ── POST /users/@me/favorites/{phone_id} ─────────────────────────────────────

pub async fn toggle_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(phone_id): Path<PhoneId>,
) -> Result<Json<FavoritesResponse>, MarketplaceError> {
    let usecase = ToggleFavoriteUseCase {
        favorites: state.favorite_repo(),
        listings: state.listing_repo(),
    };
    let favorites = usecase.execute(identity, phone_id).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

// ── POST /users/{id}/ratings ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RateSellerRequest {
    pub score: i64,
}

pub async fn rate_seller(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(seller): Path<UserId>,
    Json(body): Json<RateSellerRequest>,
) -> Result<Json<RatingResponse>, MarketplaceError> {
    let score = u8::try_from(body.score).map_err(|_| MarketplaceError::InvalidRating)?;
    let usecase = RateSellerUseCase {
        users: state.user_repo(),
    };
    Ok(Json(usecase.execute(identity, seller, score).await?.into()))
}
