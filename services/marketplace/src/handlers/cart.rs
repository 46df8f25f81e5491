use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::PhoneId;

use crate::domain::types::Cart;
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::cart::{
    AddToCartUseCase, ClearCartUseCase, GetCartUseCase, UpdateCartLineUseCase,
};

fn quantity(value: i64) -> Result<u32, MarketplaceError> {
    u32::try_from(value).map_err(|_| MarketplaceError::InvalidQuantity)
}

// ── GET /cart ────────────────────────────────────────────────────────────────

pub async fn get_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Cart>, MarketplaceError> {
    let usecase = GetCartUseCase {
        carts: state.cart_repo(),
    };
    Ok(Json(usecase.execute(identity).await?))
}

// ── POST /cart/items ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub phone_id: PhoneId,
    pub quantity: Option<i64>,
}

pub async fn add_to_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<Cart>, MarketplaceError> {
    let qty = body.quantity.map(quantity).transpose()?;
    let usecase = AddToCartUseCase {
        carts: state.cart_repo(),
        listings: state.listing_repo(),
        effects: state.effects(),
    };
    Ok(Json(usecase.execute(identity, body.phone_id, qty).await?))
}

// ── PATCH /cart/items/{phone_id} ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCartLineRequest {
    pub quantity: i64,
}

pub async fn update_cart_line(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(phone_id): Path<PhoneId>,
    Json(body): Json<UpdateCartLineRequest>,
) -> Result<Json<Cart>, MarketplaceError> {
    let qty = quantity(body.quantity)?;
    let usecase = UpdateCartLineUseCase {
        carts: state.cart_repo(),
        effects: state.effects(),
    };
    Ok(Json(usecase.execute(identity, phone_id, qty).await?))
}

// ── DELETE /cart ─────────────────────────────────────────────────────────────

pub async fn clear_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Cart>, MarketplaceError> {
    let usecase = ClearCartUseCase {
        carts: state.cart_repo(),
        effects: state.effects(),
    };
    Ok(Json(usecase.execute(identity).await?))
}
