use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::OrderId;
use phonemart_domain::order::OrderStatus;

use crate::domain::types::Order;
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::order::{
    MyOrdersUseCase, MySalesUseCase, PlaceOrderInput, PlaceOrderUseCase,
    UpdateOrderStatusUseCase,
};

// ── POST /orders ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub contact_number: String,
}

pub async fn place_order(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), MarketplaceError> {
    let usecase = PlaceOrderUseCase {
        carts: state.cart_repo(),
        orders: state.order_repo(),
        users: state.user_repo(),
        effects: state.effects(),
    };
    let order = usecase
        .execute(
            identity,
            PlaceOrderInput {
                delivery_address: body.delivery_address,
                contact_number: body.contact_number,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

// ── GET /orders/@mine ────────────────────────────────────────────────────────

pub async fn my_orders(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, MarketplaceError> {
    let usecase = MyOrdersUseCase {
        orders: state.order_repo(),
    };
    Ok(Json(usecase.execute(identity).await?))
}

// ── GET /orders/sales ────────────────────────────────────────────────────────

pub async fn my_sales(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, MarketplaceError> {
    let usecase = MySalesUseCase {
        orders: state.order_repo(),
    };
    Ok(Json(usecase.execute(identity).await?))
}

// ── PATCH /orders/{id}/status ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

pub async fn update_order_status(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>, MarketplaceError> {
    let usecase = UpdateOrderStatusUseCase {
        orders: state.order_repo(),
        effects: state.effects(),
    };
    Ok(Json(usecase.execute(identity, id, body.status).await?))
}
