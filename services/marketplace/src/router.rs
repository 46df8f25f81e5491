use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use phonemart_auth_types::bearer::{BearerAuth, inject_bearer_identity};
use phonemart_core::health::healthz;
use phonemart_core::middleware::request_id_layer;

use crate::handlers::{
    admin::{
        all_phones, approve_phone, batch_approve, dashboard, pending_phones, reject_phone,
        review_phone,
    },
    cart::{add_to_cart, clear_cart, get_cart, update_cart_line},
    health::readyz,
    orders::{my_orders, my_sales, place_order, update_order_status},
    phones::{browse_phones, create_phone, delete_phone, get_phone, my_phones, update_phone},
    users::{
        get_favorites, get_me, rate_seller, register_me, toggle_favorite, update_me,
    },
    ws::notifications_ws,
};
use crate::state::AppState;

/// Build the HTTP router. With `bearer` set, `Authorization: Bearer` tokens replace the
/// gateway identity headers.
pub fn build_router(state: AppState, bearer: Option<BearerAuth>) -> Router {
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/users/@me", post(register_me).get(get_me).patch(update_me))
        .route("/users/@me/favorites", get(get_favorites))
        .route("/users/@me/favorites/{phone_id}", post(toggle_favorite))
        .route("/users/{id}/ratings", post(rate_seller))
        // Phones
        .route("/phones", get(browse_phones).post(create_phone))
        .route("/phones/@mine", get(my_phones))
        .route(
            "/phones/{id}",
            get(get_phone).patch(update_phone).delete(delete_phone),
        )
        // Cart
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_to_cart))
        .route("/cart/items/{phone_id}", patch(update_cart_line))
        // Orders
        .route("/orders", post(place_order))
        .route("/orders/@mine", get(my_orders))
        .route("/orders/sales", get(my_sales))
        .route("/orders/{id}/status", patch(update_order_status))
        // Moderation
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/phones", get(all_phones))
        .route("/admin/phones/pending", get(pending_phones))
        .route("/admin/phones/batch-approve", post(batch_approve))
        .route("/admin/phones/{id}", get(review_phone))
        .route("/admin/phones/{id}/approve", post(approve_phone))
        .route("/admin/phones/{id}/reject", post(reject_phone))
        // Notifications
        .route("/ws", get(notifications_ws))
        .with_state(state);

    let router = match bearer {
        Some(auth) => router.layer(middleware::from_fn_with_state(auth, inject_bearer_identity)),
        None => router,
    };
    router
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}
