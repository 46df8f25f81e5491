use chrono::Utc;
use uuid::Uuid;

use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::OrderId;
use phonemart_domain::order::OrderStatus;
use phonemart_domain::user::Capability;

use crate::domain::repository::{CartRepository, OrderRepository, SideEffectPort, UserRepository};
use crate::domain::types::{Cart, Email, Notification, NotificationEvent, Order};
use crate::error::MarketplaceError;
use crate::usecase::effects::PostCommit;

// ── PlaceOrder ───────────────────────────────────────────────────────────────

pub struct PlaceOrderInput {
    pub delivery_address: String,
    pub contact_number: String,
}

pub struct PlaceOrderUseCase<
    C: CartRepository,
    O: OrderRepository,
    U: UserRepository,
    E: SideEffectPort,
> {
    pub carts: C,
    pub orders: O,
    pub users: U,
    pub effects: E,
}

impl<C, O, U, E> PlaceOrderUseCase<C, O, U, E>
where
    C: CartRepository,
    O: OrderRepository,
    U: UserRepository,
    E: SideEffectPort,
{
    /// Lines are priced at the listings' current prices, not at add-to-cart time.
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        input: PlaceOrderInput,
    ) -> Result<Order, MarketplaceError> {
        actor.require(Capability::Purchase)?;
        let delivery_address = input.delivery_address.trim().to_owned();
        let contact_number = input.contact_number.trim().to_owned();
        if delivery_address.is_empty() || contact_number.is_empty() {
            return Err(MarketplaceError::MissingData);
        }

        let cart = Cart::new(actor.user_id, self.carts.lines(actor.user_id).await?)
            .ok_or(MarketplaceError::TotalTooLarge)?;
        if cart.is_empty() {
            return Err(MarketplaceError::EmptyCart);
        }
        if cart.items.iter().any(|line| !line.phone.is_purchasable()) {
            return Err(MarketplaceError::ListingSoldOut);
        }
        let buyer = self
            .users
            .find(actor.user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;

        let order = Order::from_cart(
            OrderId(Uuid::now_v7()),
            &cart,
            delivery_address,
            contact_number,
            Utc::now(),
        )
        .ok_or(MarketplaceError::TotalTooLarge)?;
        self.orders.place(&order).await?;

        let mut post = PostCommit::new();
        for seller in order.sellers() {
            post.notify(Notification::to_user(
                seller,
                NotificationEvent::NewOrder {
                    order_id: order.id,
                    buyer_id: order.buyer_id,
                    items: order.items_for(seller),
                },
            ));
        }
        post.notify(Notification::cart_updated(Cart::empty(actor.user_id)));
        post.send_email(Email::order_confirmation(&buyer.email, &buyer.name, &order));
        post.run(&self.effects).await;
        Ok(order)
    }
}

// ── MyOrders ─────────────────────────────────────────────────────────────────

pub struct MyOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> MyOrdersUseCase<O> {
    pub async fn execute(&self, actor: IdentityHeaders) -> Result<Vec<Order>, MarketplaceError> {
        actor.require(Capability::Purchase)?;
        self.orders.list_by_buyer(actor.user_id).await
    }
}

// ── MySales ──────────────────────────────────────────────────────────────────

pub struct MySalesUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> MySalesUseCase<O> {
    /// Each order reduced to the caller's own lines.
    pub async fn execute(&self, actor: IdentityHeaders) -> Result<Vec<Order>, MarketplaceError> {
        actor.require(Capability::ViewSales)?;
        let orders = self.orders.list_containing_seller(actor.user_id).await?;
        Ok(orders
            .into_iter()
            .filter_map(|order| order.for_seller(actor.user_id))
            .collect())
    }
}

// ── UpdateOrderStatus ────────────────────────────────────────────────────────

pub struct UpdateOrderStatusUseCase<O: OrderRepository, E: SideEffectPort> {
    pub orders: O,
    pub effects: E,
}

impl<O: OrderRepository, E: SideEffectPort> UpdateOrderStatusUseCase<O, E> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        id: OrderId,
        to: OrderStatus,
    ) -> Result<Order, MarketplaceError> {
        actor.require(Capability::ManageOrders)?;
        let order = self
            .orders
            .find(id)
            .await?
            .ok_or(MarketplaceError::OrderNotFound)?;
        let from = order.status;
        if !from.can_become(to) {
            return Err(MarketplaceError::InvalidOrderTransition { from, to });
        }
        let updated = self
            .orders
            .update_status(id, from, to)
            .await?
            .ok_or(MarketplaceError::InvalidOrderTransition { from, to })?;

        let mut post = PostCommit::new();
        post.notify(Notification::to_user(
            updated.buyer_id,
            NotificationEvent::OrderStatusUpdated {
                order_id: updated.id,
                status: updated.status,
            },
        ));
        post.run(&self.effects).await;
        Ok(updated)
    }
}
