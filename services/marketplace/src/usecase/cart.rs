use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::{PhoneId, UserId};
use phonemart_domain::user::Capability;

use crate::domain::repository::{CartRepository, ListingRepository, SideEffectPort};
use crate::domain::types::{Cart, MAX_LINE_QUANTITY, Notification};
use crate::error::MarketplaceError;
use crate::usecase::effects::PostCommit;

async fn load_cart<C: CartRepository>(carts: &C, user: UserId) -> Result<Cart, MarketplaceError> {
    Cart::new(user, carts.lines(user).await?).ok_or(MarketplaceError::TotalTooLarge)
}

fn check_quantity(quantity: u32) -> Result<u32, MarketplaceError> {
    if quantity == 0 || quantity > MAX_LINE_QUANTITY {
        return Err(MarketplaceError::InvalidQuantity);
    }
    Ok(quantity)
}

async fn publish_cart<E: SideEffectPort>(effects: &E, cart: &Cart) {
    let mut post = PostCommit::new();
    post.notify(Notification::cart_updated(cart.clone()));
    post.run(effects).await;
}

// ── GetCart ──────────────────────────────────────────────────────────────────

pub struct GetCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> GetCartUseCase<C> {
    pub async fn execute(&self, actor: IdentityHeaders) -> Result<Cart, MarketplaceError> {
        actor.require(Capability::Purchase)?;
        load_cart(&self.carts, actor.user_id).await
    }
}

// ── AddToCart ────────────────────────────────────────────────────────────────

pub struct AddToCartUseCase<C: CartRepository, L: ListingRepository, E: SideEffectPort> {
    pub carts: C,
    pub listings: L,
    pub effects: E,
}

impl<C: CartRepository, L: ListingRepository, E: SideEffectPort> AddToCartUseCase<C, L, E> {
    /// Increments the line if the listing is already in the cart. The merged quantity
    /// is capped at `MAX_LINE_QUANTITY`.
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        phone_id: PhoneId,
        quantity: Option<u32>,
    ) -> Result<Cart, MarketplaceError> {
        actor.require(Capability::Purchase)?;
        let quantity = check_quantity(quantity.unwrap_or(1))?;
        let phone = self
            .listings
            .find(phone_id)
            .await?
            .ok_or(MarketplaceError::ListingNotFound)?;
        if !phone.is_purchasable() {
            return Err(MarketplaceError::ListingUnavailable);
        }
        if phone.price.checked_mul(i64::from(quantity)).is_none() {
            return Err(MarketplaceError::TotalTooLarge);
        }

        self.carts.add(actor.user_id, phone_id, quantity).await?;
        let cart = load_cart(&self.carts, actor.user_id).await?;
        publish_cart(&self.effects, &cart).await;
        Ok(cart)
    }
}

// ── UpdateCartLine ───────────────────────────────────────────────────────────

pub struct UpdateCartLineUseCase<C: CartRepository, E: SideEffectPort> {
    pub carts: C,
    pub effects: E,
}

impl<C: CartRepository, E: SideEffectPort> UpdateCartLineUseCase<C, E> {
    /// `quantity == 0` removes the line. A listing not in the cart is left alone and
    /// nothing is published.
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        phone_id: PhoneId,
        quantity: u32,
    ) -> Result<Cart, MarketplaceError> {
        actor.require(Capability::Purchase)?;
        let changed = if quantity == 0 {
            self.carts.remove(actor.user_id, phone_id).await?
        } else {
            self.carts
                .set_quantity(actor.user_id, phone_id, check_quantity(quantity)?)
                .await?
        };

        let cart = load_cart(&self.carts, actor.user_id).await?;
        if changed {
            publish_cart(&self.effects, &cart).await;
        }
        Ok(cart)
    }
}

// ── ClearCart ────────────────────────────────────────────────────────────────

pub struct ClearCartUseCase<C: CartRepository, E: SideEffectPort> {
    pub carts: C,
    pub effects: E,
}

impl<C: CartRepository, E: SideEffectPort> ClearCartUseCase<C, E> {
    pub async fn execute(&self, actor: IdentityHeaders) -> Result<Cart, MarketplaceError> {
        actor.require(Capability::Purchase)?;
        self.carts.clear(actor.user_id).await?;
        let cart = Cart::empty(actor.user_id);
        publish_cart(&self.effects, &cart).await;
        Ok(cart)
    }
}
