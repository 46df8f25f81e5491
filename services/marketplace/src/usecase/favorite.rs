use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::PhoneId;

use crate::domain::repository::{FavoriteRepository, ListingRepository};
use crate::domain::types::Phone;
use crate::error::MarketplaceError;

// ── ToggleFavorite ───────────────────────────────────────────────────────────

pub struct ToggleFavoriteUseCase<F: FavoriteRepository, L: ListingRepository> {
    pub favorites: F,
    pub listings: L,
}

impl<F: FavoriteRepository, L: ListingRepository> ToggleFavoriteUseCase<F, L> {
    /// Returns the favorites after the toggle, in insertion order.
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        phone_id: PhoneId,
    ) -> Result<Vec<PhoneId>, MarketplaceError> {
        if self.listings.find(phone_id).await?.is_none() {
            return Err(MarketplaceError::ListingNotFound);
        }
        self.favorites.toggle(actor.user_id, phone_id).await?;
        self.favorites.list(actor.user_id).await
    }
}

// ── GetFavorites ─────────────────────────────────────────────────────────────

pub struct GetFavoritesUseCase<F: FavoriteRepository, L: ListingRepository> {
    pub favorites: F,
    pub listings: L,
}

impl<F: FavoriteRepository, L: ListingRepository> GetFavoritesUseCase<F, L> {
    pub async fn execute(&self, actor: IdentityHeaders) -> Result<Vec<Phone>, MarketplaceError> {
        let ids = self.favorites.list(actor.user_id).await?;
        self.listings.find_many(&ids).await
    }
}
