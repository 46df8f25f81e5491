use phonemart_auth_types::identity::IdentityHeaders;
use phonemart_domain::id::UserId;
use phonemart_domain::user::{Capability, Role};

use crate::domain::repository::UserRepository;
use crate::domain::types::Rating;
use crate::error::MarketplaceError;

pub struct RateSellerUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RateSellerUseCase<U> {
    /// Adds one 1..=5 score to a seller's aggregate and returns the new aggregate.
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        seller: UserId,
        score: u8,
    ) -> Result<Rating, MarketplaceError> {
        actor.require(Capability::Purchase)?;
        if !(1..=5).contains(&score) {
            return Err(MarketplaceError::InvalidRating);
        }
        if seller == actor.user_id {
            return Err(MarketplaceError::Forbidden);
        }
        let target = self
            .users
            .find(seller)
            .await?
            .filter(|u| u.role == Role::Seller)
            .ok_or(MarketplaceError::UserNotFound)?;

        self.users
            .record_rating(target.id, score)
            .await?
            .ok_or(MarketplaceError::UserNotFound)
    }
}
