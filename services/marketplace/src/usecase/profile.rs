use chrono::Utc;

use phonemart_auth_types::identity::IdentityHeaders;

use crate::domain::repository::{SideEffectPort, UserRepository};
use crate::domain::types::{ProfilePatch, Rating, User};
use crate::error::MarketplaceError;
use crate::usecase::effects::PostCommit;

// ── RegisterProfile ──────────────────────────────────────────────────────────

pub struct RegisterProfileInput {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

pub struct RegisterProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RegisterProfileUseCase<U> {
    /// The profile takes the identity's id and role.
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        input: RegisterProfileInput,
    ) -> Result<User, MarketplaceError> {
        let name = input.name.trim().to_owned();
        let email = input.email.trim().to_lowercase();
        if name.is_empty() || !email.contains('@') {
            return Err(MarketplaceError::MissingData);
        }

        let now = Utc::now();
        let user = User {
            id: actor.user_id,
            name,
            email,
            role: actor.role,
            phone_number: input.phone_number,
            address: input.address,
            avatar_url: input.avatar_url,
            rating: Rating::default(),
            created_at: now,
            updated_at: now,
        };
        if !self.users.create(&user).await? {
            return Err(MarketplaceError::UserAlreadyExists);
        }
        Ok(user)
    }
}

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, actor: IdentityHeaders) -> Result<User, MarketplaceError> {
        self.users
            .find(actor.user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<U: UserRepository, E: SideEffectPort> {
    pub users: U,
    pub effects: E,
}

impl<U: UserRepository, E: SideEffectPort> UpdateProfileUseCase<U, E> {
    pub async fn execute(
        &self,
        actor: IdentityHeaders,
        patch: ProfilePatch,
    ) -> Result<User, MarketplaceError> {
        if patch.is_empty() {
            return Err(MarketplaceError::MissingData);
        }
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(MarketplaceError::MissingData);
        }
        let before = self
            .users
            .find(actor.user_id)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;
        let after = self
            .users
            .update_profile(actor.user_id, &patch)
            .await?
            .ok_or(MarketplaceError::UserNotFound)?;

        let mut post = PostCommit::new();
        if let Some(old) = before.avatar_url {
            if after.avatar_url.as_deref() != Some(old.as_str()) {
                post.delete_media(old);
            }
        }
        post.run(&self.effects).await;
        Ok(after)
    }
}
