use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbCartRepository, DbFavoriteRepository, DbListingRepository, DbOrderRepository,
    DbUserRepository,
};
use crate::infra::effects::EffectDispatcher;
use crate::infra::mail::Mailer;
use crate::infra::media::MediaClient;
use crate::infra::notify::NotificationHub;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub hub: NotificationHub,
    pub mailer: Mailer,
    pub media: MediaClient,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn favorite_repo(&self) -> DbFavoriteRepository {
        DbFavoriteRepository {
            db: self.db.clone(),
        }
    }

    pub fn listing_repo(&self) -> DbListingRepository {
        DbListingRepository {
            db: self.db.clone(),
        }
    }

    pub fn cart_repo(&self) -> DbCartRepository {
        DbCartRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn effects(&self) -> EffectDispatcher {
        EffectDispatcher {
            hub: self.hub.clone(),
            mailer: self.mailer.clone(),
            media: self.media.clone(),
        }
    }
}
