use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use phonemart_auth_types::identity::Forbidden;
use phonemart_domain::order::OrderStatus;

/// Marketplace service error variants.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("forbidden")]
    Forbidden,
    #[error("listing not found")]
    ListingNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("order not found")]
    OrderNotFound,
    #[error("listing is not available")]
    ListingUnavailable,
    #[error("only pending listings can be moderated")]
    InvalidListingState,
    #[error("order cannot move from {from} to {to}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },
    #[error("a listing in the cart has already been sold")]
    ListingSoldOut,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("Cart is empty")]
    EmptyCart,
    #[error("a rejection reason is required")]
    MissingRejectionReason,
    #[error("quantity must be between 1 and 99")]
    InvalidQuantity,
    #[error("cart total exceeds the supported amount")]
    TotalTooLarge,
    #[error("rating must be between 1 and 5")]
    InvalidRating,
    #[error("missing data")]
    MissingData,
    #[error("invalid listing: {0}")]
    InvalidListing(&'static str),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::ListingNotFound => "LISTING_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::ListingUnavailable => "LISTING_UNAVAILABLE",
            Self::InvalidListingState => "INVALID_LISTING_STATE",
            Self::InvalidOrderTransition { .. } => "INVALID_ORDER_TRANSITION",
            Self::ListingSoldOut => "LISTING_SOLD_OUT",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::EmptyCart => "EMPTY_CART",
            Self::MissingRejectionReason => "MISSING_REJECTION_REASON",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::TotalTooLarge => "TOTAL_TOO_LARGE",
            Self::InvalidRating => "INVALID_RATING",
            Self::MissingData => "MISSING_DATA",
            Self::InvalidListing(_) => "INVALID_LISTING",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<Forbidden> for MarketplaceError {
    fn from(_: Forbidden) -> Self {
        Self::Forbidden
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ListingNotFound
            | Self::UserNotFound
            | Self::OrderNotFound
            | Self::ListingUnavailable => StatusCode::NOT_FOUND,
            Self::InvalidListingState
            | Self::InvalidOrderTransition { .. }
            | Self::ListingSoldOut
            | Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::EmptyCart
            | Self::MissingRejectionReason
            | Self::InvalidQuantity
            | Self::TotalTooLarge
            | Self::InvalidRating
            | Self::MissingData
            | Self::InvalidListing(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
