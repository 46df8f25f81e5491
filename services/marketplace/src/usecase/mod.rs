pub mod cart;
pub mod effects;
pub mod favorite;
pub mod listing;
pub mod moderation;
pub mod order;
pub mod profile;
pub mod rating;
