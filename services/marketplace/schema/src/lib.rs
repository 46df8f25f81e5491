//! sea-orm entities for the marketplace database.

pub mod cart_items;
pub mod favorites;
pub mod order_items;
pub mod orders;
pub mod phones;
pub mod users;
