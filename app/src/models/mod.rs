// storelink/app/src/models/mod.rs

//! Canonical documents mirrored from the commerce platform.

pub mod order;
pub mod product;
pub mod vendor;

pub use order::{Customer, LineItem, Order, OrderPatch};
pub use product::Product;
pub use vendor::Vendor;
