// storelink/app/src/web/handlers/mod.rs

pub mod diagnostics_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod sync_handlers;
pub mod vendor_handlers;
pub mod webhook_handlers;
