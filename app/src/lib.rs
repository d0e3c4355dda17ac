// storelink/app/src/lib.rs

//! storelink: keeps a local mirror of WooCommerce/Dokan orders, products and
//! vendors, fed by signed webhooks and paginated sync jobs, and notifies
//! customers, the store owner and vendors about new orders.

pub mod config;
pub mod errors;
pub mod mapping;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
