// storelink/app/src/services/mod.rs

//! Collaborators behind narrow interfaces: commerce API, email, SMS, plus the
//! signature check, templates and notification fan-out built on them.

pub mod commerce;
pub mod email;
pub mod notifier;
pub mod signature;
pub mod sms;
pub mod templates;
