//! Feature modules, one per screen, plus the helpers they share.

pub mod auth;
pub mod dashboard;
pub mod export;
pub mod format;
pub mod pagination;
pub mod screen;
pub mod transactions;
pub mod withdrawals;
