//! Account management module
//!
//! Accounts are created with a client-chosen id and a non-negative starting
//! balance. After creation their balance only changes through transfers.

pub mod models;
pub mod repository;
pub mod service;

pub use models::{Account, AccountId};
pub use repository::{AccountStore, PgAccountStore};
pub use service::AccountService;
