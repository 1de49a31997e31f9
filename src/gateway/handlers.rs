//! HTTP handlers
//!
//! Handlers only translate between HTTP and [`LedgerService`] calls; all
//! business rules live behind the service.
//!
//! [`LedgerService`]: crate::service::LedgerService

pub mod account;
pub mod health;
pub mod transfer;

pub use account::{create_account, get_account};
pub use health::health_check;
pub use transfer::{create_transaction, get_transaction};

