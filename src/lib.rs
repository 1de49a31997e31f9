//! Internal Transfers - account ledger with atomic transfers
//!
//! Accounts hold a non-negative fixed-scale balance. A transfer moves an
//! amount between two accounts inside one unit of work and leaves an
//! auditable record whose status is `completed` or `failed`.
//!
//! # Modules
//!
//! - [`money`] - Exact fixed-point amounts (scale 5)
//! - [`error`] - Error taxonomy with stable codes and HTTP statuses
//! - [`db`] - Unit-of-work seam, PostgreSQL pool, in-memory backend
//! - [`account`] - Account models, repository and service
//! - [`transfer`] - Record lifecycle, record repository and the transfer engine
//! - [`service`] - Object-safe facade consumed by the gateway
//! - [`gateway`] - axum HTTP boundary and OpenAPI document
//! - [`config`] / [`logging`] - YAML configuration and tracing setup

pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod money;
pub mod service;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{Account, AccountId};
pub use error::AppError;
pub use money::Money;
pub use service::{Ledger, LedgerService};
pub use transfer::{TransactionId, TransferRecord, TransferStatus};
