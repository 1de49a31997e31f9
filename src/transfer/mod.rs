//! Internal transfers between accounts
//!
//! A transfer debits one account and credits another inside a single unit of
//! work, leaving an auditable record whose status says what happened.
//!
//! # Record Lifecycle
//!
//! ```text
//! pending → completed
//!    ↓
//!  failed
//! ```
//!
//! See [`engine`] for the locking protocol.

pub mod db;
pub mod engine;
pub mod state;
pub mod types;

pub use db::{PgTransactionStore, TransactionStore};
pub use engine::TransferEngine;
pub use state::TransferStatus;
pub use types::{NewTransfer, TransactionId, TransferRecord};
