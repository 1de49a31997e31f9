use std::sync::Arc;
use std::time::Duration;

use crate::service::LedgerService;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Ledger operations
    pub ledger: Arc<dyn LedgerService>,
    /// Deadline for one request; an expired transfer is rolled back
    pub request_timeout: Duration,
    /// Reported by the health endpoint: crate version and git revision
    pub version: String,
}

impl AppState {
    pub fn new(ledger: Arc<dyn LedgerService>, request_timeout: Duration) -> Self {
        Self {
            ledger,
            request_timeout,
            version: format!("{}+{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH")),
        }
    }
}
