use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{email::Mailer, payments::PaymentGateway};

/// Shared application state, constructed once in `main` and cloned into each
/// worker. The pool is the only shared mutable resource; handlers hold no
/// other cross-request state.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub payments: Arc<dyn PaymentGateway>,
    pub mailer: Option<Mailer>,
}
