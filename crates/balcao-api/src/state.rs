use std::sync::Arc;

use balcao_persist::{CustomerRepository, ProcedureClient, ThreadRepository};

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The database client is created once at startup and lives for the whole
/// process; handlers only ever see it through the repositories.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn ProcedureClient>,
    pub customers: CustomerRepository,
    pub threads: ThreadRepository,
}

impl AppState {
    pub fn new(config: Config, db: Arc<dyn ProcedureClient>) -> Self {
        Self {
            config: Arc::new(config),
            customers: CustomerRepository::new(db.clone()),
            threads: ThreadRepository::new(db.clone()),
            db,
        }
    }

    /// Whether error bodies may include normalized driver details
    pub fn expose_details(&self) -> bool {
        self.config.is_development()
    }
}
