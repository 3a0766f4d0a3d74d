use async_trait::async_trait;

use crate::error::Result;
use crate::models::Record;
use crate::procedure::ProcedureCall;

/// Trait for running statements against the database
///
/// Implementations own the connection pool; callers build a fresh
/// `ProcedureCall` per request.
#[async_trait]
pub trait ProcedureClient: Send + Sync {
    /// Execute a stored procedure and return its first result set
    async fn execute(&self, call: ProcedureCall) -> Result<Vec<Record>>;

    /// Run an inline statement and return its first result set
    async fn query(&self, sql: &str) -> Result<Vec<Record>>;

    /// Check that a connection can be obtained and used
    async fn ping(&self) -> Result<()>;
}
