use std::time::Duration;

use async_trait::async_trait;
use bb8::{ManageConnection, Pool, RunError};
use bb8_tiberius::ConnectionManager;
use tiberius::Query;

use super::config::MssqlConfig;
use super::rows::row_to_record;
use crate::error::{PersistError, Result, SqlErrorDetail};
use crate::models::Record;
use crate::procedure::ProcedureCall;
use crate::trait_client::ProcedureClient;

/// Pooled SQL Server client shared by every request
pub struct MssqlClient {
    pool: Pool<ConnectionManager>,
}

impl MssqlClient {
    /// Open one connection directly before building the pool so a bad host
    /// or bad credentials surface here with the driver's own error instead
    /// of a pool checkout timeout.
    pub async fn connect(config: &MssqlConfig) -> Result<Self> {
        let manager = ConnectionManager::new(config.to_tiberius());
        let first = manager.connect().await.map_err(connect_error)?;

        let pool = Pool::builder()
            .max_size(config.pool.max)
            .min_idle(Some(config.pool.min))
            .idle_timeout(Some(Duration::from_millis(config.pool.idle_timeout_ms)))
            .build(manager)
            .await
            .map_err(connect_error)?;

        if pool.add(first).is_err() {
            tracing::debug!("Pool refused the initial connection, dropping it");
        }

        tracing::info!(host = %config.host, database = %config.database, "Connected to SQL Server");

        Ok(Self { pool })
    }
}

#[async_trait]
impl ProcedureClient for MssqlClient {
    async fn execute(&self, call: ProcedureCall) -> Result<Vec<Record>> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let mut query = Query::new(call.statement());
        for param in call.params() {
            query.bind(param.value.clone());
        }

        tracing::debug!(procedure = call.procedure(), params = call.params().len(), "Executing procedure");

        let rows = query
            .query(&mut *conn)
            .await
            .map_err(request_error)?
            .into_first_result()
            .await
            .map_err(request_error)?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn query(&self, sql: &str) -> Result<Vec<Record>> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows = conn
            .simple_query(sql)
            .await
            .map_err(request_error)?
            .into_first_result()
            .await
            .map_err(request_error)?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        conn.simple_query("SELECT 1")
            .await
            .map_err(request_error)?
            .into_row()
            .await
            .map_err(request_error)?;

        Ok(())
    }
}

/// SQL Server error number for a rejected login.
const LOGIN_FAILED: u32 = 18456;

fn pool_error(err: RunError<bb8_tiberius::Error>) -> PersistError {
    match err {
        RunError::User(e) => connect_error(e),
        RunError::TimedOut => {
            PersistError::Timeout("Timed out acquiring a connection from the pool".to_string())
        }
    }
}

fn connect_error(err: bb8_tiberius::Error) -> PersistError {
    match err {
        bb8_tiberius::Error::Io(e) => PersistError::Connection {
            code: "ESOCKET",
            message: e.to_string(),
        },
        bb8_tiberius::Error::Tiberius(tiberius::error::Error::Server(token)) => {
            let code = if token.code() == LOGIN_FAILED {
                "ELOGIN"
            } else {
                "ECONNECTION"
            };
            PersistError::Connection {
                code,
                message: token.message().to_string(),
            }
        }
        bb8_tiberius::Error::Tiberius(e) => match request_error(e) {
            PersistError::Request { error, .. } => PersistError::Connection {
                code: "ECONNECTION",
                message: error.message,
            },
            other => other,
        },
    }
}

fn request_error(err: tiberius::error::Error) -> PersistError {
    match err {
        tiberius::error::Error::Server(token) => PersistError::request(
            SqlErrorDetail::new("EREQUEST", token.message())
                .with_line(token.line())
                .with_number(token.code()),
        ),
        other @ (tiberius::error::Error::Io { .. }
        | tiberius::error::Error::Routing { .. }
        | tiberius::error::Error::Tls(_)) => PersistError::Connection {
            code: "ESOCKET",
            message: other.to_string(),
        },
        other => PersistError::request(SqlErrorDetail::new("EREQUEST", other.to_string())),
    }
}
