pub mod error;
pub mod models;
pub mod procedure;
pub mod repositories;
pub mod trait_client;

#[cfg(feature = "mssql")]
pub mod dbs;

pub use error::{PersistError, Result, SqlErrorDetail};
pub use models::{CustomerInput, Record, ThreadInput};
pub use procedure::{ProcedureCall, SqlParam, SqlType};
pub use repositories::{CustomerRepository, ThreadRepository};
pub use trait_client::ProcedureClient;

#[cfg(feature = "mssql")]
pub use dbs::mssql::{MssqlClient, MssqlConfig, PoolConfig};
