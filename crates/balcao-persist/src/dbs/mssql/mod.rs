mod client;
mod config;
mod rows;

pub use client::MssqlClient;
pub use config::{MssqlConfig, PoolConfig};
