pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod normalize;
pub mod router;
pub mod routes;
pub mod state;

pub use router::build_router;
