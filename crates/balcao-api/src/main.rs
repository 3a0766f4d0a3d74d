use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use balcao_api::{build_router, config::Config, state::AppState};
use balcao_persist::{MssqlClient, ProcedureClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Balcao API server");
    tracing::info!(environment = ?config.environment, "Config loaded: {}", config.listen_addr());

    // The service is useless without the database, so refuse to start
    let db: Arc<dyn ProcedureClient> = match MssqlClient::connect(&config.database).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(
                code = e.code().unwrap_or("UNKNOWN"),
                server = %config.database.host,
                message = %e
            );
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(config.clone(), db));
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
