use intake_cloud::api;
use intake_cloud::config::Config;
use intake_cloud::error::BoxError;
use intake_cloud::state::AppState;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        "Starting intake-cloud (env: {}, backend: {:?})",
        config.environment,
        config.backend
    );

    let state = AppState::new(&config).await?;
    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("intake-cloud HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
