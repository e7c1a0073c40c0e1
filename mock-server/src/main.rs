use mock_server::AppState;
use solmask_core::{Config, DEFAULT_PORT};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("SOLMASK_CONFIG") {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::default(),
    };
    let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
    let addr = format!("127.0.0.1:{port}");

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, masks = %config.masks.dir.display(), "listening");
    mock_server::run(listener, AppState::from_config(&config.masks)).await?;
    Ok(())
}
