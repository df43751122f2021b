use votebridge::{create_router, init, AppState, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading configuration
    dotenv::dotenv().ok();

    // Initialize the application
    init()?;

    let config = Config::from_env()?;
    log::debug!("Loaded configuration: {:?}", config);
    let addr = config.bind_addr;

    // Initialize application state
    let state = AppState::with_config(config)?;

    // Build our application with routes
    let app = create_router(state);

    // Set up the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
