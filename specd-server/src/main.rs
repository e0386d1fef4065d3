use specd_server::{app, config::ServerConfig, service::scheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "specd_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting specd server...");

    let config = ServerConfig::from_env()?;

    let app = app::build(&config).await?;

    // The execution subsystem consumes registrations; here they are logged
    tokio::spawn(scheduler::run_registration_log(app.scheduled));

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    axum::serve(listener, app.router).await?;

    Ok(())
}
