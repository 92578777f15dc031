use marketplace_admin::config::Config;
use marketplace_admin::server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketplace_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting marketplace admin on {}", config.address());

    let (host, port) = (config.host.clone(), config.port);
    let (_state, app) = server::build_app(config)?;
    let (port, handle) = server::serve(app, &host, port).await?;

    tracing::info!("Listening on http://{}:{}", host, port);
    handle.await?;
    Ok(())
}
