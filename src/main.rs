use anyhow::{Context, Result};
use cmr_stac_api::{common::state::AppState, config::Config, routes};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing(&config);

    info!(
        app = %config.app_name,
        deployment = %config.deployment,
        cmr_url = %config.cmr_url,
        stac_version = %config.stac_version,
        "Starting"
    );

    let state = AppState::from_config(config.clone())?;
    let router = routes::build_router(&state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
