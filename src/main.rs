//! docqa server binary.

use std::sync::Arc;

use docqa::config::AppConfig;
use docqa::{server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::load()?;
    let bind_address = config.bind_address.clone();
    let state = Arc::new(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log::info!("docqa listening on http://{}", bind_address);

    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
