use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::{app, AppState};
use crate::auth::Authenticator;
use crate::config::AppConfig;
use crate::database::open_store;
use crate::fixtures::{self, Fixtures};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orgchart_api=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Open the store, build the router and serve until the process is stopped.
pub async fn run(config: &AppConfig, seed: bool) -> anyhow::Result<()> {
    info!("Starting orgchart-api in {:?} mode", config.environment);

    let store = open_store(&config.database).await.context("opening store")?;
    if seed {
        fixtures::seed(store.clone(), &Fixtures::builtin()?, true).await?;
    }
    let auth = Authenticator::from_config(&config.security)?;

    let router = app(AppState::new(store, auth), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("orgchart-api listening on http://{}", bind_addr);
    axum::serve(listener, router).await.context("server")?;
    Ok(())
}
