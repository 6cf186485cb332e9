use orgchart_api::config::{self, StoreBackend};
use orgchart_api::server;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();
    server::init_tracing();

    let config = config::config();

    // An in-memory store starts with the sample organisation
    let seed = config.database.backend == StoreBackend::Memory;

    if let Err(e) = server::run(config, seed).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
