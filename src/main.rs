mod access;
mod app;
mod auth;
mod children;
mod config;
mod error;
mod extract;
mod folders;
mod notes;
mod seed;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "notenext=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;
    tracing::info!(backend = ?app_state.config.store_backend, "store ready");

    if app_state.config.seed_demo_data {
        seed::seed_demo_data(app_state.store.as_ref()).await?;
    }

    app::serve(app::build_app(app_state)).await
}
