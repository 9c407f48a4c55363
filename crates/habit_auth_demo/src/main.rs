use std::net::SocketAddr;

use habit_auth_demo::app::router;
use habit_auth_demo::state::AppState;
use habit_auth_demo::storage::{load_users, resolve_users_path};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure logging from `HABITS_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("HABITS_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let users_path = resolve_users_path();
    if let Some(parent) = users_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let users = load_users(&users_path).await;
    info!(users = users.len(), path = %users_path.display(), "user store loaded");

    let state = AppState::new(users_path, users);
    let app = router(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    info!("auth demo listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
