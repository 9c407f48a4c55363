use crate::errors::AppError;
use crate::models::User;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub fn resolve_users_path() -> PathBuf {
    if let Ok(path) = env::var("AUTH_USERS_PATH") {
        return PathBuf::from(path);
    }
    PathBuf::from("data/users.json")
}

pub async fn load_users(path: &Path) -> Vec<User> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(users) => users,
            Err(err) => {
                error!("failed to parse users file: {err}");
                Vec::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            error!("failed to read users file: {err}");
            Vec::new()
        }
    }
}

pub async fn persist_users(path: &Path, users: &[User]) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(users).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}
