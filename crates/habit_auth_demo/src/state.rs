use crate::models::User;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub users_path: PathBuf,
    pub users: Arc<Mutex<Vec<User>>>,
}

impl AppState {
    pub fn new(users_path: PathBuf, users: Vec<User>) -> Self {
        Self {
            users_path,
            users: Arc::new(Mutex::new(users)),
        }
    }
}
