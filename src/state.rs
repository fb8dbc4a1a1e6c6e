use std::sync::Arc;

use crate::repository::CoinRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CoinRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn CoinRepository>) -> Self {
        Self { repo }
    }
}
