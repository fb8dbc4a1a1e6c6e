#![allow(dead_code)]

use coinvault::{config::AppConfig, db, repository::SqliteCoinRepository};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// A file-backed store in a fresh temporary directory. Keep the `TempDir`
/// alive for as long as the pool is used.
pub async fn temp_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let url = format!("sqlite://{}", dir.path().join("coins.db").display());
    let pool = db::connect(&AppConfig::for_database(url))
        .await
        .expect("temporary store should open");
    (dir, pool)
}

/// A migrated store wrapped in the repository.
pub async fn temp_repo() -> (TempDir, SqliteCoinRepository) {
    use coinvault::repository::CoinRepository;

    let (dir, pool) = temp_pool().await;
    let repo = SqliteCoinRepository::new(pool);
    repo.init().await.expect("schema init should succeed");
    (dir, repo)
}
