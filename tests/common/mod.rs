use std::path::PathBuf;

use microblog::db_helpers::{create_tables, drop_tables};
use microblog::{get_random_free_port, init_db, make_router, run_app};
use sqlx::SqlitePool;

// Every test gets its own database file so they can run in parallel.
pub async fn setup_db(name: &str) -> SqlitePool {
    let mut path: PathBuf = std::env::temp_dir();
    path.push(format!(
        "microblog_test_{}_{}.db",
        std::process::id(),
        name
    ));
    let _ = std::fs::remove_file(&path);
    let db_url = format!("sqlite://{}", path.display());
    let pool = init_db(&db_url).await.expect("Failed to open test database");
    drop_tables(&pool).await.expect("Failed to drop tables");
    create_tables(&pool).await.expect("Failed to create tables");
    pool
}

static JWT_SECRET: std::sync::Once = std::sync::Once::new();

#[allow(dead_code)]
pub async fn spawn_app(name: &str) -> String {
    JWT_SECRET.call_once(|| std::env::set_var("JWT_SECRET", "test-secret"));
    let pool = setup_db(name).await;
    let (port, addr) = get_random_free_port();
    tokio::spawn(run_app(make_router(), addr, pool));

    let base_url = format!("http://localhost:{}", port);
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(response) = client.get(format!("{}/check_health", base_url)).send().await {
            if response.status().is_success() {
                return base_url;
            }
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("Server did not start at {}", base_url);
}
