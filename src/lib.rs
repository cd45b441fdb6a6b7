pub mod authentication;
pub mod data_formats;
pub mod db_helpers;
pub mod errors;
mod handlers;
pub mod models;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
use handlers::*;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, address: SocketAddr, db: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(db)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        println!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    }
    // One connection total: every request shares it, so statement order is
    // the only ordering guarantee.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(db_url)
        .await?;
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    let api = Router::new()
        .route("/users", get(get_users))
        .route("/users/register", post(register_user))
        .route("/users/login", post(login_user))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:post_id", patch(update_post).delete(delete_post))
        .route("/tags", get(list_tags))
        .route("/tags/:tag_name/posts", get(get_posts_by_tag));
    Router::new()
        .route("/check_health", get(alive))
        .nest("/api", api)
        .fallback(not_found)
}
