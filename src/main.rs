use std::net::SocketAddr;

use anyhow::Context;
use microblog::{init_db, make_router, run_app};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let router = make_router();
    println!("Server started on {}", addr);
    match serve(router, addr).await {
        Ok(_) => (),
        Err(error) => println!("Error: {}", error),
    }
}

async fn serve(router: axum::Router, addr: SocketAddr) -> microblog::Result<()> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = init_db(&db_url).await?;
    run_app(router, addr, db).await
}
