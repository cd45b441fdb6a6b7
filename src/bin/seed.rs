// Drops and rebuilds the schema, then loads starter data. Run against the
// same DATABASE_URL the server uses.

use anyhow::Context;
use microblog::data_formats::RegisterRequest;
use microblog::db_helpers::{
    create_post_in_db, create_tables, drop_tables, insert_user, CreatePostFields,
};
use microblog::init_db;
use microblog::models::User;
use sqlx::SqlitePool;

#[tokio::main]
async fn main() -> microblog::Result<()> {
    dotenvy::dotenv().ok();
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db(&db_url).await?;

    println!("Starting to drop tables...");
    drop_tables(&pool).await?;
    println!("Finished dropping tables!");

    println!("Starting to build tables...");
    create_tables(&pool).await?;
    println!("Finished building tables!");

    println!("Starting to create users...");
    let albert = seed_user(&pool, "albert", "bertie99", "albert", "US").await?;
    let sandra = seed_user(&pool, "sandra", "2sandy4me", "sandra", "US").await?;
    let glamgal = seed_user(&pool, "glamgal", "soglam", "gladys", "US").await?;
    println!("{:?} {:?} {:?}", albert, sandra, glamgal);
    println!("Finished creating users!");

    println!("Starting to create posts...");
    create_post_in_db(
        &pool,
        CreatePostFields {
            author_id: albert.id,
            title: "First Post".to_string(),
            content: "This is my first post. I hope I love writing blogs as much as I love writing them.".to_string(),
            tags: vec!["#happy".to_string(), "#youcandoanything".to_string()],
        },
    )
    .await?;
    create_post_in_db(
        &pool,
        CreatePostFields {
            author_id: sandra.id,
            title: "Random".to_string(),
            content: "This is just some random text.".to_string(),
            tags: vec!["#random".to_string(), "#bluefish".to_string()],
        },
    )
    .await?;
    create_post_in_db(
        &pool,
        CreatePostFields {
            author_id: glamgal.id,
            title: "Three".to_string(),
            content: "Third times the charm.".to_string(),
            tags: vec![
                "#three".to_string(),
                "#charmed".to_string(),
                "#whatever".to_string(),
            ],
        },
    )
    .await?;
    println!("Finished creating posts!");

    pool.close().await;
    Ok(())
}

async fn seed_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    name: &str,
    location: &str,
) -> microblog::Result<User> {
    let user = insert_user(
        pool,
        &RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            location: location.to_string(),
        },
    )
    .await?;
    user.with_context(|| format!("User {} already exists", username))
}
