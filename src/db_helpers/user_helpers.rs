use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::RegisterRequest,
    errors::RequestError,
    models::{User, UserProfile, UserRecord},
};

use super::{get_posts_by_author, QueryBuilder};

/// Partial update of a user row; `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UpdateUserFields {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub active: Option<bool>,
}

pub async fn get_all_users(pool: &SqlitePool) -> Result<Vec<User>, RequestError> {
    let users = sqlx::query_as::<Sqlite, User>(
        "SELECT id, username, name, location, active FROM users",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

// Credential checks only: the returned record carries the stored password.
pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserRecord>, RequestError> {
    let user = sqlx::query_as::<Sqlite, UserRecord>(
        "SELECT id, username, password, name, location, active FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn get_user_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<UserProfile>, RequestError> {
    let user = sqlx::query_as::<Sqlite, User>(
        "SELECT id, username, name, location, active FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    let user = match user {
        Some(user) => user,
        None => return Ok(None),
    };

    let posts = get_posts_by_author(pool, user.id).await?;

    Ok(Some(UserProfile {
        id: user.id,
        username: user.username,
        name: user.name,
        location: user.location,
        active: user.active,
        posts,
    }))
}

// A username conflict yields no row rather than an error; callers treat
// `None` as "already taken".
pub async fn insert_user(
    pool: &SqlitePool,
    user: &RegisterRequest,
) -> Result<Option<User>, RequestError> {
    let user = sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (username, password, name, location)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (username) DO NOTHING
        RETURNING id, username, name, location, active
        "#,
    )
    .bind(user.username.as_str())
    .bind(user.password.as_str())
    .bind(user.name.as_str())
    .bind(user.location.as_str())
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn update_user_in_db(
    pool: &SqlitePool,
    id: i64,
    fields: UpdateUserFields,
) -> Result<Option<User>, RequestError> {
    let built = QueryBuilder::new("UPDATE users SET ")
        .set("username", fields.username)
        .set("password", fields.password)
        .set("name", fields.name)
        .set("location", fields.location)
        .set("active", fields.active.map(|active| (active as i64).to_string()))
        .build(" WHERE id = ? RETURNING id, username, name, location, active");

    let (query, params) = match built {
        Some(built) => built,
        None => return Ok(None),
    };

    let mut query = sqlx::query_as::<Sqlite, User>(&query);
    for param in params {
        query = query.bind(param);
    }
    let user = query.bind(id).fetch_optional(pool).await?;
    Ok(user)
}
