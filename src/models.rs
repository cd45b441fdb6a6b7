use serde::{Deserialize, Serialize};

/// Public projection of a user row. The password column is never selected
/// into this type.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

// Full row including the stored password. Credential checks only; no
// Serialize impl so the password cannot reach a response body.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

/// A user together with every post they own, as attached to authenticated
/// requests and returned by id lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub location: String,
    pub active: bool,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub active: bool,
}

/// A post hydrated with its tag list and a minimal author projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub active: bool,
    pub tags: Vec<Tag>,
    pub author: Author,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
