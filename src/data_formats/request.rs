use serde::{Deserialize, Serialize};

// ----------------- User Requests -----------------

// Both fields optional so an incomplete body surfaces as
// MissingCredentialsError instead of a deserialization rejection.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub location: String,
}

// ----------------- Post Requests -----------------

#[derive(Deserialize, Serialize, Debug)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    /// Space-separated tag names, e.g. `"#happy #writing"`.
    #[serde(default)]
    pub tags: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
}
