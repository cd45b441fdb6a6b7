use serde::{Deserialize, Serialize};

use crate::models::{Post, Tag, User};

#[derive(Debug, Deserialize, Serialize)]
pub struct UsersWrapper {
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostsWrapper {
    pub posts: Vec<Post>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostWrapper {
    pub post: Post,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TagsWrapper {
    pub tags: Vec<Tag>,
}
