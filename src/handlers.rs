use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::{
    authentication::{get_jwt_token, MaybeUser, REGISTRATION_TOKEN_EXPIRY},
    data_formats::{
        CreatePostRequest, LoginRequest, PostWrapper, PostsWrapper, RegisterRequest, TagsWrapper,
        TokenResponse, UpdatePostRequest, UsersWrapper,
    },
    db_helpers::{
        create_post_in_db, get_all_posts, get_all_users, get_post_by_id, get_posts_by_tag_name,
        get_tags_in_db, get_user_by_username, insert_user, update_post_in_db, CreatePostFields,
        UpdatePostFields,
    },
    errors::RequestError,
    models::Post,
};

type JsonResult<T> = Result<Json<T>, RequestError>;

/// A post is readable when it is active or when the requester authored it.
fn visible_to(post: &Post, viewer_id: Option<i64>) -> bool {
    post.active || viewer_id == Some(post.author.id)
}

fn parse_tag_list(tags: &str) -> Vec<String> {
    tags.split_whitespace().map(|tag| tag.to_string()).collect()
}

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

// ----------------- User Handlers -----------------
pub async fn get_users(Extension(pool): Extension<Arc<SqlitePool>>) -> JsonResult<UsersWrapper> {
    let users = get_all_users(&pool).await?;
    Ok(Json(UsersWrapper { users }))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LoginRequest>,
) -> JsonResult<TokenResponse> {
    let (username, password) = match (request.username, request.password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            (username, password)
        }
        _ => return Err(RequestError::MissingCredentials),
    };

    let user = get_user_by_username(&pool, &username).await?;
    // Stored passwords are compared as plain text, faithful to the stored
    // format; see DESIGN.md.
    let user = match user {
        Some(user) if user.password == password => user,
        _ => return Err(RequestError::IncorrectCredentials),
    };

    let token =
        get_jwt_token(user.id, &user.username, None).map_err(|_| RequestError::ServerError)?;
    Ok(Json(TokenResponse::new("you're logged in!", token)))
}

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<RegisterRequest>,
) -> JsonResult<TokenResponse> {
    if get_user_by_username(&pool, &request.username)
        .await?
        .is_some()
    {
        return Err(RequestError::UserExists);
    }

    // The insert reports a lost race on the unique username as "no row".
    let user = match insert_user(&pool, &request).await? {
        Some(user) => user,
        None => return Err(RequestError::UserExists),
    };

    let token = get_jwt_token(user.id, &user.username, Some(REGISTRATION_TOKEN_EXPIRY))
        .map_err(|_| RequestError::ServerError)?;
    Ok(Json(TokenResponse::new("thank you for signing up", token)))
}

// ----------------- Post Handlers -----------------
pub async fn list_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<PostsWrapper> {
    let posts = get_all_posts(&pool).await?;
    let posts = posts
        .into_iter()
        .filter(|post| visible_to(post, maybe_user.get_id()))
        .collect();
    Ok(Json(PostsWrapper { posts }))
}

pub async fn create_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Json(request): Json<CreatePostRequest>,
) -> JsonResult<PostWrapper> {
    let user = maybe_user.require()?;

    let tags = parse_tag_list(request.tags.as_deref().unwrap_or(""));
    let post = create_post_in_db(
        &pool,
        CreatePostFields {
            author_id: user.id,
            title: request.title,
            content: request.content,
            tags,
        },
    )
    .await?;

    let post = post.ok_or(RequestError::CreatePost)?;
    Ok(Json(PostWrapper { post }))
}

pub async fn update_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(post_id): Path<i64>,
    Json(request): Json<UpdatePostRequest>,
) -> JsonResult<PostWrapper> {
    let user = maybe_user.require()?;

    let original = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::PostNotFound)?;
    if original.author.id != user.id {
        return Err(RequestError::UnauthorizedUser(
            "You cannot update a post that is not yours",
        ));
    }

    // An absent or empty tags string means "leave the tag set alone"; a
    // non-empty string replaces it, even when it parses to zero names.
    let tags = match request.tags {
        Some(tags) if !tags.is_empty() => Some(parse_tag_list(&tags)),
        _ => None,
    };

    let post = update_post_in_db(
        &pool,
        post_id,
        UpdatePostFields {
            title: request.title,
            content: request.content,
            active: None,
            tags,
        },
    )
    .await?
    .ok_or(RequestError::PostNotFound)?;
    Ok(Json(PostWrapper { post }))
}

pub async fn delete_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(post_id): Path<i64>,
) -> JsonResult<PostWrapper> {
    let user = maybe_user.require()?;

    let post = get_post_by_id(&pool, post_id)
        .await?
        .ok_or(RequestError::PostNotFound)?;
    if post.author.id != user.id {
        return Err(RequestError::UnauthorizedUser(
            "You cannot delete a post which is not yours",
        ));
    }

    let post = update_post_in_db(
        &pool,
        post.id,
        UpdatePostFields {
            active: Some(false),
            ..Default::default()
        },
    )
    .await?
    .ok_or(RequestError::PostNotFound)?;
    Ok(Json(PostWrapper { post }))
}

// ----------------- Tag Handlers -----------------
pub async fn list_tags(Extension(pool): Extension<Arc<SqlitePool>>) -> JsonResult<TagsWrapper> {
    let tags = get_tags_in_db(&pool).await?;
    Ok(Json(TagsWrapper { tags }))
}

pub async fn get_posts_by_tag(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(tag_name): Path<String>,
) -> JsonResult<PostsWrapper> {
    let posts = get_posts_by_tag_name(&pool, &tag_name).await?;
    let posts: Vec<Post> = posts
        .into_iter()
        .filter(|post| visible_to(post, maybe_user.get_id()))
        .collect();

    if posts.is_empty() {
        return Err(RequestError::NoPosts);
    }
    Ok(Json(PostsWrapper { posts }))
}
