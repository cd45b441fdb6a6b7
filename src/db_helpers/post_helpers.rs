use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Author, Post, PostRow, Tag},
};

use super::{create_tags, id_list, QueryBuilder};

const POST_QUERY: &str = "SELECT id, author_id, title, content, active FROM posts WHERE id = ?";

const POST_TAGS_QUERY: &str = r#"
    SELECT tags.id, tags.name
    FROM tags
    JOIN post_tags ON tags.id = post_tags.tag_id
    WHERE post_tags.post_id = ?
"#;

const POST_AUTHOR_QUERY: &str = "SELECT id, username, name, location FROM users WHERE id = ?";

pub struct CreatePostFields {
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Partial update of a post. `tags: Some(_)` replaces the whole tag set,
/// `tags: None` leaves it alone.
#[derive(Debug, Default)]
pub struct UpdatePostFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

pub async fn get_post_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Post>, RequestError> {
    let row = sqlx::query_as::<Sqlite, PostRow>(POST_QUERY)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let tags = sqlx::query_as::<Sqlite, Tag>(POST_TAGS_QUERY)
        .bind(row.id)
        .fetch_all(pool)
        .await?;

    let author = sqlx::query_as::<Sqlite, Author>(POST_AUTHOR_QUERY)
        .bind(row.author_id)
        .fetch_one(pool)
        .await?;

    Ok(Some(Post {
        id: row.id,
        title: row.title,
        content: row.content,
        active: row.active,
        tags,
        author,
    }))
}

// Hydrates every post individually; fine at this scale.
pub async fn get_all_posts(pool: &SqlitePool) -> Result<Vec<Post>, RequestError> {
    let ids = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM posts")
        .fetch_all(pool)
        .await?;
    hydrate_posts(pool, ids).await
}

pub async fn get_posts_by_author(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let ids = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM posts WHERE author_id = ?")
        .bind(author_id)
        .fetch_all(pool)
        .await?;
    hydrate_posts(pool, ids).await
}

async fn hydrate_posts(pool: &SqlitePool, ids: Vec<i64>) -> Result<Vec<Post>, RequestError> {
    let mut posts = Vec::new();
    for id in ids {
        if let Some(post) = get_post_by_id(pool, id).await? {
            posts.push(post);
        }
    }
    Ok(posts)
}

/// Links every tag to the post, tolerating pairs that already exist, and
/// returns the rehydrated post.
pub async fn add_tags_to_post(
    pool: &SqlitePool,
    post_id: i64,
    tags: &[Tag],
) -> Result<Option<Post>, RequestError> {
    for tag in tags {
        sqlx::query(
            r#"
            INSERT INTO post_tags (post_id, tag_id)
            VALUES (?, ?)
            ON CONFLICT (post_id, tag_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(tag.id)
        .execute(pool)
        .await?;
    }
    get_post_by_id(pool, post_id).await
}

pub async fn create_post_in_db(
    pool: &SqlitePool,
    CreatePostFields {
        author_id,
        title,
        content,
        tags,
    }: CreatePostFields,
) -> Result<Option<Post>, RequestError> {
    let row = sqlx::query_as::<Sqlite, PostRow>(
        r#"
        INSERT INTO posts (author_id, title, content)
        VALUES (?, ?, ?)
        RETURNING id, author_id, title, content, active
        "#,
    )
    .bind(author_id)
    .bind(title)
    .bind(content)
    .fetch_one(pool)
    .await?;

    let tag_list = create_tags(pool, &tags).await?;
    add_tags_to_post(pool, row.id, &tag_list).await
}

pub async fn update_post_in_db(
    pool: &SqlitePool,
    post_id: i64,
    UpdatePostFields {
        title,
        content,
        active,
        tags,
    }: UpdatePostFields,
) -> Result<Option<Post>, RequestError> {
    let built = QueryBuilder::new("UPDATE posts SET ")
        .set("title", title)
        .set("content", content)
        .set("active", active.map(|active| (active as i64).to_string()))
        .build(" WHERE id = ?");
    if let Some((query, params)) = built {
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.bind(post_id).execute(pool).await?;
    }

    let tags = match tags {
        Some(tags) => tags,
        None => return get_post_by_id(pool, post_id).await,
    };

    // The post's tag set becomes exactly the supplied list: drop every
    // association outside the resolved set, then attach the set idempotently.
    let tag_list = create_tags(pool, &tags).await?;
    if tag_list.is_empty() {
        // NOT IN over zero ids is not valid SQL; detach everything directly.
        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(pool)
            .await?;
    } else {
        let tag_ids = tag_list.iter().map(|tag| tag.id).collect::<Vec<i64>>();
        let query = format!(
            "DELETE FROM post_tags WHERE post_id = ? AND tag_id NOT IN {}",
            id_list(&tag_ids)
        );
        sqlx::query(&query).bind(post_id).execute(pool).await?;
    }

    add_tags_to_post(pool, post_id, &tag_list).await
}
