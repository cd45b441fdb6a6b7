use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::{Post, Tag}};

use super::get_post_by_id;

const POST_IDS_BY_TAG_QUERY: &str = r#"
    SELECT posts.id
    FROM posts
    JOIN post_tags ON posts.id = post_tags.post_id
    JOIN tags ON tags.id = post_tags.tag_id
    WHERE tags.name = ?
"#;

/// Get-or-create over a list of tag names. Pre-existing names resolve to
/// their existing rows; the returned order is unrelated to input order.
pub async fn create_tags(pool: &SqlitePool, names: &[String]) -> Result<Vec<Tag>, RequestError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let insert_values = names.iter().map(|_| "(?)").collect::<Vec<_>>().join(", ");
    let insert = format!(
        "INSERT INTO tags (name) VALUES {} ON CONFLICT (name) DO NOTHING",
        insert_values
    );
    let mut query = sqlx::query(&insert);
    for name in names {
        query = query.bind(name.as_str());
    }
    query.execute(pool).await?;

    let select_values = names.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
    let select = format!("SELECT id, name FROM tags WHERE name IN ({})", select_values);
    let mut query = sqlx::query_as::<Sqlite, Tag>(&select);
    for name in names {
        query = query.bind(name.as_str());
    }
    let tags = query.fetch_all(pool).await?;
    Ok(tags)
}

pub async fn get_tags_in_db(pool: &SqlitePool) -> Result<Vec<Tag>, RequestError> {
    let tags = sqlx::query_as::<Sqlite, Tag>("SELECT id, name FROM tags")
        .fetch_all(pool)
        .await?;
    Ok(tags)
}

pub async fn get_posts_by_tag_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Vec<Post>, RequestError> {
    let ids = sqlx::query_scalar::<Sqlite, i64>(POST_IDS_BY_TAG_QUERY)
        .bind(name)
        .fetch_all(pool)
        .await?;

    let mut posts = Vec::new();
    for id in ids {
        if let Some(post) = get_post_by_id(pool, id).await? {
            posts.push(post);
        }
    }
    Ok(posts)
}
