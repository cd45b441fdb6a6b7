use sqlx::SqlitePool;

mod post_helpers;
mod tag_helpers;
mod user_helpers;

pub use post_helpers::*;
pub use tag_helpers::*;
pub use user_helpers::*;

/// Collects the supplied columns of a partial update into a
/// `col = ?, col = ?` clause plus its bind parameters. `build` returns
/// `None` when no column was supplied, which callers treat as a no-op.
struct QueryBuilder {
    query: String,
    params: Vec<String>,
}

impl QueryBuilder {
    fn new(initial: &str) -> Self {
        Self {
            query: initial.to_string(),
            params: Vec::new(),
        }
    }

    fn set(mut self, column: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            if !self.params.is_empty() {
                self.query.push_str(", ");
            }
            self.query.push_str(column);
            self.query.push_str(" = ?");
            self.params.push(value);
        }
        self
    }

    fn build(mut self, suffix: &str) -> Option<(String, Vec<String>)> {
        if self.params.is_empty() {
            return None;
        }
        self.query.push_str(suffix);
        Some((self.query, self.params))
    }
}

// Formats trusted integer ids as a parenthesized SQL list. Never used with
// caller-supplied strings.
fn id_list(ids: &[i64]) -> String {
    let ids = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<String>>()
        .join(", ");
    format!("({})", ids)
}

// ----------------- Schema Setup -----------------

// The schema is managed by drop/recreate (see bin/seed.rs and the test
// harness), so these run one statement at a time in dependency order.

pub async fn drop_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS post_tags")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS tags").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS posts")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS users")
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn create_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            name TEXT NOT NULL,
            location TEXT NOT NULL,
            active BOOLEAN DEFAULT TRUE
        )
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        r#"
        CREATE TABLE posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER NOT NULL REFERENCES users (id),
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            active BOOLEAN DEFAULT TRUE
        )
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        r#"
        CREATE TABLE tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        r#"
        CREATE TABLE post_tags (
            post_id INTEGER NOT NULL REFERENCES posts (id),
            tag_id INTEGER NOT NULL REFERENCES tags (id),
            UNIQUE (post_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{id_list, QueryBuilder};

    #[test]
    fn query_builder_collects_supplied_columns() {
        let (query, params) = QueryBuilder::new("UPDATE posts SET ")
            .set("title", Some("New title".to_string()))
            .set("content", None)
            .set("active", Some("0".to_string()))
            .build(" WHERE id = ?")
            .unwrap();
        assert_eq!(query, "UPDATE posts SET title = ?, active = ? WHERE id = ?");
        assert_eq!(params, vec!["New title".to_string(), "0".to_string()]);
    }

    #[test]
    fn query_builder_with_no_columns_is_a_noop() {
        let built = QueryBuilder::new("UPDATE posts SET ")
            .set("title", None)
            .build(" WHERE id = ?");
        assert!(built.is_none());
    }

    #[test]
    fn id_list_formats_parenthesized_ids() {
        assert_eq!(id_list(&[7]), "(7)");
        assert_eq!(id_list(&[1, 2, 3]), "(1, 2, 3)");
    }
}
