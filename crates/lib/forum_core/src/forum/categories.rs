//! Category queries.

use sqlx::PgPool;

use super::{ForumError, required};
use crate::models::forum::{Category, CategoryWithCount};

const WITH_COUNT: &str = "SELECT c.id, c.name, c.created_at, \
     (SELECT COUNT(*) FROM topics t WHERE t.category_id = c.id) AS topic_count \
     FROM categories c";

/// List categories alphabetically.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, ForumError> {
    let rows = sqlx::query_as::<_, Category>(
        "SELECT id, name, created_at FROM categories ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// List categories alphabetically with their topic counts.
pub async fn list_categories_with_counts(
    pool: &PgPool,
) -> Result<Vec<CategoryWithCount>, ForumError> {
    let rows = sqlx::query_as::<_, CategoryWithCount>(&format!("{WITH_COUNT} ORDER BY c.name ASC"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

async fn name_taken(pool: &PgPool, name: &str, except_id: Option<i64>) -> Result<bool, ForumError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM categories \
         WHERE name = $1 AND ($2::bigint IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(except_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

/// Create a category. Names are trimmed and must be unique.
pub async fn create_category(pool: &PgPool, name: &str) -> Result<CategoryWithCount, ForumError> {
    let name = required(name, "Category name")?;
    if name_taken(pool, &name, None).await? {
        return Err(ForumError::Validation("Category already exists".into()));
    }
    let row = sqlx::query_as::<_, CategoryWithCount>(
        "INSERT INTO categories (name) VALUES ($1) \
         RETURNING id, name, created_at, 0::bigint AS topic_count",
    )
    .bind(&name)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Rename a category. The new name must not belong to another category.
pub async fn rename_category(
    pool: &PgPool,
    id: i64,
    name: &str,
) -> Result<CategoryWithCount, ForumError> {
    let name = required(name, "Category name")?;
    if name_taken(pool, &name, Some(id)).await? {
        return Err(ForumError::Validation("Category name already in use".into()));
    }
    let updated = sqlx::query("UPDATE categories SET name = $2 WHERE id = $1")
        .bind(id)
        .bind(&name)
        .execute(pool)
        .await?
        .rows_affected();
    if updated == 0 {
        return Err(ForumError::NotFound(format!("category {id}")));
    }
    let row = sqlx::query_as::<_, CategoryWithCount>(&format!("{WITH_COUNT} WHERE c.id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Delete a category with all its topics and their replies.
pub async fn delete_category(pool: &PgPool, id: i64) -> Result<(), ForumError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM replies WHERE topic_id IN (SELECT id FROM topics WHERE category_id = $1)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM topics WHERE category_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(ForumError::NotFound(format!("category {id}")));
    }

    tx.commit().await?;
    Ok(())
}
