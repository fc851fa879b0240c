use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{PublicUser, User, UserRole, UserStatus};

/// The keyword is a literal substring; `%`, `_` and `\` in it must not act
/// as ILIKE wildcards.
fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl User {
    /// Find a user by email, case-insensitively.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, status, created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Advisory duplicate check before insert; the unique indexes are the
    /// real guard against concurrent registrations.
    pub async fn username_or_email_taken(
        db: &PgPool,
        username: &str,
        email: &str,
    ) -> sqlx::Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT 1
            FROM users
            WHERE username = $1 OR lower(email) = lower($2)
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(row.is_some())
    }

    /// Insert a new user with the given role; status starts as `active`.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, status)
            VALUES ($1, $2, $3, $4, 'active')
            RETURNING id, username, email, password_hash, role, status, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl PublicUser {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<PublicUser>> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, username, email, role, status, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// One page of the directory, newest first. No keyword matches
    /// everything.
    pub async fn search(
        db: &PgPool,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<PublicUser>> {
        match keyword {
            Some(kw) => {
                sqlx::query_as::<_, PublicUser>(
                    r#"
                    SELECT id, username, email, role, status, created_at, updated_at
                    FROM users
                    WHERE username ILIKE '%' || $1 || '%' OR email ILIKE '%' || $1 || '%'
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(escape_like(kw))
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await
            }
            None => {
                sqlx::query_as::<_, PublicUser>(
                    r#"
                    SELECT id, username, email, role, status, created_at, updated_at
                    FROM users
                    ORDER BY created_at DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(db)
                .await
            }
        }
    }

    /// Full match count for the same filter as `search`, independent of the
    /// requested page.
    pub async fn count(db: &PgPool, keyword: Option<&str>) -> sqlx::Result<i64> {
        let (total,): (i64,) = match keyword {
            Some(kw) => {
                sqlx::query_as(
                    r#"
                    SELECT COUNT(*)
                    FROM users
                    WHERE username ILIKE '%' || $1 || '%' OR email ILIKE '%' || $1 || '%'
                    "#,
                )
                .bind(escape_like(kw))
                .fetch_one(db)
                .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM users")
                    .fetch_one(db)
                    .await?
            }
        };
        Ok(total)
    }

    /// Persist a new status and advance `updated_at`. Returns `None` when the
    /// id does not resolve.
    pub async fn update_status(
        db: &PgPool,
        id: Uuid,
        status: UserStatus,
    ) -> sqlx::Result<Option<PublicUser>> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            UPDATE users
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, username, email, role, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("%"), "\\%");
        assert_eq!(escape_like("a_c"), "a\\_c");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("ali"), "ali");
    }
}
