use sqlx::PgPool;

use crate::database::models::user::User;
use crate::error::AppError;
use crate::pagination::CursorKey;

#[derive(Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Global lookup used by login; every other operation is tenant-scoped
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, tenant_id, role_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.tenant_id)
        .bind(user.role_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch one page of users in `(email, id)` order, strictly after the
    /// cursor. Overfetches one row so the caller can tell whether more remain.
    pub async fn list_page(
        &self,
        tenant_id: &str,
        after: Option<&CursorKey>,
        limit: i64,
    ) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users
             WHERE tenant_id = $1
               AND ($2::text IS NULL OR (email, id) > ($2::text, $3::uuid))
             ORDER BY email ASC, id ASC
             LIMIT $4",
        )
        .bind(tenant_id)
        .bind(after.map(|c| c.email.clone()))
        .bind(after.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
