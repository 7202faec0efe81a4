// User management under the caller's tenant. The tenant id always comes from
// the request gate, never from the payload.
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::password;
use crate::database::models::user::User;
use crate::error::AppError;
use crate::extract::{Json, Query};
use crate::middleware::tenant::TenantId;
use crate::pagination::{self, CursorKey, Page};

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role_id: user.role_id,
            created_at: user.created_at,
        }
    }
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserView>), AppError> {
    if body.email.trim().is_empty() || !body.email.contains('@') {
        return Err(AppError::invalid("a valid email is required"));
    }
    if body.name.trim().is_empty() {
        return Err(AppError::invalid("name must not be empty"));
    }
    if body.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::invalid(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let plain = body.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| AppError::wrap(crate::error::ErrorKind::Internal, "hashing task failed", e))??;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: body.email.trim().to_string(),
        name: body.name.trim().to_string(),
        password_hash,
        tenant_id: Some(tenant.0),
        role_id: body.role_id,
        created_at: now,
        updated_at: now,
    };

    // duplicate email maps to conflict via the sqlx conversion
    state.users.insert(&user).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

/// GET /api/v1/users?limit=<n>&cursor=<opaque>
pub async fn list(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<UserView>>, AppError> {
    let limit = pagination::clamp_limit(query.limit);
    let after = query
        .cursor
        .as_deref()
        .map(pagination::decode_cursor)
        .transpose()?;

    let rows = state
        .users
        .list_page(&tenant.0, after.as_ref(), limit + 1)
        .await?;

    let page = pagination::assemble(rows, limit as usize, |user: &User| CursorKey {
        email: user.email.clone(),
        id: user.id,
    });

    Ok(Json(Page {
        items: page.items.into_iter().map(UserView::from).collect(),
        has_more: page.has_more,
        next_cursor: page.next_cursor,
    }))
}
