//! # 사용자 쿼리 모듈
//!
//! 인증은 다루지 않습니다. 사용자는 버전 업로더의 표시 이름을 해석하는 데만 쓰입니다.

use crate::models::{CreateUserRequest, User};
use sqlx::SqlitePool;

pub async fn create_user(pool: &SqlitePool, req: &CreateUserRequest) -> Result<User, sqlx::Error> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO users (id, display_name, email) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(req.display_name.trim())
        .bind(&req.email)
        .execute(pool)
        .await?;

    get_user(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, display_name, email, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, display_name, email, created_at FROM users ORDER BY display_name",
    )
    .fetch_all(pool)
    .await
}
