//! # 사용자 라우트 핸들러
//!
//! - `GET  /api/v1/users` → 사용자 목록
//! - `POST /api/v1/users` → 사용자 생성 (업로더 표시 이름 등록)

use crate::{db, error::AppError, models::*, routes::documents::AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let users = db::list_users(&state.pool).await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    if req.display_name.trim().is_empty() {
        return Err(AppError::BadRequest("display_name cannot be empty".to_string()));
    }
    let user = db::create_user(&state.pool, &req).await?;
    Ok(Json(user))
}
