//! # 문서 버전 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/documents/{id}/versions | 버전 목록 (내용 제외, 최신순) |
//! | POST | /api/v1/documents/{id}/versions | 새 버전 업로드 |
//! | GET | /api/v1/documents/{id}/versions/{version} | 버전 하나 (내용 포함) |
//!
//! 버전은 불변입니다. 수정하려면 새 버전을 올립니다.

use crate::{
    db,
    error::AppError,
    models::*,
    routes::documents::AppState,
    services::{self, ContentKind},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

pub async fn list_document_versions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    db::get_document(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let versions = db::list_versions(&state.pool, &id).await?;
    Ok(Json(json!({ "versions": versions })))
}

pub async fn get_document_version(
    State(state): State<AppState>,
    Path((id, version_number)): Path<(String, i64)>,
) -> Result<Json<DocumentVersion>, AppError> {
    let version = db::get_version(&state.pool, &id, version_number)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(version))
}

/// `POST /documents/{id}/versions` — 새 버전을 업로드합니다.
///
/// 내용 형식(HTML/평문)은 여기서 한 번만 판별해 저장합니다.
/// 업로드 파일 사본은 DB 저장이 끝난 뒤 업로드 디렉토리에 씁니다.
/// 사본 저장 실패는 로그만 남깁니다.
pub async fn create_document_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CreateVersionRequest>,
) -> Result<(StatusCode, Json<DocumentVersion>), AppError> {
    db::get_document(&state.pool, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let file_name = req.file_name.trim();
    if file_name.is_empty() {
        return Err(AppError::BadRequest("file_name cannot be empty".to_string()));
    }

    if let Some(user_id) = &req.uploaded_by_id {
        db::get_user(&state.pool, user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown uploader: {user_id}")))?;
    }

    // 형식 판별은 업로드 시점에 한 번만 합니다. 이후에는 저장된 형식을 씁니다.
    let content = ContentKind::detect(req.file_content);
    let version = db::create_version(
        &state.pool,
        &id,
        file_name,
        content.as_str(),
        content.format(),
        req.uploaded_by_id.as_deref(),
    )
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "Another version was uploaded at the same time, please retry"))?;

    // 여기부터 버전은 이미 저장된 상태입니다. DB가 기준 데이터이므로
    // 디스크 사본 저장에 실패해도 요청은 성공으로 응답합니다 (재시도하면 버전이 중복됨).
    if let Err(e) = services::store_upload(
        &state.uploads_path,
        &id,
        version.version_number,
        &version.file_name,
        &version.file_content,
    )
    .await
    {
        tracing::error!(
            document_id = %id,
            version = version.version_number,
            "Failed to store upload copy: {}",
            e
        );
    }

    tracing::info!(
        document_id = %id,
        version = version.version_number,
        format = ?version.content_format,
        "Created document version"
    );
    Ok((StatusCode::CREATED, Json(version)))
}
