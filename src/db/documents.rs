//! # 문서 데이터베이스 쿼리 모듈
//!
//! `documents` 테이블에 대한 생성/조회 쿼리 함수들이 정의되어 있습니다.
//! 문서 내용은 이 테이블이 아니라 `document_versions`에 버전별로 저장됩니다.
//!
//! 모든 함수는 `async`이며 `SqlitePool`을 받아 데이터베이스와 상호작용합니다.

use crate::error::AppError;
use crate::models::*;
// &SqlitePool로 받으면 소유권을 가져가지 않고 빌려서(borrow) 사용합니다.
use sqlx::SqlitePool;

/// 문서 목록을 조회합니다.
///
/// `deal_id`가 주어지면 해당 딜의 문서만, 없으면 전체 문서를 반환합니다.
/// 최근 수정된 문서가 먼저 옵니다.
pub async fn list_documents(
    pool: &SqlitePool,
    deal_id: Option<&str>,
) -> Result<Vec<Document>, AppError> {
    // r#"..."#: Raw 문자열 리터럴. SQL을 이스케이프 없이 그대로 쓸 수 있습니다.
    let docs = if let Some(deal_id) = deal_id {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, deal_id, title, slug, created_at, updated_at
            FROM documents
            WHERE deal_id = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(deal_id)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, deal_id, title, slug, created_at, updated_at
            FROM documents
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?
    };

    Ok(docs)
}

/// ID로 단일 문서를 조회합니다.
///
/// # 반환값
/// - `Ok(Some(Document))`: 문서를 찾은 경우
/// - `Ok(None)`: 해당 ID의 문서가 없는 경우
/// - `Err(AppError)`: DB 에러 발생 시
pub async fn get_document(pool: &SqlitePool, id: &str) -> Result<Option<Document>, AppError> {
    let doc = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, deal_id, title, slug, created_at, updated_at
        FROM documents
        WHERE id = ?
        "#,
    )
    // .bind(id): SQL의 ? 자리에 값을 안전하게 바인딩합니다 (SQL 인젝션 방지).
    .bind(id)
    // .fetch_optional(): 결과가 0행이면 None, 1행이면 Some(Document)
    .fetch_optional(pool)
    .await?;

    Ok(doc)
}

/// 새 문서를 생성하고, 생성된 문서를 다시 조회하여 반환합니다.
pub async fn create_document(
    pool: &SqlitePool,
    title: &str,
    deal_id: Option<&str>,
    slug: &str,
) -> Result<Document, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO documents (id, deal_id, title, slug)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(deal_id)
    .bind(title)
    .bind(slug)
    .execute(pool)
    .await?;

    get_document(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created document".to_string()))
}
