//! # 문서 버전 쿼리 모듈
//!
//! 버전은 한 번 만들어지면 바뀌지 않습니다. 이 모듈에는 생성과 조회만 있고
//! 수정/삭제 쿼리는 없습니다 (문서가 삭제될 때 CASCADE로만 함께 지워집니다).

use crate::models::{ContentFormat, DocumentVersion, DocumentVersionSummary};
use sqlx::SqlitePool;

// 업로더 이름은 users 테이블과 LEFT JOIN으로 해석합니다.
// 업로더가 없거나 삭제된 경우 uploaded_by_name은 NULL입니다.
const VERSION_COLUMNS: &str = r#"
    v.id, v.document_id, v.version_number, v.file_name, v.file_content,
    v.content_format, v.uploaded_by_id, u.display_name AS uploaded_by_name, v.created_at
"#;

const SUMMARY_COLUMNS: &str = r#"
    v.id, v.document_id, v.version_number, v.file_name,
    v.content_format, v.uploaded_by_id, u.display_name AS uploaded_by_name, v.created_at
"#;

/// 새 버전을 추가하고 저장된 행을 반환합니다.
///
/// 버전 번호는 `MAX(version_number) + 1`을 INSERT 문 안에서 계산하므로
/// 하나의 문장으로 원자적으로 처리됩니다. 그래도 번호가 겹치면
/// UNIQUE(document_id, version_number) 제약에 걸려 에러가 납니다.
pub async fn create_version(
    pool: &SqlitePool,
    document_id: &str,
    file_name: &str,
    file_content: &str,
    content_format: ContentFormat,
    uploaded_by_id: Option<&str>,
) -> Result<DocumentVersion, sqlx::Error> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO document_versions
            (id, document_id, version_number, file_name, file_content, content_format, uploaded_by_id)
        SELECT ?, ?, COALESCE(MAX(version_number), 0) + 1, ?, ?, ?, ?
        FROM document_versions
        WHERE document_id = ?
        "#,
    )
    .bind(&id)
    .bind(document_id)
    .bind(file_name)
    .bind(file_content)
    .bind(content_format)
    .bind(uploaded_by_id)
    .bind(document_id)
    .execute(pool)
    .await?;

    sqlx::query(
        "UPDATE documents SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?",
    )
    .bind(document_id)
    .execute(pool)
    .await?;

    get_version_by_id(pool, &id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn list_versions(
    pool: &SqlitePool,
    document_id: &str,
) -> Result<Vec<DocumentVersionSummary>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM document_versions v
        LEFT JOIN users u ON u.id = v.uploaded_by_id
        WHERE v.document_id = ?
        ORDER BY v.version_number DESC
        "#
    );
    sqlx::query_as::<_, DocumentVersionSummary>(&sql)
        .bind(document_id)
        .fetch_all(pool)
        .await
}

pub async fn get_version_by_id(
    pool: &SqlitePool,
    version_id: &str,
) -> Result<Option<DocumentVersion>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {VERSION_COLUMNS}
        FROM document_versions v
        LEFT JOIN users u ON u.id = v.uploaded_by_id
        WHERE v.id = ?
        "#
    );
    sqlx::query_as::<_, DocumentVersion>(&sql)
        .bind(version_id)
        .fetch_optional(pool)
        .await
}

/// 문서 ID와 버전 번호로 버전 하나를 조회합니다.
pub async fn get_version(
    pool: &SqlitePool,
    document_id: &str,
    version_number: i64,
) -> Result<Option<DocumentVersion>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {VERSION_COLUMNS}
        FROM document_versions v
        LEFT JOIN users u ON u.id = v.uploaded_by_id
        WHERE v.document_id = ? AND v.version_number = ?
        "#
    );
    sqlx::query_as::<_, DocumentVersion>(&sql)
        .bind(document_id)
        .bind(version_number)
        .fetch_optional(pool)
        .await
}

/// 문서의 최신 버전 번호. 버전이 하나도 없으면 None.
pub async fn latest_version_number(
    pool: &SqlitePool,
    document_id: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT MAX(version_number) FROM document_versions WHERE document_id = ?")
        .bind(document_id)
        .fetch_one(pool)
        .await
}
