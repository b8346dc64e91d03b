//! # 문서(Document) 라우트 핸들러
//!
//! 문서의 생성과 조회를 처리하는 HTTP 핸들러 함수들입니다.
//! 문서 내용은 버전 단위로 관리되므로 `versions` 모듈을 보세요.
//!
//! ## 엔드포인트
//! - `GET  /api/v1/documents`       → 문서 목록 조회 (`?deal_id=`로 딜별 필터)
//! - `POST /api/v1/documents`       → 새 문서 생성
//! - `GET  /api/v1/documents/{id}`  → 단일 문서 조회
//!
//! ## Axum 핸들러 패턴
//! Axum 핸들러는 **Extractor(추출기)**를 매개변수로 받습니다:
//! - `State(state)`: 앱 전역 상태 (DB 풀, 요약기 등)
//! - `Path(id)`: URL 경로 파라미터
//! - `Query(q)`: URL 쿼리 파라미터
//! - `Json(body)`: 요청 본문을 JSON으로 파싱하여 구조체로 변환
//!
//! 반환 타입이 `Result<T, AppError>`이면 `Err`는 에러 JSON 응답으로 자동 변환됩니다.

use crate::{
    db,
    error::AppError,
    models::*,
    services::ChangeSummarizer,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::time::Duration;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// Axum의 State Extractor가 내부적으로 clone하므로 `Clone`이 필수입니다.
/// SqlitePool과 ChangeSummarizer는 내부에서 Arc를 쓰므로 clone 비용이 작습니다.
/// (Duration은 Copy 타입입니다.)
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// 업로드 파일 저장 디렉토리 경로
    pub uploads_path: String,
    /// LLM 변경 요약기 (인증키가 없으면 데모 모드)
    pub summarizer: ChangeSummarizer,
    /// 단어 단위 diff 계산 제한 시간
    pub diff_timeout: Duration,
}

/// `GET /documents` — 문서 목록을 조회합니다.
///
/// # 반환값
/// `{ "documents": [...] }` 형태의 JSON
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Value>, AppError> {
    // .as_deref(): Option<String> → Option<&str>
    let documents = db::list_documents(&state.pool, query.deal_id.as_deref()).await?;
    Ok(Json(json!({ "documents": documents })))
}

/// `GET /documents/{id}` — 단일 문서를 조회합니다.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let document = db::get_document(&state.pool, &id)
        .await?
        // 문서를 찾지 못하면 404 NotFound 응답이 됩니다.
        .ok_or(AppError::NotFound)?;
    Ok(Json(document))
}

/// `POST /documents` — 새 문서를 생성합니다.
///
/// 문서는 내용 없이 만들어지고, 첫 버전은 `POST /documents/{id}/versions`로 올립니다.
pub async fn create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<Json<Document>, AppError> {
    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled");

    // slug::slugify(): 제목을 URL 친화적인 문자열로 변환
    let slug = slug::slugify(title);

    let document = db::create_document(&state.pool, title, req.deal_id.as_deref(), &slug).await?;
    tracing::info!(document_id = %document.id, "Created document");
    Ok(Json(document))
}
