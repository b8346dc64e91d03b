//! # 버전 비교 라우트 핸들러
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/documents/{id}/compare?v1=1&v2=2 | 비교 결과 JSON |
//! | GET | /api/v1/documents/{id}/compare/view?v1=1&v2=2&tab=original | 비교 화면 HTML |
//! | POST | /api/v1/compare | 저장되지 않은 두 텍스트를 바로 비교 |
//!
//! `v2`를 생략하면 최신 버전, `v1`을 생략하면 `v2`의 직전 버전입니다.
//!
//! 클라이언트가 연결을 끊으면 Axum이 핸들러 future를 drop하므로,
//! 진행 중인 LLM 요청도 함께 취소됩니다.

use crate::{
    db,
    error::AppError,
    models::*,
    routes::documents::AppState,
    services::{
        self,
        view::{ComparisonTab, ComparisonView},
        Comparison, ContentKind,
    },
};
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};

/// 문서 존재 확인 → 버전 번호 확정 → 두 버전 조회 → 비교
async fn load_comparison(
    state: &AppState,
    document_id: &str,
    query: &CompareQuery,
) -> Result<Comparison, AppError> {
    db::get_document(&state.pool, document_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let latest = db::latest_version_number(&state.pool, document_id).await?;
    let (v1, v2) = services::resolve_version_pair(query.v1, query.v2, latest)?;

    let original = db::get_version(&state.pool, document_id, v1)
        .await?
        .ok_or(AppError::NotFound)?;
    let updated = db::get_version(&state.pool, document_id, v2)
        .await?
        .ok_or(AppError::NotFound)?;

    services::compare(&state.summarizer, state.diff_timeout, original, updated).await
}

/// `GET /documents/{id}/compare` — 비교 결과(ComparisonResult)를 JSON으로 반환합니다.
///
/// `ai_summary`는 LLM 호출이 실패해도 항상 세 필드를 모두 갖습니다.
pub async fn compare_document_versions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ComparisonResult>, AppError> {
    let comparison = load_comparison(&state, &id, &query).await?;
    Ok(Json(comparison.into_result()))
}

/// `GET /documents/{id}/compare/view` — 세 탭 비교 화면을 HTML로 렌더링합니다.
pub async fn comparison_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CompareQuery>,
) -> Result<Html<String>, AppError> {
    let tab = match query.tab.as_deref() {
        None => ComparisonTab::default(),
        Some(name) => ComparisonTab::parse(name)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown tab: {name}")))?,
    };

    let comparison = load_comparison(&state, &id, &query).await?;
    let mut view = ComparisonView::new(comparison.into_view_input());
    view.select(tab);

    Ok(Html(view.render_page(&format!("/documents/{id}"))))
}

#[derive(Debug, Deserialize)]
pub struct CompareTextsRequest {
    pub original: String,
    pub updated: String,
}

#[derive(Debug, Serialize)]
pub struct CompareTextsResponse {
    pub diff_html: String,
    pub original_html: String,
    pub new_html: String,
    pub ai_summary: AiSummary,
}

/// `POST /compare` — 업로드 전 미리보기 등, 저장되지 않은 두 텍스트를 비교합니다.
///
/// 저장된 형식 정보가 없으므로 이 경계에서 내용 형식을 판별합니다.
pub async fn compare_texts(
    State(state): State<AppState>,
    Json(req): Json<CompareTextsRequest>,
) -> Result<Json<CompareTextsResponse>, AppError> {
    let original = ContentKind::detect(req.original);
    let updated = ContentKind::detect(req.updated);

    let (diff_html, ai_summary) =
        services::diff_and_summarize(&state.summarizer, state.diff_timeout, &original, &updated)
            .await?;

    Ok(Json(CompareTextsResponse {
        diff_html,
        original_html: original.to_html(),
        new_html: updated.to_html(),
        ai_summary,
    }))
}
