//! # 버전 비교 서비스
//!
//! 두 버전으로 비교 결과를 만듭니다. diff 렌더링과 AI 변경 요약은 서로 독립적이므로
//! 동시에 실행합니다:
//!
//! ```text
//! DocumentVersion ×2 ─┬─ render_diff_html (blocking 스레드) ─┐
//!                     └─ ChangeSummarizer::summarize (async) ─┴─ Comparison
//! ```
//!
//! 요청 간에 공유하는 가변 상태는 없으며, 결과는 저장하지 않고 요청마다 새로 계산합니다.

use super::diff::render_diff_html;
use super::normalize::ContentKind;
use super::summarizer::ChangeSummarizer;
use super::view::ComparisonViewInput;
use crate::error::AppError;
use crate::models::{AiSummary, ComparisonResult, DocumentVersion, DocumentVersionSummary};
use std::time::Duration;

/// 한 번의 비교 결과 (원본 버전 레코드 포함)
#[derive(Debug, Clone)]
pub struct Comparison {
    pub original: DocumentVersion,
    pub updated: DocumentVersion,
    pub diff_html: String,
    pub ai_summary: AiSummary,
}

impl Comparison {
    /// JSON 응답 형태로 변환
    pub fn into_result(self) -> ComparisonResult {
        ComparisonResult {
            original_version: DocumentVersionSummary::from(&self.original),
            new_version: DocumentVersionSummary::from(&self.updated),
            diff_html: self.diff_html,
            content_v1: self.original.file_content,
            content_v2: self.updated.file_content,
            ai_summary: Some(self.ai_summary),
            compared_at: chrono::Utc::now(),
        }
    }

    /// 비교 화면 입력으로 변환. 내용 형식은 업로드 때 저장된 값을 그대로 씁니다.
    pub fn into_view_input(self) -> ComparisonViewInput {
        ComparisonViewInput {
            original_version: DocumentVersionSummary::from(&self.original),
            new_version: DocumentVersionSummary::from(&self.updated),
            diff_html: self.diff_html,
            content_v1: Some(ContentKind::from_stored(
                self.original.content_format,
                self.original.file_content,
            )),
            content_v2: Some(ContentKind::from_stored(
                self.updated.content_format,
                self.updated.file_content,
            )),
            ai_summary: Some(self.ai_summary),
        }
    }
}

/// 요청된 버전 번호 쌍을 확정합니다.
///
/// - `v2`가 없으면 최신 버전
/// - `v1`이 없으면 `v2 - 1`
/// - 같은 버전끼리는 비교할 수 없습니다
pub fn resolve_version_pair(
    v1: Option<i64>,
    v2: Option<i64>,
    latest: Option<i64>,
) -> Result<(i64, i64), AppError> {
    let latest =
        latest.ok_or_else(|| AppError::BadRequest("Document has no versions".to_string()))?;
    let v2 = v2.unwrap_or(latest);
    // v2를 먼저 검사해야 `v2 - 1`이 넘치지 않습니다 (예: v2 = i64::MIN).
    if v2 < 1 {
        return Err(version_range_error());
    }
    let v1 = v1.unwrap_or(v2 - 1);
    if v1 < 1 {
        return Err(version_range_error());
    }
    if v1 == v2 {
        return Err(AppError::BadRequest("Cannot compare a version with itself".to_string()));
    }
    Ok((v1, v2))
}

fn version_range_error() -> AppError {
    AppError::BadRequest("A comparison needs two versions; version numbers start at 1".to_string())
}

/// diff 렌더링과 변경 요약을 동시에 실행합니다.
///
/// - diff는 태그를 걷어낸 텍스트([`ContentKind::to_diff_text`])로 계산하고,
///   CPU를 오래 쓸 수 있으므로 `spawn_blocking`으로 런타임 스레드 밖에서 돌립니다.
///   blocking 작업은 취소할 수 없으므로 `diff_timeout`이 실행 시간의 상한입니다.
/// - 요약기에는 원본 내용을 그대로 넘깁니다.
pub async fn diff_and_summarize(
    summarizer: &ChangeSummarizer,
    diff_timeout: Duration,
    original: &ContentKind,
    updated: &ContentKind,
) -> Result<(String, AiSummary), AppError> {
    // spawn_blocking 클로저는 'static이어야 하므로 소유한 String으로 옮깁니다.
    let old_text = original.to_diff_text().into_owned();
    let new_text = updated.to_diff_text().into_owned();
    let diff_task = tokio::task::spawn_blocking(move || {
        render_diff_html(&old_text, &new_text, diff_timeout)
    });

    // tokio::join!: 두 future를 동시에 기다립니다.
    let (diff_html, ai_summary) = tokio::join!(
        diff_task,
        summarizer.summarize(original.as_str(), updated.as_str())
    );
    // JoinError: blocking 작업이 panic한 경우
    let diff_html =
        diff_html.map_err(|e| AppError::Internal(format!("Diff rendering failed: {e}")))?;

    Ok((diff_html, ai_summary))
}

/// 저장된 두 버전을 비교합니다. 내용 형식은 업로드 때 저장된 값을 씁니다.
pub async fn compare(
    summarizer: &ChangeSummarizer,
    diff_timeout: Duration,
    original: DocumentVersion,
    updated: DocumentVersion,
) -> Result<Comparison, AppError> {
    let old_content = ContentKind::from_stored(original.content_format, original.file_content.clone());
    let new_content = ContentKind::from_stored(updated.content_format, updated.file_content.clone());

    let (diff_html, ai_summary) =
        diff_and_summarize(summarizer, diff_timeout, &old_content, &new_content).await?;

    tracing::info!(
        document_id = %original.document_id,
        from = original.version_number,
        to = updated.version_number,
        changes = ai_summary.significant_changes.len(),
        "Compared document versions"
    );

    Ok(Comparison { original, updated, diff_html, ai_summary })
}
