//! # 버전 비교 결과 모델
//!
//! 두 버전을 비교할 때마다 새로 계산되는 일회성(ephemeral) 데이터입니다.
//! DB에 저장하지 않습니다.

use super::DocumentVersionSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 변경 종류
///
/// `#[serde(other)]`: 모델이 목록에 없는 값을 돌려주면 `modification`으로 읽습니다.
/// 필드가 아예 없을 때도 같은 값이 기본값입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Addition,
    Removal,
    Error,
    #[default]
    #[serde(other)]
    Modification,
}

/// 변경의 중요도. 알 수 없는 값은 `medium`으로 읽습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    High,
    Low,
    #[default]
    #[serde(other)]
    Medium,
}

/// 두 버전 사이의 실질적인 차이 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignificantChange {
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub change_type: ChangeType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub significance: Significance,
}

/// LLM이 만든 변경 요약
///
/// 세 필드는 성공이든 실패든 **항상** 존재합니다.
/// 실패는 필드를 빼는 대신 `change_type: error`인 항목 하나로 표현합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSummary {
    #[serde(default)]
    pub significant_changes: Vec<SignificantChange>,
    #[serde(default)]
    pub unchanged_sections: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// `GET /documents/{id}/compare`의 응답 본문
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub original_version: DocumentVersionSummary,
    pub new_version: DocumentVersionSummary,
    pub diff_html: String,
    pub content_v1: String,
    pub content_v2: String,
    pub ai_summary: Option<AiSummary>,
    pub compared_at: DateTime<Utc>,
}

/// 비교할 버전 번호. 생략하면 최신 버전과 그 직전 버전을 비교합니다.
#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub v1: Option<i64>,
    pub v2: Option<i64>,
    /// 비교 화면(HTML)에서만 사용: changes | original | new
    pub tab: Option<String>,
}
