//! # 변경 요약기 (Change Summarizer)
//!
//! 두 버전의 전체 텍스트를 외부 LLM에 보내 "실질적인 변경사항" 요약을 받아옵니다.
//!
//! ## 동작 순서
//! 1. LLM 클라이언트가 주입되지 않았으면(인증키 없음) 네트워크 호출 없이 고정 데모 요약을 반환
//! 2. 글자 4개 = 토큰 1개로 두 문서의 토큰 수를 추정
//! 3. [`MAX_TOKEN_LIMIT`]를 넘으면 문서 길이 비율대로 토큰을 나눠 각각 잘라내고 안내 문구를 덧붙임
//! 4. system + user 메시지, JSON 응답 형식, temperature 0.2로 한 번만 호출 (재시도 없음)
//! 5. 응답이 비어 있으면 빈 요약으로 대체
//! 6. 잘라낸 경우 요약 끝에 안내 문장을 덧붙임
//!
//! ## 에러 처리
//! 내부적으로는 `Result<AiSummary, SummarizerError>`로 다루고,
//! [`ChangeSummarizer::summarize`] 한 곳에서만 모든 에러를 "형태가 온전한" 요약으로 바꿉니다.
//! 호출하는 쪽은 에러를 받지 않으며, 항상 세 필드가 모두 있는 [`AiSummary`]를 받습니다.

use super::llm::{ChatMessage, CompletionClient, CompletionRequest, ResponseFormat};
use crate::models::{AiSummary, ChangeType, Significance, SignificantChange};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 한 번의 요청에 쓸 수 있는 입력 토큰 상한 (모델 응답을 위한 여유분을 뺀 값)
pub const MAX_TOKEN_LIMIT: usize = 24_000;

/// 토큰 수 추정에 쓰는 고정 비율. 특정 토크나이저와 무관한 근사치입니다.
pub const CHARS_PER_TOKEN: usize = 4;

/// 잘라낸 문서 끝에 붙는 안내 문구
pub const TRUNCATION_NOTICE: &str = "\n\n[NOTE: The document has been truncated due to size constraints. This analysis covers only the first portion of the document.]";

/// 잘라낸 경우 요약 끝에 붙는 문장
pub const TRUNCATED_SUMMARY_SUFFIX: &str =
    " Note: Due to document size, only the first portion was analyzed.";

/// 네트워크 실패 시 요약 문장
pub const ERROR_SUMMARY: &str = "An error occurred while analyzing the document changes. Please try again, or try with smaller documents.";

/// 낮은 temperature: 같은 입력에 대해 최대한 일관된 요약
pub const SAMPLING_TEMPERATURE: f32 = 0.2;

const SYSTEM_PROMPT: &str = "You are a legal document analyst specializing in identifying significant changes between document versions. \
Focus only on substantive changes that affect legal meaning, obligations, rights, economics, or risk allocation. \
Ignore purely stylistic edits such as formatting, punctuation, capitalization, or rewording that does not change meaning. \
Always respond with a single JSON object.";

/// 변경 요약 과정에서 생길 수 있는 에러
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// 연결 실패, 전송 중단, 클라이언트 타임아웃 등 전송 계층 오류
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// LLM 엔드포인트가 2xx가 아닌 상태 코드를 반환
    #[error("LLM endpoint returned status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// 요약기에 설정된 제한 시간 초과
    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),

    /// 응답 본문이 JSON이 아니거나 요약 구조로 읽을 수 없음
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

/// 토큰 예산에 맞춘 두 입력 텍스트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTexts {
    pub original: String,
    pub updated: String,
    /// 둘 중 하나라도 잘렸으면 true
    pub truncated: bool,
    /// 원본/수정본에 배정된 토큰 수 (잘라내지 않은 경우 None)
    pub allocation: Option<(usize, usize)>,
}

/// 글자 수 기반 토큰 추정: ceil(글자 수 / 4)
pub fn estimate_tokens(char_count: usize) -> usize {
    char_count.div_ceil(CHARS_PER_TOKEN)
}

/// 두 텍스트를 토큰 예산에 맞게 준비합니다.
///
/// 길이는 유니코드 문자 단위로 세고, 자를 때도 문자 경계를 지킵니다.
pub fn prepare_texts(original: &str, updated: &str) -> PreparedTexts {
    // .len()은 바이트 수이므로, 한글 등 멀티바이트 문자를 위해 chars().count()를 씁니다.
    let original_len = original.chars().count();
    let updated_len = updated.chars().count();
    let total_len = original_len + updated_len;

    // 예산 안이면 그대로 사용 (잘라내지 않음)
    if estimate_tokens(total_len) <= MAX_TOKEN_LIMIT {
        return PreparedTexts {
            original: original.to_string(),
            updated: updated.to_string(),
            truncated: false,
            allocation: None,
        };
    }

    // 길이 비율대로 예산을 나눕니다. 합은 항상 정확히 MAX_TOKEN_LIMIT입니다.
    // u128: 곱셈 중간값이 usize를 넘지 않게 합니다. 나눗셈은 내림(floor)입니다.
    let original_tokens =
        ((MAX_TOKEN_LIMIT as u128 * original_len as u128) / total_len as u128) as usize;
    let updated_tokens = MAX_TOKEN_LIMIT - original_tokens;

    let (original, original_cut) = truncate_to_tokens(original, original_len, original_tokens);
    let (updated, updated_cut) = truncate_to_tokens(updated, updated_len, updated_tokens);

    PreparedTexts {
        original,
        updated,
        truncated: original_cut || updated_cut,
        allocation: Some((original_tokens, updated_tokens)),
    }
}

/// 배정된 토큰 수만큼 앞부분을 남깁니다. 반환값의 bool은 실제로 잘렸는지 여부입니다.
fn truncate_to_tokens(text: &str, char_len: usize, tokens: usize) -> (String, bool) {
    let max_chars = tokens * CHARS_PER_TOKEN;
    if char_len <= max_chars {
        return (text.to_string(), false);
    }
    // .take(n): 앞에서 n개 문자만. 문자 단위이므로 UTF-8 경계가 깨지지 않습니다.
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str(TRUNCATION_NOTICE);
    (cut, true)
}

/// 완성 요청 메시지를 만듭니다.
pub fn build_request(texts: &PreparedTexts) -> CompletionRequest {
    let user_prompt = format!(
        r#"Compare the following two versions of a legal document and identify the significant changes.

ORIGINAL VERSION:
{original}

UPDATED VERSION:
{updated}

Respond with a JSON object of exactly this shape:
{{
  "significant_changes": [
    {{
      "section": "name of the section or clause that changed",
      "change_type": "addition" | "removal" | "modification",
      "description": "what changed and why it matters",
      "significance": "high" | "medium" | "low"
    }}
  ],
  "unchanged_sections": ["names of important sections that did not change"],
  "summary": "an overall summary of the changes in 50 words or fewer"
}}"#,
        original = texts.original,
        updated = texts.updated,
    );

    CompletionRequest {
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
        temperature: SAMPLING_TEMPERATURE,
        response_format: ResponseFormat { kind: "json_object".to_string() },
    }
}

/// 인증키가 없을 때 반환하는 고정 데모 요약
pub fn demo_summary() -> AiSummary {
    AiSummary {
        significant_changes: vec![
            SignificantChange {
                section: "Purchase Price".to_string(),
                change_type: ChangeType::Modification,
                description: "The purchase price was increased from $10,000,000 to $12,500,000, with $2,500,000 now payable as an earn-out.".to_string(),
                significance: Significance::High,
            },
            SignificantChange {
                section: "Indemnification".to_string(),
                change_type: ChangeType::Addition,
                description: "A new indemnification cap equal to 15% of the purchase price was added, with a $100,000 deductible basket.".to_string(),
                significance: Significance::High,
            },
            SignificantChange {
                section: "Non-Competition".to_string(),
                change_type: ChangeType::Removal,
                description: "The three-year non-competition covenant binding the sellers was removed.".to_string(),
                significance: Significance::Medium,
            },
        ],
        unchanged_sections: vec!["Introduction".to_string(), "Closing Conditions".to_string()],
        summary: "The updated draft raises the purchase price and adds an earn-out, introduces an indemnification cap with a deductible basket, and drops the sellers' non-competition covenant. Introductory terms and closing conditions are unchanged.".to_string(),
    }
}

/// 네트워크 실패를 나타내는 단일 에러 항목 요약
pub fn error_summary(message: &str) -> AiSummary {
    AiSummary {
        significant_changes: vec![SignificantChange {
            section: "Error".to_string(),
            change_type: ChangeType::Error,
            description: message.to_string(),
            significance: Significance::Medium,
        }],
        unchanged_sections: Vec::new(),
        summary: ERROR_SUMMARY.to_string(),
    }
}

/// 응답 메시지 내용을 요약 구조로 읽습니다. 비어 있으면 빈 요약입니다.
fn parse_summary(content: Option<String>) -> Result<AiSummary, SummarizerError> {
    match content {
        // 매치 가드(if): 공백뿐인 응답도 "비어 있음"으로 취급
        Some(body) if !body.trim().is_empty() => {
            serde_json::from_str(&body).map_err(SummarizerError::MalformedResponse)
        }
        _ => Ok(AiSummary::default()),
    }
}

/// 변경 요약기
///
/// 요청 간에 공유하는 가변 상태가 없으므로 `Clone`해서 여러 요청이 동시에 써도 됩니다.
#[derive(Clone)]
pub struct ChangeSummarizer {
    client: Option<Arc<dyn CompletionClient>>,
}

impl ChangeSummarizer {
    /// `client`가 None이면 데모 모드입니다.
    pub fn new(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client }
    }

    /// 외부 LLM 서비스를 사용할 수 있는지 여부
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    /// 두 텍스트의 변경 요약을 만듭니다. 이 함수는 실패하지 않습니다.
    ///
    /// 모든 [`SummarizerError`]는 여기서만 요약 형태로 바뀝니다:
    /// - `MalformedResponse` → 빈 요약 (잘라낸 경우 안내 문장은 유지)
    /// - 그 밖의 에러 → `change_type: error`인 항목 하나
    pub async fn summarize(&self, original: &str, updated: &str) -> AiSummary {
        // let-else: 클라이언트가 없으면(데모 모드) 바로 반환
        let Some(client) = &self.client else {
            tracing::info!("LLM credential not configured, returning demo change summary");
            return demo_summary();
        };

        let texts = prepare_texts(original, updated);
        if let Some((original_tokens, updated_tokens)) = texts.allocation {
            tracing::warn!(
                original_tokens,
                updated_tokens,
                "Documents exceed the token budget, truncating proportionally"
            );
        }

        // 에러를 요약 형태로 바꾸는 곳은 여기 한 곳뿐입니다.
        let mut summary = match request_summary(client.as_ref(), &texts).await {
            Ok(summary) => summary,
            Err(SummarizerError::MalformedResponse(e)) => {
                tracing::warn!("LLM returned a malformed change summary: {}", e);
                AiSummary::default()
            }
            // 에러 요약에는 잘라냄 안내를 붙이지 않으므로 바로 반환합니다.
            Err(e) => {
                tracing::error!("Change summary request failed: {}", e);
                return error_summary(&e.to_string());
            }
        };

        if texts.truncated {
            summary.summary.push_str(TRUNCATED_SUMMARY_SUFFIX);
        }
        summary
    }
}

/// LLM을 한 번 호출하고 응답을 요약 구조로 읽습니다. 재시도하지 않습니다.
async fn request_summary(
    client: &dyn CompletionClient,
    texts: &PreparedTexts,
) -> Result<AiSummary, SummarizerError> {
    let request = build_request(texts);
    let deadline = client.timeout();
    // 바깥 `?`: 제한 시간 초과(Elapsed) → Timeout
    // 안쪽 `?`: 클라이언트가 반환한 SummarizerError
    let content = tokio::time::timeout(deadline, client.complete(&request))
        .await
        .map_err(|_| SummarizerError::Timeout(deadline))??;

    parse_summary(content)
}
