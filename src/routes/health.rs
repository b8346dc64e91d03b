//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "llm": "configured" | "demo" }`
//!
//! 로드밸런서/컨테이너 헬스체크 용도이며, LLM 인증키가 없는 데모 모드인지도 알려줍니다.

use crate::routes::documents::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /health` — 서버 상태를 확인합니다. 실패하지 않습니다.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let llm = if state.summarizer.is_available() { "configured" } else { "demo" };
    Json(json!({
        "status": "ok",
        "llm": llm
    }))
}
