//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `LLM_API_KEY`: 외부 LLM 서비스 인증키 (선택, 없으면 데모 요약 모드)
//! - `LLM_MODEL`: 변경 요약에 사용할 모델 식별자
//! - `LLM_BASE_URL`: OpenAI 호환 API의 기본 URL
//! - `LLM_TIMEOUT_SECS`: LLM 호출 제한 시간(초)
//! - `DIFF_TIMEOUT_SECS`: 단어 단위 diff 계산 제한 시간(초)
//! - `UPLOADS_PATH`: 업로드된 버전 파일 저장 디렉토리
//! - `FRONTEND_DIST`: 빌드된 프론트엔드 정적 파일 디렉토리
//! - `HOST`, `PORT`: 서버 바인딩 주소와 포트
//!
//! 환경변수는 **이 모듈에서만** 읽습니다. 요약기(summarizer) 등 다른 모듈은
//! 여기서 만들어진 값을 주입받기 때문에, 테스트에서 환경변수를 조작할 필요가 없습니다.

use crate::services::diff::DEFAULT_DIFF_TIMEOUT;
use std::env;
use std::time::Duration;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 경로 (예: "sqlite:data/dealdesk.db?mode=rwc")
    pub database_url: String,
    /// LLM 설정. 인증키가 없으면 None이며, 이때 요약기는 데모 데이터를 반환합니다.
    pub llm: Option<LlmConfig>,
    /// 단어 단위 diff 계산 제한 시간 (기본값: 5초)
    pub diff_timeout: Duration,
    /// 업로드 파일이 저장되는 디렉토리 경로
    pub uploads_path: String,
    /// 프론트엔드 빌드 결과물 경로 (기본값: "../frontend/dist")
    pub frontend_dist: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
}

/// 외부 LLM 완성(completion) 엔드포인트 설정
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// 요청 한 건에 허용하는 최대 시간
    pub timeout: Duration,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`만 필수이며, 없으면 에러가 발생합니다.
    /// `LLM_API_KEY`가 없거나 비어 있는 것은 에러가 아니라 "데모 모드"입니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        // .ok(): 변수가 없으면 None
        // .filter(): 공백뿐인 값도 "설정 안 됨"으로 취급
        let llm = env::var("LLM_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| LlmConfig {
                api_key,
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                base_url: env::var("LLM_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                timeout: Duration::from_secs(
                    env::var("LLM_TIMEOUT_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(60),
                ),
            });

        Ok(Self {
            database_url: env::var("DATABASE_URL")?, // 필수: 없으면 에러
            llm,
            diff_timeout: env::var("DIFF_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_DIFF_TIMEOUT),
            uploads_path: env::var("UPLOADS_PATH")
                .unwrap_or_else(|_| "data/uploads".to_string()),
            frontend_dist: env::var("FRONTEND_DIST")
                .unwrap_or_else(|_| "../frontend/dist".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            // 파싱 실패 시 기본값 3000
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        })
    }
}
