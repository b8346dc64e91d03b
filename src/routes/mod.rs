//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `comparison`: 버전 비교 (JSON 결과, HTML 비교 화면, 텍스트 직접 비교)
//! - `documents`: 문서 생성/조회 핸들러와 공유 상태(AppState)
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `users`: 업로더(사용자) 핸들러
//! - `versions`: 문서 버전 업로드/조회 핸들러

pub mod comparison;
pub mod documents;
pub mod health;
pub mod users;
pub mod versions;

// main.rs에서 `routes::list_documents`처럼 바로 접근 가능하게 재공개합니다.
pub use comparison::*;
pub use documents::*;
pub use health::*;
pub use users::*;
pub use versions::*;
