//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `comparison`: 버전 비교 결과와 AI 변경 요약
//! - `document`: 문서(Document) 관련 구조체
//! - `user`: 사용자(업로더) 관련 구조체
//! - `version`: 문서 버전 관련 구조체
//!
//! `pub use X::*;`로 하위 모듈의 항목을 재공개하여
//! `crate::models::Document`처럼 짧게 접근할 수 있게 합니다.

pub mod comparison;
pub mod document;
pub mod user;
pub mod version;

pub use comparison::*;
pub use document::*;
pub use user::*;
pub use version::*;
