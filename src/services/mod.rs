//! # 서비스(비즈니스 로직) 모듈
//!
//! 라우트 핸들러와 DB 계층 사이에서 실제 기능을 구현하는 모듈들입니다.
//!
//! - `comparison`: 두 버전의 비교 결과 조립 (diff + AI 요약을 동시에 실행)
//! - `diff`: 단어 단위 변경 추적 HTML 렌더러
//! - `llm`: 외부 LLM 완성 API 클라이언트
//! - `normalize`: 평문/HTML 내용 정규화
//! - `storage`: 업로드 파일 저장
//! - `summarizer`: LLM 기반 변경 요약기
//! - `view`: 세 탭 비교 화면

pub mod comparison;
pub mod diff;
pub mod llm;
pub mod normalize;
pub mod storage;
pub mod summarizer;
pub mod view;

pub use comparison::*;
pub use normalize::ContentKind;
pub use storage::*;
pub use summarizer::ChangeSummarizer;
