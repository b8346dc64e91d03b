//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `documents`: 문서 생성/조회 쿼리
//! - `users`: 업로더(사용자) 쿼리
//! - `versions`: 불변 문서 버전의 생성/조회 쿼리

pub mod documents;
pub mod users;
pub mod versions;

pub use documents::*;
pub use users::*;
pub use versions::*;
