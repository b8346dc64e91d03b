use serde::{Deserialize, Serialize};

/// 버전을 업로드하는 사용자. 비교 화면에서 업로더의 표시 이름으로 쓰입니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub display_name: String,
    pub email: Option<String>,
}
